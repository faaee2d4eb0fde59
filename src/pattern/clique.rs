use std::collections::BTreeSet;

use cfg_if::cfg_if;
use tracing::debug;

use crate::{
    graph::{Graph, VertexId},
    interval::Composition,
};

use super::Instance;

pub fn cliques(graph: &Graph, size: usize) -> Vec<Instance> {
    let mut instances = Vec::new();
    cliques_with(graph, size, |clique| instances.push(clique.clone()));
    instances
}

/// Enumerates every connected set of exactly `size` vertices.
///
/// Vertex sets are grown one size level at a time: every set of the
/// current level is extended by one adjacent vertex (in either direction).
/// Only the current and the next level are held, and sets reached through
/// different roots or growth orders collapse into one. Cliques are reported
/// in ascending order of their vertices. The participating edges are the
/// edges induced by the vertex set. Returns the number of cliques.
pub fn cliques_with<F>(graph: &Graph, size: usize, mut action: F) -> usize
where
    F: FnMut(&Instance),
{
    if size == 0 {
        return 0;
    }

    let mut level = graph
        .vertices()
        .map(|root| std::iter::once(root).collect::<BTreeSet<_>>())
        .collect::<BTreeSet<_>>();

    for next_size in 2..=size {
        if level.is_empty() {
            break;
        }
        level = grow(graph, &level);
        debug!("{} connected sets of {} vertices", level.len(), next_size);
    }

    for vertices in level.iter() {
        let edges = graph.induced_edges(vertices);
        let mut clique = Instance::new(graph, edges, Composition::Concur);
        // a single vertex has no edges to derive it from
        clique.vertices = vertices.iter().copied().collect();
        action(&clique);
    }

    level.len()
}

type Level = BTreeSet<BTreeSet<VertexId>>;

/// The sets of the next size level, each a set of `level` plus one adjacent vertex.
fn grow(graph: &Graph, level: &Level) -> Level {
    cfg_if! {
        if #[cfg(feature = "parallel")] {
            par_grow(graph, level)
        } else {
            level
                .iter()
                .flat_map(|vertices| extend(graph, vertices))
                .collect()
        }
    }
}

// Sets of a level are extended independently.
#[cfg(feature = "parallel")]
fn par_grow(graph: &Graph, level: &Level) -> Level {
    use rayon::prelude::*;

    level
        .par_iter()
        .map(|vertices| extend(graph, vertices).collect::<Level>())
        .reduce(BTreeSet::new, |mut left, right| {
            left.extend(right);
            left
        })
}

fn extend<'a>(
    graph: &'a Graph,
    vertices: &'a BTreeSet<VertexId>,
) -> impl Iterator<Item = BTreeSet<VertexId>> + 'a {
    graph.adjacent_to(vertices).into_iter().map(move |vertex| {
        let mut next = vertices.clone();
        next.insert(vertex);
        next
    })
}
