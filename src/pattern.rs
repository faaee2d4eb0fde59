//! Enumeration of fixed-shape patterns: directed triangles and
//! connected vertex sets ("cliques") of a given size.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::{
    graph::{EdgeId, Graph, VertexId},
    interval::{Composition, Interval},
    store::PatternStore,
    Error,
};

mod clique;
mod triangle;

pub use clique::{cliques, cliques_with};
pub use triangle::{triangles, triangles_with};

/// An occurrence of a pattern in a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance {
    /// participating edges in canonical order
    pub edges: Vec<EdgeId>,
    /// participating vertices in ascending order
    pub vertices: Vec<VertexId>,
    /// labels of `edges`, concatenated
    pub encoding: String,
    /// the window in which all edges hold, if any
    pub window: Option<Interval>,
}

impl Instance {
    pub fn new(graph: &Graph, edges: Vec<EdgeId>, composition: Composition) -> Self {
        let vertices = edges
            .iter()
            .flat_map(|&e| {
                let (source, target) = graph.edge_tuple(e);
                vec![source, target]
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let encoding = edges.iter().map(|&e| graph.label(e)).collect();
        let window = composition.simplify(edges.iter().map(|&e| graph.interval(e)));

        Instance {
            edges,
            vertices,
            encoding,
            window,
        }
    }
}

/// Number of pattern instances found and newly recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Profile {
    pub triangles: usize,
    pub new_triangles: usize,
    pub cliques: usize,
    pub new_cliques: usize,
}

/// Records all triangles and all cliques with up to `max_clique_size`
/// vertices of `graph` in `store`.
///
/// Cliques are enumerated once per size, starting with two vertices.
pub fn profile<S>(graph: &Graph, max_clique_size: usize, store: &mut S) -> Result<Profile, Error>
where
    S: PatternStore + ?Sized,
{
    let mut profile = Profile::default();

    for triangle in triangles(graph) {
        profile.triangles += 1;
        if store.insert_triangle(graph, &triangle)? {
            profile.new_triangles += 1;
        }
    }
    debug!("Found {} triangles", profile.triangles);

    for size in 2..=max_clique_size {
        let instances = cliques(graph, size);
        debug!("Found {} cliques with {} vertices", instances.len(), size);
        for clique in instances {
            profile.cliques += 1;
            if store.insert_clique(graph, &clique)? {
                profile.new_cliques += 1;
            }
        }
    }

    info!(
        "Recorded {} new triangles and {} new cliques",
        profile.new_triangles, profile.new_cliques
    );

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_instance() {
        let graph = "t 3 2\ne 2 0 x 0 10\ne 0 1 y 2 8\n".parse::<Graph>().unwrap();

        let instance = Instance::new(&graph, vec![0, 1], Composition::Concur);

        assert_eq!(instance.vertices, vec![0, 1, 2]);
        assert_eq!(instance.encoding, "xy");
        assert_eq!(instance.window, Interval::new(2, 8));
    }

    #[test]
    fn test_profile_is_idempotent() {
        let graph = "t 3 3\ne 0 1 x 0 10\ne 1 2 y 2 8\ne 2 0 z 3 9\n"
            .parse::<Graph>()
            .unwrap();
        let mut store = MemoryStore::default();

        let first = profile(&graph, 3, &mut store).unwrap();
        assert_eq!(first.triangles, 1);
        assert_eq!(first.new_triangles, 1);
        // three pairs and the full vertex set
        assert_eq!(first.cliques, 4);
        assert_eq!(first.new_cliques, 4);

        let second = profile(&graph, 3, &mut store).unwrap();
        assert_eq!(second.triangles, 1);
        assert_eq!(second.new_triangles, 0);
        assert_eq!(second.new_cliques, 0);

        assert_eq!(store.triangles().len(), 1);
        assert_eq!(store.cliques().len(), 4);
    }
}
