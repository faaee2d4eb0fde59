use std::collections::HashSet;

use crate::{
    graph::{EdgeId, Graph},
    interval::Composition,
};

use super::Instance;

pub fn triangles(graph: &Graph) -> Vec<Instance> {
    let mut instances = Vec::new();
    triangles_with(graph, |triangle| instances.push(triangle.clone()));
    instances
}

/// Enumerates directed 3-cycles `(e1, e2, e3)` of distinct edges, i.e.
/// `t(e1) = s(e2)`, `t(e2) = s(e3)` and `t(e3) = s(e1)`, whose start times
/// are non-decreasing along the cycle and which all hold at the start of `e3`.
///
/// Each cycle is reported once, in the rotation found first. Returns the
/// number of triangles.
pub fn triangles_with<F>(graph: &Graph, mut action: F) -> usize
where
    F: FnMut(&Instance),
{
    let mut seen = HashSet::<[EdgeId; 3]>::new();

    for e1 in 0..graph.edge_count() {
        let (a, b) = graph.edge_tuple(e1);

        for &e2 in graph.out_edges(b) {
            if e2 == e1 {
                continue;
            }
            let c = graph.edge(e2).target;

            for &e3 in graph.out_edges(c) {
                if e3 == e1 || e3 == e2 || graph.edge(e3).target != a {
                    continue;
                }

                let window = Composition::Ordered.simplify(
                    [e1, e2, e3].iter().map(|&e| graph.interval(e)),
                );
                if window.is_none() {
                    continue;
                }

                let mut key = [e1, e2, e3];
                key.sort_unstable();
                if !seen.insert(key) {
                    continue;
                }

                action(&Instance::new(graph, vec![e1, e2, e3], Composition::Ordered));
            }
        }
    }

    seen.len()
}
