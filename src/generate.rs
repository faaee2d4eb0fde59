//! Random temporal multigraphs for testing and benchmarking.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, warn};

use crate::{
    graph::{Edge, Graph, Label},
    interval::{Interval, Time},
};

pub const LABELS: [Label; 5] = ['a', 'b', 'c', 'd', 'e'];

/// Ratio of edges to ordered vertex pairs, `m / (n (n - 1))`.
pub const DEFAULT_DENSITY: f64 = 0.5;

const MAX_START: Time = 100;
const MAX_LENGTH: Time = 50;

/// Creates a graph with `edge_count` edges and as many vertices as needed
/// to reach `density`.
///
/// Edges connect distinct vertices, carry a label from [`LABELS`] and hold
/// during a non-empty interval. The same `seed` yields the same graph.
pub fn random_graph(edge_count: usize, density: f64, seed: u64) -> Graph {
    let density = if density.is_finite() && density > 0.0 {
        density
    } else {
        warn!("Invalid density {}, using {}", density, DEFAULT_DENSITY);
        DEFAULT_DENSITY
    };

    let vertex_count = vertex_count(edge_count, density);
    let mut rng = StdRng::seed_from_u64(seed);

    let edges = (0..edge_count)
        .map(|_| {
            let source = rng.gen_range(0..vertex_count);
            // skip over the source to avoid loops
            let mut target = rng.gen_range(0..vertex_count - 1);
            if target >= source {
                target += 1;
            }
            let label = LABELS[rng.gen_range(0..LABELS.len())];
            let interval =
                Interval::spanning(rng.gen_range(0..=MAX_START), rng.gen_range(0..=MAX_LENGTH));
            Edge::new(source, target, label, interval)
        })
        .collect::<Vec<_>>();

    debug!(
        "Generated {} edges between {} vertices (seed = {})",
        edges.len(),
        vertex_count,
        seed
    );

    Graph::new(vertex_count, edges)
}

// Smallest n with m / (n (n - 1)) <= density, at least two. More than 2m
// vertices would leave some of them isolated.
fn vertex_count(edge_count: usize, density: f64) -> usize {
    if edge_count == 0 {
        return 0;
    }
    let pairs = edge_count as f64 / density;
    let n = ((1.0 + (1.0 + 4.0 * pairs).sqrt()) / 2.0).ceil() as usize;
    n.min(edge_count.saturating_mul(2)).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_count() {
        assert_eq!(vertex_count(0, DEFAULT_DENSITY), 0);
        assert_eq!(vertex_count(1, DEFAULT_DENSITY), 2);
        // 6 ordered pairs of 3 vertices hold 3 edges at density 0.5
        assert_eq!(vertex_count(3, DEFAULT_DENSITY), 3);
        assert_eq!(vertex_count(4, DEFAULT_DENSITY), 4);
        assert_eq!(vertex_count(10, 1.0), 4);
        assert_eq!(vertex_count(3, 1e-300), 6);
        assert_eq!(vertex_count(1, f64::MIN_POSITIVE), 2);
    }

    #[test]
    fn test_random_graph() {
        let graph = random_graph(100, DEFAULT_DENSITY, 42);

        assert_eq!(graph.edge_count(), 100);
        assert!(graph.vertex_count() * (graph.vertex_count() - 1) >= 200);
        for edge in graph.edges() {
            assert!(!edge.is_loop());
            assert!(LABELS.contains(&edge.label));
            assert!(edge.interval.start() <= edge.interval.end());
            assert!(edge.interval.start() >= 0);
        }
    }

    #[test]
    fn test_seed_determines_graph() {
        let first = random_graph(50, 0.2, 7);
        let second = random_graph(50, 0.2, 7);
        let other = random_graph(50, 0.2, 8);

        assert_eq!(first.edges(), second.edges());
        assert_ne!(first.edges(), other.edges());
    }

    #[test]
    fn test_invalid_density() {
        let graph = random_graph(10, f64::NAN, 1);

        assert_eq!(graph.vertex_count(), vertex_count(10, DEFAULT_DENSITY));
    }

    #[test]
    fn test_tiny_density() {
        let graph = random_graph(3, 1e-300, 1);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.vertex_count(), 6);
    }

    #[test]
    fn test_empty_graph() {
        let graph = random_graph(0, DEFAULT_DENSITY, 1);

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.vertex_count(), 0);
    }
}
