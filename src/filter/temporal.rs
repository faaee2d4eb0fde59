use crate::graph::Graph;

use super::{ldf::has_degree, Candidates, NoCandidates};

// Temporal filtering: label, degree and a non-empty overlap of the
// validity intervals. Query edges without an interval overlap with
// every data edge.
//
// C(e) = { f ∈ LDF(e) | I(f) ∩ I(e) ≠ ∅ }
pub fn temporal_filter(data_graph: &Graph, query_graph: &Graph) -> Result<Candidates, NoCandidates> {
    let mut candidates = Candidates::from((data_graph, query_graph));

    for query_edge in 0..query_graph.edge_count() {
        let label = query_graph.label(query_edge);
        let interval = query_graph.interval(query_edge);

        for &data_edge in data_graph.edges_by_label(label) {
            if data_graph.interval(data_edge).overlaps(&interval)
                && has_degree(data_graph, data_edge, query_graph, query_edge)
            {
                candidates.add_candidate(query_edge, data_edge);
            }
        }

        if candidates.candidate_count(query_edge) == 0 {
            return Err(NoCandidates(query_edge));
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trim_margin::MarginTrimmable;

    fn graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    const DATA_GRAPH: &str = "
        |t 4 4
        |e 0 1 a 0 10
        |e 2 3 a 20 30
        |e 1 2 b 5 25
        |e 3 0 b 40 50
        |";

    #[test]
    fn test_temporal_filter() {
        let data_graph = graph(DATA_GRAPH);
        let query_graph = graph(
            "
            |t 3 2
            |e 0 1 a 8 12
            |e 1 2 b
            |",
        );

        let candidates = temporal_filter(&data_graph, &query_graph).unwrap();

        assert_eq!(candidates.candidates(0), &[0]);
        // timeless query edges overlap with everything
        assert_eq!(candidates.candidates(1), &[2, 3]);
    }

    #[test]
    fn test_temporal_filter_disjoint() {
        let data_graph = graph(DATA_GRAPH);
        let query_graph = "t 2 1\ne 0 1 b 60 70\n".parse::<Graph>().unwrap();

        let candidates = temporal_filter(&data_graph, &query_graph);
        assert_eq!(candidates.unwrap_err(), NoCandidates(0));
    }
}
