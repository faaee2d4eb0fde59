use crate::graph::{EdgeId, Graph};

use super::{Candidates, NoCandidates};

// Label filtering
//
// C(e) = { f ∈ E(G) | L(f) = L(e) }
pub fn label_filter(data_graph: &Graph, query_graph: &Graph) -> Result<Candidates, NoCandidates> {
    let mut candidates = Candidates::from((data_graph, query_graph));

    for query_edge in 0..query_graph.edge_count() {
        let label = query_graph.label(query_edge);

        for data_edge in data_graph.edges_by_label(label) {
            candidates.add_candidate(query_edge, *data_edge);
        }

        // break early
        if candidates.candidate_count(query_edge) == 0 {
            return Err(NoCandidates(query_edge));
        }
    }

    Ok(candidates)
}

// LDF: label-and-degree filtering
//
// C(e) = { f ∈ E(G) | L(f) = L(e) ∧ d⁺(s(f)) >= d⁺(s(e)) ∧ d⁻(s(f)) >= d⁻(s(e))
//                                 ∧ d⁺(t(f)) >= d⁺(t(e)) ∧ d⁻(t(f)) >= d⁻(t(e)) }
pub fn ldf_filter(data_graph: &Graph, query_graph: &Graph) -> Result<Candidates, NoCandidates> {
    let mut candidates = Candidates::from((data_graph, query_graph));

    for query_edge in 0..query_graph.edge_count() {
        let label = query_graph.label(query_edge);

        for data_edge in data_graph.edges_by_label(label) {
            if has_degree(data_graph, *data_edge, query_graph, query_edge) {
                candidates.add_candidate(query_edge, *data_edge);
            }
        }

        // break early
        if candidates.candidate_count(query_edge) == 0 {
            return Err(NoCandidates(query_edge));
        }
    }

    Ok(candidates)
}

/// All query edges sharing an endpoint with `query_edge` in a given role must
/// be mapped injectively to data edges sharing the same endpoint of `data_edge`.
pub(super) fn has_degree(
    data_graph: &Graph,
    data_edge: EdgeId,
    query_graph: &Graph,
    query_edge: EdgeId,
) -> bool {
    let (query_source, query_target) = query_graph.edge_tuple(query_edge);
    let (data_source, data_target) = data_graph.edge_tuple(data_edge);

    data_graph.out_degree(data_source) >= query_graph.out_degree(query_source)
        && data_graph.in_degree(data_source) >= query_graph.in_degree(query_source)
        && data_graph.out_degree(data_target) >= query_graph.out_degree(query_target)
        && data_graph.in_degree(data_target) >= query_graph.in_degree(query_target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GdlGraph;
    use trim_margin::MarginTrimmable;

    fn graph(gdl: &str) -> GdlGraph {
        gdl.trim_margin().unwrap().parse::<GdlGraph>().unwrap()
    }

    fn text_graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    // 0 -a-> 1 -b-> 2 -b-> 3, 1 -b-> 3, 4 -a-> 3
    const DATA_GRAPH_1: &str = "
        |t 5 5
        |e 0 1 a
        |e 1 2 b
        |e 2 3 b
        |e 1 3 b
        |e 4 3 a
        |";

    #[test]
    fn test_label_filter() {
        let data_graph = text_graph(DATA_GRAPH_1);
        let query_graph = "t 3 2\ne 0 1 a\ne 1 2 b\n".parse::<Graph>().unwrap();

        let candidates = label_filter(&data_graph, &query_graph).unwrap();

        assert_eq!(candidates.candidates(0), &[0, 4]);
        assert_eq!(candidates.candidates(1), &[1, 2, 3]);
    }

    #[test]
    fn test_ldf_filter() {
        let data_graph = text_graph(DATA_GRAPH_1);
        // 0 -a-> 1 -b-> 2, 1 -b-> 3
        let query_graph = text_graph(
            "
            |t 4 3
            |e 0 1 a
            |e 1 2 b
            |e 1 3 b
            |",
        );

        let candidates = ldf_filter(&data_graph, &query_graph).unwrap();

        // the target of 4 -a-> 3 has no outgoing edges
        assert_eq!(candidates.candidates(0), &[0]);
        // the source of 2 -b-> 3 has a single outgoing edge
        assert_eq!(candidates.candidates(1), &[1, 3]);
        assert_eq!(candidates.candidates(2), &[1, 3]);

        assert_eq!(candidates.candidate_count(0), 1);
        assert_eq!(candidates.candidate_count(1), 2);
    }

    #[test]
    fn test_ldf_filter_invalid_label() {
        let data_graph = text_graph(DATA_GRAPH_1);
        let query_graph = "t 3 2\ne 0 1 a\ne 1 2 z\n".parse::<Graph>().unwrap();
        let candidates = ldf_filter(&data_graph, &query_graph);
        assert_eq!(candidates.unwrap_err(), NoCandidates(1))
    }

    #[test]
    fn test_ldf_filter_invalid_degree() {
        let data_graph = text_graph(DATA_GRAPH_1);
        // three outgoing b edges from a single vertex
        let query_graph = text_graph(
            "
            |t 4 3
            |e 0 1 b
            |e 0 2 b
            |e 0 3 b
            |",
        );
        let candidates = ldf_filter(&data_graph, &query_graph);
        assert_eq!(candidates.unwrap_err(), NoCandidates(0))
    }

    #[test]
    fn test_ldf_filter_gdl() {
        let data_graph = graph(
            "
            |(a),(b),(c)
            |(a)-[:X]->(b)
            |(b)-[:Y]->(c)
            |(c)-[:Z]->(a)
            |",
        );
        let query_graph = "(a)-[:X]->(b), (b)-[:Y]->(c)".parse::<GdlGraph>().unwrap();

        let candidates = ldf_filter(&data_graph, &query_graph).unwrap();

        assert_eq!(candidates.candidate_count(0), 1);
        assert_eq!(candidates.candidate_count(1), 1);
    }
}
