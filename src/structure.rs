use std::collections::HashSet;

use crate::{
    graph::{Edge, EdgeId, Graph, VertexId},
    mapping::{Embedding, Mapping},
};

/// Decides whether binding query edge `query_edge` to data edge `data_edge`
/// preserves the adjacency structure of every already bound query edge.
///
/// For both endpoints of the query edge, each bound query edge that meets
/// this endpoint as source or target must have an image that meets the
/// corresponding endpoint of the data edge in the same role. Only bound
/// neighbours are inspected, labels and intervals are not.
pub fn is_joinable(
    query_graph: &Graph,
    data_graph: &Graph,
    mapping: &Mapping,
    query_edge: EdgeId,
    data_edge: EdgeId,
) -> bool {
    let (query_source, query_target) = query_graph.edge_tuple(query_edge);
    let (data_source, data_target) = data_graph.edge_tuple(data_edge);

    // a loop can only be matched by a loop
    if query_source == query_target && data_source != data_target {
        return false;
    }

    coincident(query_graph, data_graph, mapping, query_source, data_source)
        && coincident(query_graph, data_graph, mapping, query_target, data_target)
}

/// Every bound query edge incident to `query_vertex` must have its image
/// incident to `data_vertex` at the same end.
fn coincident(
    query_graph: &Graph,
    data_graph: &Graph,
    mapping: &Mapping,
    query_vertex: VertexId,
    data_vertex: VertexId,
) -> bool {
    let image = |query_edge: EdgeId| mapping.get(query_edge).map(|f| data_graph.edge(f));

    query_graph
        .predecessor_edges(query_vertex, mapping)
        .all(|e| image(e).map_or(true, |f| f.target == data_vertex))
        && query_graph
            .successor_edges(query_vertex, mapping)
            .all(|e| image(e).map_or(true, |f| f.source == data_vertex))
}

/// Checks a complete embedding against every pair of query edges, not
/// only the adjacent ones the incremental check inspects.
///
/// Also verifies that the embedding is injective.
pub fn is_consistent(query_graph: &Graph, data_graph: &Graph, embedding: &Embedding) -> bool {
    fn endpoints(edge: &Edge) -> [VertexId; 2] {
        [edge.source, edge.target]
    }

    if embedding.len() != query_graph.edge_count() {
        return false;
    }

    let images = embedding.iter().collect::<HashSet<_>>();
    if images.len() != embedding.len() {
        return false;
    }

    for e1 in 0..query_graph.edge_count() {
        let q1 = endpoints(query_graph.edge(e1));
        let d1 = endpoints(data_graph.edge(embedding.get(e1)));

        for e2 in e1..query_graph.edge_count() {
            let q2 = endpoints(query_graph.edge(e2));
            let d2 = endpoints(data_graph.edge(embedding.get(e2)));

            for r1 in 0..2 {
                for r2 in 0..2 {
                    if q1[r1] == q2[r2] && d1[r1] != d2[r2] {
                        return false;
                    }
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use trim_margin::MarginTrimmable;

    fn graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    // query: 0 -a-> 1 -b-> 2
    const PATH_QUERY: &str = "
        |t 3 2
        |e 0 1 a
        |e 1 2 b
        |";

    // data: 0 -a-> 1 -b-> 2, 3 -b-> 4, 1 -b-> 1
    const DATA_GRAPH: &str = "
        |t 5 4
        |e 0 1 a
        |e 1 2 b
        |e 3 4 b
        |e 1 1 b
        |";

    #[test]
    fn test_joinable_with_bound_predecessor() {
        let query_graph = graph(PATH_QUERY);
        let data_graph = graph(DATA_GRAPH);

        let mut mapping = Mapping::new(2);
        assert!(mapping.insert(0, 0));

        assert!(is_joinable(&query_graph, &data_graph, &mapping, 1, 1));
        assert!(!is_joinable(&query_graph, &data_graph, &mapping, 1, 2));
        // shares the middle vertex, so the loop is admissible
        assert!(is_joinable(&query_graph, &data_graph, &mapping, 1, 3));
    }

    #[test]
    fn test_joinable_with_bound_successor() {
        let query_graph = graph(PATH_QUERY);
        let data_graph = graph(DATA_GRAPH);

        let mut mapping = Mapping::new(2);
        assert!(mapping.insert(1, 2));

        assert!(!is_joinable(&query_graph, &data_graph, &mapping, 0, 0));

        mapping.remove(1, 2);
        assert!(mapping.insert(1, 1));
        assert!(is_joinable(&query_graph, &data_graph, &mapping, 0, 0));
    }

    #[test]
    fn test_joinable_with_shared_source() {
        // query: 0 -a-> 1, 0 -a-> 2
        let query_graph = graph(
            "
            |t 3 2
            |e 0 1 a
            |e 0 2 a
            |",
        );
        // data: 0 -a-> 1, 0 -a-> 2, 3 -a-> 2
        let data_graph = graph(
            "
            |t 4 3
            |e 0 1 a
            |e 0 2 a
            |e 3 2 a
            |",
        );

        let mut mapping = Mapping::new(2);
        assert!(mapping.insert(0, 0));

        assert!(is_joinable(&query_graph, &data_graph, &mapping, 1, 1));
        assert!(!is_joinable(&query_graph, &data_graph, &mapping, 1, 2));
    }

    #[test]
    fn test_loops_only_match_loops() {
        let query_graph = "t 1 1\ne 0 0 b\n".parse::<Graph>().unwrap();
        let data_graph = graph(DATA_GRAPH);
        let mapping = Mapping::new(1);

        assert!(!is_joinable(&query_graph, &data_graph, &mapping, 0, 1));
        assert!(is_joinable(&query_graph, &data_graph, &mapping, 0, 3));
    }

    #[test]
    fn test_is_consistent() {
        let query_graph = graph(PATH_QUERY);
        let data_graph = graph(DATA_GRAPH);

        assert!(is_consistent(&query_graph, &data_graph, &Embedding::from(vec![0, 1])));
        assert!(!is_consistent(&query_graph, &data_graph, &Embedding::from(vec![0, 2])));
        assert!(!is_consistent(&query_graph, &data_graph, &Embedding::from(vec![1, 1])));
        assert!(!is_consistent(&query_graph, &data_graph, &Embedding::from(vec![0])));
    }
}
