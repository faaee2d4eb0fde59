use crate::{
    config::Order,
    filter::Candidates,
    graph::{EdgeId, Graph},
};

/// Computes the fixed order in which query edges are matched.
pub fn matching_order(query_graph: &Graph, candidates: &Candidates, order: Order) -> Vec<EdgeId> {
    match order {
        Order::Enumeration => (0..query_graph.edge_count()).collect(),
        Order::Gql => gql_order(query_graph, candidates),
    }
}

/// Builds a matching order by starting with the edge with the minimum
/// number of candidates and iteratively selecting edges that share a
/// vertex with already selected edges and have the minimum number of
/// candidates.
pub fn gql_order(query_graph: &Graph, candidates: &Candidates) -> Vec<EdgeId> {
    let edge_count = query_graph.edge_count();

    let mut visited = vec![false; edge_count];
    let mut adjacent = vec![false; edge_count];
    let mut order = Vec::<EdgeId>::with_capacity(edge_count);

    if edge_count == 0 {
        return order;
    }

    let start = gql_start_edge(query_graph, candidates);
    order.push(start);

    update_valid_edges(query_graph, start, &mut visited, &mut adjacent);

    for _ in 1..edge_count {
        // Disconnected query graphs continue with any unvisited edge.
        let connected = (0..edge_count).any(|e| !visited[e] && adjacent[e]);

        let mut next_edge = usize::MAX;
        let mut min_value = usize::MAX;

        for curr_edge in 0..edge_count {
            if !visited[curr_edge] && (adjacent[curr_edge] || !connected) {
                let num_candidates = candidates.candidate_count(curr_edge);

                if num_candidates < min_value {
                    min_value = num_candidates;
                    next_edge = curr_edge;
                } else if num_candidates == min_value
                    && edge_degree(query_graph, curr_edge) > edge_degree(query_graph, next_edge)
                {
                    next_edge = curr_edge;
                }
            }
        }
        update_valid_edges(query_graph, next_edge, &mut visited, &mut adjacent);
        order.push(next_edge);
    }

    order
}

/// Selects the edge with the minimum number of candidates as start edge.
///
/// Ties are handled by picking the edge with a higher degree.
fn gql_start_edge(query_graph: &Graph, candidates: &Candidates) -> EdgeId {
    let mut start = 0;

    for edge in 1..query_graph.edge_count() {
        let num_edge_candidates = candidates.candidate_count(edge);
        let num_start_candidates = candidates.candidate_count(start);

        if num_edge_candidates < num_start_candidates
            || (num_edge_candidates == num_start_candidates
                && edge_degree(query_graph, edge) > edge_degree(query_graph, start))
        {
            start = edge;
        }
    }

    start
}

fn edge_degree(query_graph: &Graph, edge: EdgeId) -> usize {
    let (source, target) = query_graph.edge_tuple(edge);
    query_graph.degree(source) + query_graph.degree(target)
}

fn update_valid_edges(
    query_graph: &Graph,
    query_edge: EdgeId,
    visited: &mut [bool],
    adjacent: &mut [bool],
) {
    visited[query_edge] = true;
    let (source, target) = query_graph.edge_tuple(query_edge);
    for &vertex in &[source, target] {
        for &neighbor in query_graph
            .out_edges(vertex)
            .iter()
            .chain(query_graph.in_edges(vertex))
        {
            adjacent[neighbor] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trim_margin::MarginTrimmable;

    fn graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    // 0 -a-> 1 -b-> 2 -c-> 3, 3 -d-> 4
    const QUERY_GRAPH: &str = "
        |t 5 4
        |e 0 1 a
        |e 1 2 b
        |e 2 3 c
        |e 3 4 d
        |";

    #[test]
    fn test_enumeration_order() {
        let query_graph = graph(QUERY_GRAPH);
        let candidates = Candidates::new(vec![vec![0]; 4]);

        let order = matching_order(&query_graph, &candidates, Order::Enumeration);

        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_gql_order() {
        let query_graph = graph(QUERY_GRAPH);
        let candidates = Candidates::new(vec![
            vec![0, 1, 2],
            vec![0, 1, 2, 3],
            vec![0],
            vec![0, 1],
        ]);

        let order = gql_order(&query_graph, &candidates);

        // starts at the most selective edge, then stays connected
        assert_eq!(order, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_gql_order_disconnected() {
        let query_graph = graph(
            "
            |t 4 2
            |e 0 1 a
            |e 2 3 b
            |",
        );
        let candidates = Candidates::new(vec![vec![0, 1], vec![0]]);

        let order = gql_order(&query_graph, &candidates);

        assert_eq!(order, vec![1, 0]);
    }
}
