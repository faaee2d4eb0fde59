use std::{fmt::Display, ops::ControlFlow, time::Instant};

use tracing::debug;

use crate::{
    config::{Budget, Config, Refinement},
    filter::{is_compatible, refine, Candidates},
    graph::{EdgeId, Graph},
    mapping::{Embedding, Mapping},
    structure::is_joinable,
};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The whole search space was explored.
    Complete { embeddings: usize },
    /// The budget was exhausted before the search space was explored.
    Truncated { embeddings: usize },
    /// The query edge has no candidates, nothing was searched.
    Infeasible { query_edge: EdgeId },
}

impl Outcome {
    pub fn embedding_count(&self) -> usize {
        match self {
            Outcome::Complete { embeddings } | Outcome::Truncated { embeddings } => *embeddings,
            Outcome::Infeasible { .. } => 0,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Outcome::Truncated { .. })
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, Outcome::Infeasible { .. })
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Complete { embeddings } => write!(f, "{} embeddings", embeddings),
            Outcome::Truncated { embeddings } => {
                write!(f, "{} embeddings (search truncated)", embeddings)
            }
            Outcome::Infeasible { query_edge } => {
                write!(f, "no match, query edge {} has no candidates", query_edge)
            }
        }
    }
}

pub fn search(
    data_graph: &Graph,
    query_graph: &Graph,
    candidates: &Candidates,
    order: &[EdgeId],
    config: &Config,
) -> Outcome {
    search_with(data_graph, query_graph, candidates, order, config, |_| {})
}

/// Enumerates all embeddings of the query graph into the data graph by
/// matching query edges depth-first in the given order.
///
/// `action` is called once for every complete embedding.
pub fn search_with<F>(
    data_graph: &Graph,
    query_graph: &Graph,
    candidates: &Candidates,
    order: &[EdgeId],
    config: &Config,
    action: F,
) -> Outcome
where
    F: FnMut(&Embedding),
{
    debug_assert_eq!(order.len(), query_graph.edge_count());

    let mut search = Search {
        data_graph,
        query_graph,
        candidates,
        order,
        refinement: config.refinement,
        meter: Meter::from(config.budget),
        embeddings: 0,
        nodes: 0,
        action,
    };

    // The single mapping of this search, only changed through scoped bindings.
    let mut mapping = Mapping::new(query_graph.edge_count());

    let flow = search.expand(&mut mapping, 0);
    debug_assert_eq!(mapping.size(), 0);

    debug!(
        "Expanded {} search nodes, found {} embeddings",
        search.nodes, search.embeddings
    );

    if flow.is_break() {
        Outcome::Truncated {
            embeddings: search.embeddings,
        }
    } else {
        Outcome::Complete {
            embeddings: search.embeddings,
        }
    }
}

struct Search<'a, F> {
    data_graph: &'a Graph,
    query_graph: &'a Graph,
    candidates: &'a Candidates,
    order: &'a [EdgeId],
    refinement: Refinement,
    meter: Meter,
    embeddings: usize,
    nodes: u64,
    action: F,
}

impl<F> Search<'_, F>
where
    F: FnMut(&Embedding),
{
    fn expand(&mut self, mapping: &mut Mapping, depth: usize) -> ControlFlow<()> {
        if depth == self.order.len() {
            if let Some(embedding) = mapping.to_embedding() {
                self.embeddings += 1;
                (self.action)(&embedding);
            }
            return ControlFlow::Continue(());
        }

        if self.meter.is_exhausted(self.nodes) {
            return ControlFlow::Break(());
        }
        self.nodes += 1;

        let query_edge = self.order[depth];
        let candidates = refine(
            self.candidates.candidates(query_edge),
            self.query_graph,
            self.data_graph,
            mapping,
            query_edge,
            self.refinement,
        );

        for data_edge in candidates {
            if !is_compatible(self.query_graph, self.data_graph, query_edge, data_edge)
                || !is_joinable(self.query_graph, self.data_graph, mapping, query_edge, data_edge)
            {
                continue;
            }
            // Go down into the rabbit hole, the binding is undone when it goes out of scope.
            if let Some(mut binding) = mapping.bind(query_edge, data_edge) {
                if self.expand(&mut binding, depth + 1).is_break() {
                    return ControlFlow::Break(());
                }
            }
        }

        ControlFlow::Continue(())
    }
}

enum Meter {
    Unlimited,
    Nodes(u64),
    Deadline(Instant),
}

impl From<Option<Budget>> for Meter {
    fn from(budget: Option<Budget>) -> Self {
        match budget {
            None => Meter::Unlimited,
            Some(Budget::Nodes(nodes)) => Meter::Nodes(nodes),
            Some(Budget::Time(duration)) => match Instant::now().checked_add(duration) {
                Some(deadline) => Meter::Deadline(deadline),
                None => Meter::Unlimited,
            },
        }
    }
}

impl Meter {
    fn is_exhausted(&self, expanded: u64) -> bool {
        match self {
            Meter::Unlimited => false,
            Meter::Nodes(nodes) => expanded >= *nodes,
            Meter::Deadline(deadline) => Instant::now() >= *deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Filter, Order},
        filter, order,
        structure::is_consistent,
    };
    use std::time::Duration;
    use trim_margin::MarginTrimmable;

    fn graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    // 0 -a-> 1 -b-> 2 -a-> 3 -b-> 4, 1 -b-> 3
    const TEST_GRAPH: &str = "
        |t 5 5
        |e 0 1 a
        |e 1 2 b
        |e 2 3 a
        |e 3 4 b
        |e 1 3 b
        |";

    fn run(data_graph: &Graph, query_graph: &Graph, config: Config) -> (Outcome, Vec<Embedding>) {
        let candidates = filter::initial_candidates(data_graph, query_graph, config.filter).unwrap();
        let order = order::matching_order(query_graph, &candidates, config.order);

        let mut embeddings = Vec::new();
        let outcome = search_with(data_graph, query_graph, &candidates, &order, &config, |e| {
            embeddings.push(e.clone())
        });
        (outcome, embeddings)
    }

    #[test]
    fn test_line_query() {
        let data_graph = graph(TEST_GRAPH);
        let query_graph = "t 3 2\ne 0 1 a\ne 1 2 b\n".parse::<Graph>().unwrap();

        let (outcome, embeddings) = run(&data_graph, &query_graph, Config::default());

        assert_eq!(outcome, Outcome::Complete { embeddings: 3 });
        assert_eq!(
            embeddings,
            vec![
                Embedding::from(vec![0, 1]),
                Embedding::from(vec![0, 4]),
                Embedding::from(vec![2, 3]),
            ]
        );
    }

    #[test]
    fn test_unpruned_configuration_finds_the_same_embeddings() {
        let data_graph = graph(TEST_GRAPH);
        let query_graph = "t 3 2\ne 0 1 a\ne 1 2 b\n".parse::<Graph>().unwrap();

        let config = Config::new(Filter::Identity, Refinement::Identity, Order::Gql);
        let (outcome, mut found) = run(&data_graph, &query_graph, config);
        found.sort();

        let (_, mut expected) = run(&data_graph, &query_graph, Config::default());
        expected.sort();

        assert_eq!(outcome.embedding_count(), 3);
        assert_eq!(found, expected);
    }

    #[test]
    fn test_embeddings_are_consistent() {
        let data_graph = graph(TEST_GRAPH);
        // 0 -a-> 1 -b-> 2, 1 -b-> 3
        let query_graph = "t 4 3\ne 0 1 a\ne 1 2 b\ne 1 3 b\n".parse::<Graph>().unwrap();

        let config = Config::new(Filter::Identity, Refinement::Identity, Order::Enumeration);
        let (outcome, embeddings) = run(&data_graph, &query_graph, config);

        // the two b edges leaving 1 can be matched in either order
        assert_eq!(outcome.embedding_count(), 2);
        for embedding in embeddings.iter() {
            assert!(is_consistent(&query_graph, &data_graph, embedding));
        }
    }

    #[test]
    fn test_node_budget_truncates() {
        let data_graph = graph(TEST_GRAPH);
        let query_graph = "t 3 2\ne 0 1 a\ne 1 2 b\n".parse::<Graph>().unwrap();

        let config = Config::default().with_budget(Budget::Nodes(2));
        let (outcome, embeddings) = run(&data_graph, &query_graph, config);

        assert!(outcome.is_truncated());
        assert_eq!(outcome.embedding_count(), embeddings.len());
        assert_eq!(embeddings, vec![Embedding::from(vec![0, 1]), Embedding::from(vec![0, 4])]);

        let config = Config::default().with_budget(Budget::Nodes(100));
        let (outcome, _) = run(&data_graph, &query_graph, config);
        assert_eq!(outcome, Outcome::Complete { embeddings: 3 });
    }

    #[test]
    fn test_expired_deadline_truncates() {
        let data_graph = graph(TEST_GRAPH);
        let query_graph = "t 3 2\ne 0 1 a\ne 1 2 b\n".parse::<Graph>().unwrap();

        let config = Config::default().with_budget(Budget::Time(Duration::from_secs(0)));
        let (outcome, embeddings) = run(&data_graph, &query_graph, config);

        assert_eq!(outcome, Outcome::Truncated { embeddings: 0 });
        assert!(embeddings.is_empty());
    }

    #[test]
    fn test_no_match_is_complete() {
        let data_graph = graph(TEST_GRAPH);
        // a b-cycle of length two does not exist
        let query_graph = "t 2 2\ne 0 1 b\ne 1 0 b\n".parse::<Graph>().unwrap();

        let config = Config::from(Filter::Label);
        let (outcome, embeddings) = run(&data_graph, &query_graph, config);

        assert_eq!(outcome, Outcome::Complete { embeddings: 0 });
        assert!(embeddings.is_empty());
    }
}
