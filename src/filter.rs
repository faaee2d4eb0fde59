use std::fmt::Display;

use crate::{
    config::{Filter, Refinement},
    graph::{EdgeId, Graph},
    mapping::Mapping,
    structure::is_joinable,
};

mod ldf;
mod temporal;

pub use ldf::{label_filter, ldf_filter};
pub use temporal::temporal_filter;

/// A query edge that no data edge can ever match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoCandidates(pub EdgeId);

#[derive(Debug, Default)]
pub struct Candidates {
    /// candidates for each query edge
    candidates: Box<[Vec<EdgeId>]>,
}

impl Candidates {
    pub fn new(candidates: Vec<Vec<EdgeId>>) -> Self {
        Self {
            candidates: candidates.into_boxed_slice(),
        }
    }

    pub fn add_candidate(&mut self, query_edge: EdgeId, data_edge: EdgeId) {
        self.candidates[query_edge].push(data_edge);
    }

    pub fn candidates(&self, query_edge: EdgeId) -> &[EdgeId] {
        self.candidates[query_edge].as_slice()
    }

    pub fn candidate_count(&self, query_edge: EdgeId) -> usize {
        self.candidates[query_edge].len()
    }

    pub fn sort(&mut self) {
        for c in self.candidates.iter_mut() {
            c.sort_unstable()
        }
    }

    /// Fails with the first query edge that has no candidates.
    pub fn validate(self) -> Result<Self, NoCandidates> {
        match self.candidates.iter().position(Vec::is_empty) {
            Some(query_edge) => Err(NoCandidates(query_edge)),
            None => Ok(self),
        }
    }
}

impl From<(&Graph, &Graph)> for Candidates {
    fn from((data_graph, query_graph): (&Graph, &Graph)) -> Self {
        let query_edge_count = query_graph.edge_count();
        let max_candidates = data_graph.max_label_frequency();

        let mut candidates = Vec::with_capacity(query_edge_count);

        for _ in 0..query_edge_count {
            candidates.push(Vec::<EdgeId>::with_capacity(max_candidates));
        }

        Self::new(candidates)
    }
}

impl Display for Candidates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts = self
            .candidates
            .iter()
            .enumerate()
            .map(|(n, c)| format!("{}: {}", n, c.len()))
            .collect::<Vec<_>>();

        write!(f, "{{{}}}", counts.join(", "))
    }
}

/// Computes the initial, sorted candidates for every query edge.
pub fn initial_candidates(
    data_graph: &Graph,
    query_graph: &Graph,
    filter: Filter,
) -> Result<Candidates, NoCandidates> {
    let mut candidates = match filter {
        Filter::Identity => identity_filter(data_graph, query_graph),
        Filter::Label => label_filter(data_graph, query_graph),
        Filter::Ldf => ldf_filter(data_graph, query_graph),
        Filter::Temporal => temporal_filter(data_graph, query_graph),
    }?;

    // Sort candidates to keep the search order deterministic
    candidates.sort();
    Ok(candidates)
}

// Every data edge is a candidate for every query edge.
pub fn identity_filter(data_graph: &Graph, query_graph: &Graph) -> Result<Candidates, NoCandidates> {
    let all_edges = (0..data_graph.edge_count()).collect::<Vec<_>>();
    Candidates::new(vec![all_edges; query_graph.edge_count()]).validate()
}

/// Whether `data_edge` can match `query_edge` in isolation: same label
/// and overlapping validity intervals.
pub fn is_compatible(
    query_graph: &Graph,
    data_graph: &Graph,
    query_edge: EdgeId,
    data_edge: EdgeId,
) -> bool {
    let query_edge = query_graph.edge(query_edge);
    let data_edge = data_graph.edge(data_edge);
    query_edge.label == data_edge.label && query_edge.interval.overlaps(&data_edge.interval)
}

/// Narrows the candidates of `query_edge` given the current partial mapping.
///
/// The returned candidates keep the ascending order of the input.
pub fn refine(
    candidates: &[EdgeId],
    query_graph: &Graph,
    data_graph: &Graph,
    mapping: &Mapping,
    query_edge: EdgeId,
    refinement: Refinement,
) -> Vec<EdgeId> {
    match refinement {
        Refinement::Identity => candidates.to_vec(),
        Refinement::Structural => candidates
            .iter()
            .copied()
            .filter(|&data_edge| {
                !mapping.is_used(data_edge)
                    && is_joinable(query_graph, data_graph, mapping, query_edge, data_edge)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trim_margin::MarginTrimmable;

    fn graph(input: &str) -> Graph {
        input.trim_margin().unwrap().parse::<Graph>().unwrap()
    }

    #[test]
    fn test_candidates_sorting() {
        let input = vec![vec![4, 2], vec![1, 7, 3, 3], vec![0]];
        let mut candidates = Candidates::new(input);

        candidates.sort();

        assert_eq!(candidates.candidates(0), &[2, 4]);
        assert_eq!(candidates.candidates(1), &[1, 3, 3, 7]);
        assert_eq!(candidates.candidates(2), &[0]);
    }

    #[test]
    fn test_validate() {
        let candidates = Candidates::new(vec![vec![1], vec![], vec![]]);
        assert_eq!(candidates.validate().unwrap_err(), NoCandidates(1));
    }

    #[test]
    fn test_identity_filter() {
        let data_graph = "t 2 3\ne 0 1 a\ne 1 0 b\ne 0 0 c\n".parse::<Graph>().unwrap();
        let query_graph = "t 2 2\ne 0 1 x\ne 1 0 y\n".parse::<Graph>().unwrap();

        let candidates = initial_candidates(&data_graph, &query_graph, Filter::Identity).unwrap();
        assert_eq!(candidates.candidates(0), &[0, 1, 2]);
        assert_eq!(candidates.candidates(1), &[0, 1, 2]);

        assert!(!is_compatible(&query_graph, &data_graph, 0, 1));

        let empty = "t 2 0\n".parse::<Graph>().unwrap();
        assert_eq!(
            identity_filter(&empty, &query_graph).unwrap_err(),
            NoCandidates(0)
        );
    }

    #[test]
    fn test_refine() {
        // query: 0 -a-> 1 -a-> 2
        let query_graph = graph(
            "
            |t 3 2
            |e 0 1 a
            |e 1 2 a
            |",
        );
        // data: 0 -a-> 1 -a-> 2 -a-> 0
        let data_graph = graph(
            "
            |t 3 3
            |e 0 1 a
            |e 1 2 a
            |e 2 0 a
            |",
        );

        let mut mapping = Mapping::new(2);
        assert!(mapping.insert(0, 0));

        let all = [0, 1, 2];
        assert_eq!(
            refine(&all, &query_graph, &data_graph, &mapping, 1, Refinement::Identity),
            vec![0, 1, 2]
        );
        assert_eq!(
            refine(&all, &query_graph, &data_graph, &mapping, 1, Refinement::Structural),
            vec![1]
        );
    }
}
