/*!
## Temporal Isomorphism

A library for finding temporal patterns in labeled multigraphs.

Given a query graph and a data graph, both with labeled, time-bounded
edges, the library enumerates injective edge mappings that preserve
labels, the incidence structure of the query and the overlap of validity
intervals. Besides general queries, directed triangles and connected
vertex sets of a fixed size can be enumerated and recorded in a SQLite
database.

The search is inspired by https://github.com/RapidsAtHKUST/SubgraphMatching
and its [paper](https://dl.acm.org/doi/10.1145/3318464.3380581) published at SIGMOD 2020,
adapted to match edges instead of vertices.

### License

MIT
*/
pub mod config;
pub mod enumerate;
pub mod filter;
pub mod generate;
pub mod graph;
pub mod interval;
pub mod mapping;
pub mod order;
pub mod pattern;
pub mod store;
pub mod structure;

use std::io;

use cfg_if::cfg_if;
use graph::Graph;
use mapping::Embedding;
use thiserror::Error;
use tracing::{debug, info};

pub use config::{Budget, Config, Filter, Order, Refinement};
pub use enumerate::Outcome;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error while parsing graph file")]
    ParseGraph {
        #[from]
        source: io::Error,
    },
    #[error("error while parsing GDL graph")]
    ParseGdlGraph {
        #[from]
        source: gdl::graph::GraphHandlerError,
    },
    #[error("malformed graph in line {line}: {reason}")]
    MalformedGraph { line: usize, reason: String },
    #[error("pattern store is unavailable: {reason}")]
    StoreUnavailable { reason: String },
    #[error("error while accessing the pattern store")]
    Store {
        #[from]
        source: rusqlite::Error,
    },
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),
    #[error("unknown graph table {0:?}")]
    UnknownTable(String),
    #[error("invalid edge {edge_id}: {reason}")]
    InvalidEdge { edge_id: i64, reason: String },
    #[error("invalid pattern instance: {0}")]
    InvalidInstance(String),
}

pub fn find(data_graph: &Graph, query_graph: &Graph, config: &Config) -> Outcome {
    find_with(data_graph, query_graph, |_| {}, config)
}

/// Runs a complete search of `query_graph` in `data_graph`.
///
/// Candidates are filtered, the matching order is fixed and the search
/// space is enumerated depth-first. `action` is called for every embedding,
/// which maps each query edge id to its data edge id.
pub fn find_with<F>(data_graph: &Graph, query_graph: &Graph, action: F, config: &Config) -> Outcome
where
    F: FnMut(&Embedding),
{
    debug!("Searching with {}", config);

    let candidates = match filter::initial_candidates(data_graph, query_graph, config.filter) {
        Ok(candidates) => candidates,
        Err(filter::NoCandidates(query_edge)) => {
            info!("Query edge {} has no candidates", query_edge);
            return Outcome::Infeasible { query_edge };
        }
    };
    debug!("Candidate counts: {}", candidates);

    let order = order::matching_order(query_graph, &candidates, config.order);
    debug!("Matching order: {:?}", order);

    enumerate::search_with(data_graph, query_graph, &candidates, &order, config, action)
}

/// Searches each of `query_graphs` in `data_graph`.
///
/// Searches are independent and run in parallel with the `parallel` feature.
pub fn find_all(data_graph: &Graph, query_graphs: &[Graph], config: &Config) -> Vec<Outcome> {
    cfg_if! {
        if #[cfg(feature = "parallel")] {
            par_find_all(data_graph, query_graphs, config)
        } else {
            query_graphs
                .iter()
                .map(|query_graph| find(data_graph, query_graph, config))
                .collect()
        }
    }
}

#[cfg(feature = "parallel")]
fn par_find_all(data_graph: &Graph, query_graphs: &[Graph], config: &Config) -> Vec<Outcome> {
    use rayon::prelude::*;

    query_graphs
        .par_iter()
        .map(|query_graph| find(data_graph, query_graph, config))
        .collect()
}
