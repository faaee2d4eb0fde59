//! Result tables for discovered patterns and edge tables for graphs.
//!
//! All pattern insertions are idempotent: recording an instance that is
//! already present leaves the store unchanged.

use crate::{graph::Graph, interval::Interval, pattern::Instance, Error};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A sink for pattern instances.
pub trait PatternStore {
    /// Records a triangle of `graph`. Returns `false` if it was already recorded.
    fn insert_triangle(&mut self, graph: &Graph, triangle: &Instance) -> Result<bool, Error>;

    /// Records a clique of `graph`. Returns `false` if it was already recorded.
    fn insert_clique(&mut self, graph: &Graph, clique: &Instance) -> Result<bool, Error>;
}

/// A row of the triangle table, edges given by their store ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleRow {
    pub eids: [i64; 3],
    pub encoding: String,
    pub window: Option<Interval>,
}

/// A row of the clique table together with its member edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliqueRow {
    pub kid: i64,
    pub num_verts: usize,
    pub encoding: String,
    pub window: Option<Interval>,
    pub eids: Vec<i64>,
}

impl TriangleRow {
    pub(crate) fn new(graph: &Graph, triangle: &Instance) -> Result<Self, Error> {
        match triangle.edges[..] {
            [e1, e2, e3] => Ok(TriangleRow {
                eids: [graph.external_id(e1), graph.external_id(e2), graph.external_id(e3)],
                encoding: triangle.encoding.clone(),
                window: triangle.window,
            }),
            _ => Err(Error::InvalidInstance(format!(
                "a triangle has three edges, got {}",
                triangle.edges.len()
            ))),
        }
    }
}

/// Identifies a clique independently of the order it was found in.
pub(crate) fn clique_signature(graph: &Graph, clique: &Instance) -> (Vec<i64>, String) {
    let mut eids = clique
        .edges
        .iter()
        .map(|&e| graph.external_id(e))
        .collect::<Vec<_>>();
    eids.sort_unstable();

    let vertices = clique
        .vertices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let edges = eids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    (eids, format!("{}|{}", vertices, edges))
}

/// Table names are interpolated into SQL and must be plain identifiers.
pub fn validate_table_name(name: &str) -> Result<&str, Error> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(Error::InvalidTableName(name.to_string()))
    }
}

pub fn label_table_name(edge_table: &str) -> String {
    format!("{}_labels", edge_table)
}
