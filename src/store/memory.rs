use std::collections::HashMap;

use crate::{graph::Graph, pattern::Instance, Error};

use super::{clique_signature, CliqueRow, PatternStore, TriangleRow};

/// Keeps pattern rows in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    triangles: Vec<TriangleRow>,
    triangle_index: HashMap<[i64; 3], usize>,
    cliques: Vec<CliqueRow>,
    clique_index: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn triangles(&self) -> &[TriangleRow] {
        &self.triangles
    }

    pub fn cliques(&self) -> &[CliqueRow] {
        &self.cliques
    }
}

impl PatternStore for MemoryStore {
    fn insert_triangle(&mut self, graph: &Graph, triangle: &Instance) -> Result<bool, Error> {
        let row = TriangleRow::new(graph, triangle)?;
        if self.triangle_index.contains_key(&row.eids) {
            return Ok(false);
        }
        self.triangle_index.insert(row.eids, self.triangles.len());
        self.triangles.push(row);
        Ok(true)
    }

    fn insert_clique(&mut self, graph: &Graph, clique: &Instance) -> Result<bool, Error> {
        let (eids, signature) = clique_signature(graph, clique);
        if self.clique_index.contains_key(&signature) {
            return Ok(false);
        }

        let kid = self.cliques.len() as i64;
        self.clique_index.insert(signature, self.cliques.len());
        self.cliques.push(CliqueRow {
            kid,
            num_verts: clique.vertices.len(),
            encoding: clique.encoding.clone(),
            window: clique.window,
            eids,
        });
        Ok(true)
    }
}
