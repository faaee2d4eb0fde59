use std::{collections::HashMap, path::Path};

use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use crate::{
    graph::{Edge, Graph, VertexId},
    interval::{Interval, Time},
    pattern::Instance,
    Error,
};

use super::{
    clique_signature, label_table_name, validate_table_name, CliqueRow, PatternStore, TriangleRow,
};

/// Edge, label and pattern tables in a SQLite database.
///
/// Changes made between [`SqliteStore::begin`] and [`SqliteStore::commit`]
/// are discarded if the store is dropped before committing.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens the database at `path`, creating the file only if `create` is set.
    pub fn open(path: impl AsRef<Path>, create: bool) -> Result<Self, Error> {
        let path = path.as_ref();
        let unavailable = |e: rusqlite::Error| Error::StoreUnavailable {
            reason: format!("{}: {}", path.display(), e),
        };

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(path, flags).map_err(unavailable)?;
        // Some failures, e.g. a file that is not a database, only show on first use.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(unavailable)?;

        debug!("Opened store at {:?}", path);

        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    /// Creates an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(|e| Error::StoreUnavailable {
            reason: e.to_string(),
        })?;

        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<(), Error> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS triangles (
                tid INTEGER PRIMARY KEY AUTOINCREMENT,
                eid1 INTEGER NOT NULL,
                eid2 INTEGER NOT NULL,
                eid3 INTEGER NOT NULL,
                encoding TEXT NOT NULL,
                window_st INTEGER,
                window_nd INTEGER,
                UNIQUE (eid1, eid2, eid3)
            );

            CREATE TABLE IF NOT EXISTS cliques (
                kid INTEGER PRIMARY KEY,
                num_verts INTEGER NOT NULL,
                encoding TEXT NOT NULL,
                window_st INTEGER,
                window_nd INTEGER,
                signature TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS clq_cts (
                kid INTEGER NOT NULL REFERENCES cliques(kid),
                eid INTEGER NOT NULL,
                PRIMARY KEY (kid, eid)
            );
            "#,
        )?;

        Ok(())
    }

    pub fn begin(&self) -> Result<(), Error> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<(), Error> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn has_graph(&self, table: &str) -> Result<bool, Error> {
        let table = validate_table_name(table)?;
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Drops the edge table and its label table.
    pub fn clear_graph(&self, table: &str) -> Result<(), Error> {
        let table = validate_table_name(table)?;
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; DROP TABLE IF EXISTS {};",
            label_table_name(table),
            table
        ))?;
        Ok(())
    }

    /// Removes all recorded triangles and cliques.
    pub fn clear_patterns(&self) -> Result<(), Error> {
        self.conn
            .execute_batch("DELETE FROM clq_cts; DELETE FROM cliques; DELETE FROM triangles;")?;
        Ok(())
    }

    /// Writes the edges of `graph` into `table`, keyed by their external ids.
    ///
    /// Edges that already exist in the table are left unchanged.
    pub fn write_graph(&self, table: &str, graph: &Graph) -> Result<(), Error> {
        let table = validate_table_name(table)?;
        let labels = label_table_name(table);

        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {edges} (
                edge_id INTEGER PRIMARY KEY,
                source_id INTEGER NOT NULL,
                target_id INTEGER NOT NULL,
                "start" INTEGER,
                "end" INTEGER
            );

            CREATE TABLE IF NOT EXISTS {labels} (
                edge_id INTEGER NOT NULL REFERENCES {edges}(edge_id),
                label TEXT NOT NULL,
                PRIMARY KEY (edge_id, label)
            );
            "#,
            edges = table,
            labels = labels
        ))?;

        let mut insert_edge = self.conn.prepare(&format!(
            r#"INSERT OR IGNORE INTO {} (edge_id, source_id, target_id, "start", "end")
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            table
        ))?;
        let mut insert_label = self.conn.prepare(&format!(
            "INSERT OR IGNORE INTO {} (edge_id, label) VALUES (?1, ?2)",
            labels
        ))?;

        for (id, edge) in graph.edges().iter().enumerate() {
            let edge_id = graph.external_id(id);
            let (start, end) = if edge.interval.is_bounded() {
                (Some(edge.interval.start()), Some(edge.interval.end()))
            } else {
                (None, None)
            };

            insert_edge.execute(params![
                edge_id,
                edge.source as i64,
                edge.target as i64,
                start,
                end
            ])?;
            insert_label.execute(params![edge_id, edge.label.to_string()])?;
        }

        debug!("Wrote {} edges to {}", graph.edge_count(), table);

        Ok(())
    }

    /// Materializes the graph stored in `table`.
    ///
    /// Each call reads the current table contents. Vertex and edge ids are
    /// renumbered densely in edge id order, the stored edge ids remain
    /// available as external ids.
    pub fn snapshot(&self, table: &str) -> Result<Graph, Error> {
        let table = validate_table_name(table)?;
        if !self.has_graph(table)? {
            return Err(Error::UnknownTable(table.to_string()));
        }

        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT e.edge_id, e.source_id, e.target_id, e."start", e."end", l.label
               FROM {} AS e LEFT JOIN {} AS l ON e.edge_id = l.edge_id
               ORDER BY e.edge_id, l.label"#,
            table,
            label_table_name(table)
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<Time>>(3)?,
                row.get::<_, Option<Time>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        fn intern(vertex_ids: &mut HashMap<i64, VertexId>, id: i64) -> VertexId {
            let next = vertex_ids.len();
            *vertex_ids.entry(id).or_insert(next)
        }

        let mut vertex_ids = HashMap::new();
        let mut edges = Vec::new();
        let mut external_ids = Vec::new();

        for row in rows {
            let (edge_id, source, target, start, end, label) = row?;

            // only the first label of an edge is used
            if external_ids.last() == Some(&edge_id) {
                continue;
            }

            let invalid = |reason: &str| Error::InvalidEdge {
                edge_id,
                reason: reason.to_string(),
            };

            let label = label
                .and_then(|label| label.chars().next())
                .ok_or_else(|| invalid("missing label"))?;
            let interval = match (start, end) {
                (Some(start), Some(end)) => {
                    Interval::new(start, end).ok_or_else(|| invalid("interval start after end"))?
                }
                (None, None) => Interval::ALWAYS,
                _ => return Err(invalid("start and end must be given together")),
            };

            let source = intern(&mut vertex_ids, source);
            let target = intern(&mut vertex_ids, target);

            edges.push(Edge::new(source, target, label, interval));
            external_ids.push(edge_id);
        }

        debug!("Read {} edges from {}", edges.len(), table);

        Ok(Graph::with_external_ids(vertex_ids.len(), edges, external_ids))
    }

    pub fn triangles(&self) -> Result<Vec<TriangleRow>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT eid1, eid2, eid3, encoding, window_st, window_nd FROM triangles ORDER BY tid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(TriangleRow {
                eids: [row.get(0)?, row.get(1)?, row.get(2)?],
                encoding: row.get(3)?,
                window: window(row.get(4)?, row.get(5)?),
            })
        })?;

        let mut triangles = Vec::new();
        for row in rows {
            triangles.push(row?);
        }
        Ok(triangles)
    }

    pub fn cliques(&self) -> Result<Vec<CliqueRow>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT kid, num_verts, encoding, window_st, window_nd FROM cliques ORDER BY kid",
        )?;
        let mut members = self
            .conn
            .prepare("SELECT eid FROM clq_cts WHERE kid = ?1 ORDER BY eid")?;

        let rows = stmt.query_map([], |row| {
            Ok(CliqueRow {
                kid: row.get(0)?,
                num_verts: row.get::<_, i64>(1)? as usize,
                encoding: row.get(2)?,
                window: window(row.get(3)?, row.get(4)?),
                eids: Vec::new(),
            })
        })?;

        let mut cliques = Vec::new();
        for row in rows {
            let mut clique = row?;
            for eid in members.query_map(params![clique.kid], |row| row.get(0))? {
                clique.eids.push(eid?);
            }
            cliques.push(clique);
        }
        Ok(cliques)
    }
}

// A NULL bound is unbounded on that side. Both bounds NULL is read as no
// window, since empty and unbounded windows share that representation.
fn window(start: Option<Time>, end: Option<Time>) -> Option<Interval> {
    match (start, end) {
        (Some(start), Some(end)) => Interval::new(start, end),
        (Some(start), None) => Interval::new(start, Time::MAX),
        (None, Some(end)) => Interval::new(Time::MIN, end),
        (None, None) => None,
    }
}

fn window_bounds(window: Option<Interval>) -> (Option<Time>, Option<Time>) {
    match window {
        Some(window) => (
            Some(window.start()).filter(|&start| start != Time::MIN),
            Some(window.end()).filter(|&end| end != Time::MAX),
        ),
        None => (None, None),
    }
}

impl PatternStore for SqliteStore {
    fn insert_triangle(&mut self, graph: &Graph, triangle: &Instance) -> Result<bool, Error> {
        let row = TriangleRow::new(graph, triangle)?;
        let (window_st, window_nd) = window_bounds(row.window);

        let changes = self.conn.execute(
            "INSERT OR IGNORE INTO triangles (eid1, eid2, eid3, encoding, window_st, window_nd)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.eids[0],
                row.eids[1],
                row.eids[2],
                row.encoding,
                window_st,
                window_nd
            ],
        )?;

        Ok(changes == 1)
    }

    fn insert_clique(&mut self, graph: &Graph, clique: &Instance) -> Result<bool, Error> {
        let (eids, signature) = clique_signature(graph, clique);
        let (window_st, window_nd) = window_bounds(clique.window);

        let changes = self.conn.execute(
            "INSERT OR IGNORE INTO cliques (num_verts, encoding, window_st, window_nd, signature)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                clique.vertices.len() as i64,
                clique.encoding,
                window_st,
                window_nd,
                signature
            ],
        )?;

        let kid: i64 = self.conn.query_row(
            "SELECT kid FROM cliques WHERE signature = ?1",
            params![signature],
            |row| row.get(0),
        )?;

        let mut insert_member = self
            .conn
            .prepare("INSERT OR IGNORE INTO clq_cts (kid, eid) VALUES (?1, ?2)")?;
        for eid in eids {
            insert_member.execute(params![kid, eid])?;
        }

        Ok(changes == 1)
    }
}
