use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use gdl::CypherValue;
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    convert::TryFrom,
    fmt::Display,
    fs::File,
    io::Read,
    ops::{Deref, Range},
    path::Path,
    str::FromStr,
    time::Instant,
};

use crate::{
    interval::{Interval, Time},
    Error,
};

use linereader::LineReader;
use tracing::debug;

pub type VertexId = usize;
pub type EdgeId = usize;
pub type Label = char;

/// A directed, labeled edge that is valid during `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub label: Label,
    pub interval: Interval,
}

impl Edge {
    pub fn new(source: VertexId, target: VertexId, label: Label, interval: Interval) -> Self {
        Edge {
            source,
            target,
            label,
            interval,
        }
    }

    /// An edge that is valid at all times.
    pub fn timeless(source: VertexId, target: VertexId, label: Label) -> Self {
        Edge::new(source, target, label, Interval::ALWAYS)
    }

    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A set of edge ids that adjacency lookups can be restricted to.
pub trait Domain {
    fn contains(&self, edge: EdgeId) -> bool;
}

impl Domain for BTreeSet<EdgeId> {
    fn contains(&self, edge: EdgeId) -> bool {
        BTreeSet::contains(self, &edge)
    }
}

impl Domain for HashSet<EdgeId> {
    fn contains(&self, edge: EdgeId) -> bool {
        HashSet::contains(self, &edge)
    }
}

/// An immutable, time-intervalled multigraph.
///
/// Edges are identified by their position in [`Graph::edges`]. Outgoing
/// and incoming edges of each vertex are stored in CSR layout, sorted by
/// edge id.
pub struct Graph {
    vertex_count: usize,
    edges: Box<[Edge]>,
    external_ids: Box<[i64]>,
    out_offsets: Box<[usize]>,
    out_edges: Box<[EdgeId]>,
    in_offsets: Box<[usize]>,
    in_edges: Box<[EdgeId]>,
    label_index: HashMap<Label, Box<[EdgeId]>>,
    max_degree: usize,
    max_label_frequency: usize,
}

impl Graph {
    /// Builds a graph whose external edge ids are the dense edge ids.
    pub fn new(vertex_count: usize, edges: Vec<Edge>) -> Self {
        let external_ids = (0..edges.len() as i64).collect();
        Graph::with_external_ids(vertex_count, edges, external_ids)
    }

    /// Builds a graph that remembers the id each edge carries in its
    /// backing store. `external_ids[e]` belongs to `edges[e]`.
    pub fn with_external_ids(vertex_count: usize, edges: Vec<Edge>, external_ids: Vec<i64>) -> Self {
        assert_eq!(edges.len(), external_ids.len());
        Graph::from(ParseGraph {
            vertex_count,
            edges,
            external_ids,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> Range<VertexId> {
        0..self.vertex_count
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge: EdgeId) -> &Edge {
        &self.edges[edge]
    }

    pub fn edge_tuple(&self, edge: EdgeId) -> (VertexId, VertexId) {
        let edge = &self.edges[edge];
        (edge.source, edge.target)
    }

    pub fn label(&self, edge: EdgeId) -> Label {
        self.edges[edge].label
    }

    pub fn interval(&self, edge: EdgeId) -> Interval {
        self.edges[edge].interval
    }

    pub fn external_id(&self, edge: EdgeId) -> i64 {
        self.external_ids[edge]
    }

    pub fn out_edges(&self, vertex: VertexId) -> &[EdgeId] {
        &self.out_edges[self.out_offsets[vertex]..self.out_offsets[vertex + 1]]
    }

    pub fn in_edges(&self, vertex: VertexId) -> &[EdgeId] {
        &self.in_edges[self.in_offsets[vertex]..self.in_offsets[vertex + 1]]
    }

    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.out_offsets[vertex + 1] - self.out_offsets[vertex]
    }

    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.in_offsets[vertex + 1] - self.in_offsets[vertex]
    }

    pub fn degree(&self, vertex: VertexId) -> usize {
        self.out_degree(vertex) + self.in_degree(vertex)
    }

    /// Vertices reachable from `vertex` by one hop in either direction.
    pub fn neighbors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges(vertex)
            .iter()
            .map(move |&e| self.edges[e].target)
            .chain(self.in_edges(vertex).iter().map(move |&e| self.edges[e].source))
    }

    /// Vertices outside of `vertices` that are one hop away from any of them.
    pub fn adjacent_to(&self, vertices: &BTreeSet<VertexId>) -> BTreeSet<VertexId> {
        vertices
            .iter()
            .flat_map(|&v| self.neighbors(v))
            .filter(|v| !vertices.contains(v))
            .collect()
    }

    /// Edges ending in `vertex` whose id lies in `domain`.
    pub fn predecessor_edges<'a, D>(
        &'a self,
        vertex: VertexId,
        domain: &'a D,
    ) -> impl Iterator<Item = EdgeId> + 'a
    where
        D: Domain + ?Sized,
    {
        self.in_edges(vertex)
            .iter()
            .copied()
            .filter(move |&e| domain.contains(e))
    }

    /// Edges starting in `vertex` whose id lies in `domain`.
    pub fn successor_edges<'a, D>(
        &'a self,
        vertex: VertexId,
        domain: &'a D,
    ) -> impl Iterator<Item = EdgeId> + 'a
    where
        D: Domain + ?Sized,
    {
        self.out_edges(vertex)
            .iter()
            .copied()
            .filter(move |&e| domain.contains(e))
    }

    /// Edges with both endpoints in `vertices`, in ascending id order.
    pub fn induced_edges(&self, vertices: &BTreeSet<VertexId>) -> Vec<EdgeId> {
        let mut edges = vertices
            .iter()
            .flat_map(|&v| self.out_edges(v))
            .copied()
            .filter(|&e| vertices.contains(&self.edges[e].target))
            .collect::<Vec<_>>();
        edges.sort_unstable();
        edges
    }

    pub fn edges_by_label(&self, label: Label) -> &[EdgeId] {
        self.label_index
            .get(&label)
            .map(|edges| &edges[..])
            .unwrap_or(&[])
    }

    pub fn label_count(&self) -> usize {
        self.label_index.len()
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn max_label_frequency(&self) -> usize {
        self.max_label_frequency
    }

    /// Whether any edge carries a bounded validity interval.
    pub fn is_temporal(&self) -> bool {
        self.edges.iter().any(|edge| edge.interval.is_bounded())
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "|V|: {}, |E|: {}, |Σ|: {}\nMax Degree: {}, Max Label Frequency: {}",
            self.vertex_count,
            self.edges.len(),
            self.label_count(),
            self.max_degree,
            self.max_label_frequency
        )
    }
}

impl FromStr for Graph {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Error> {
        let reader = LineReader::new(input.as_bytes());
        let parse_graph = ParseGraph::try_from(reader)?;
        Ok(Graph::from(parse_graph))
    }
}

struct ParseGraph {
    vertex_count: usize,
    edges: Vec<Edge>,
    external_ids: Vec<i64>,
}

fn malformed(line: usize, reason: impl Into<String>) -> Error {
    Error::MalformedGraph {
        line,
        reason: reason.into(),
    }
}

fn parse_count(token: Option<&[u8]>, line: usize) -> Result<usize, Error> {
    let token = token.ok_or_else(|| malformed(line, "missing number"))?;
    match usize::from_radix_10_checked(token) {
        (Some(value), used) if used == token.len() => Ok(value),
        _ => Err(malformed(line, "expected a non-negative integer")),
    }
}

fn parse_time(token: &[u8], line: usize) -> Result<Time, Error> {
    match Time::from_radix_10_signed_checked(token) {
        (Some(value), used) if used == token.len() && !token.is_empty() => Ok(value),
        _ => Err(malformed(line, "expected an integer time")),
    }
}

fn parse_label(token: Option<&[u8]>, line: usize) -> Result<Label, Error> {
    let token = token.ok_or_else(|| malformed(line, "missing label"))?;
    let token = std::str::from_utf8(token).map_err(|_| malformed(line, "label is not utf-8"))?;
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(label), None) => Ok(label),
        _ => Err(malformed(line, "label must be a single character")),
    }
}

// Format:
//
// t <vertex_count> <edge_count>
// e <source> <target> <label> [<start> <end>]
impl<R> TryFrom<LineReader<R>> for ParseGraph
where
    R: Read,
{
    type Error = Error;

    fn try_from(mut lines: LineReader<R>) -> Result<Self, Error> {
        let mut header = None;
        let mut edges = Vec::new();
        let mut line_number = 0;

        while let Some(line) = lines.next_line() {
            let line = line?;
            line_number += 1;

            let mut tokens = line
                .split(|b| b.is_ascii_whitespace())
                .filter(|token| !token.is_empty());

            match tokens.next() {
                None | Some([b'#', ..]) => continue,
                Some(b"t") => {
                    let vertex_count = parse_count(tokens.next(), line_number)?;
                    let edge_count = parse_count(tokens.next(), line_number)?;
                    edges.reserve(edge_count);
                    header = Some((vertex_count, edge_count));
                }
                Some(b"e") => {
                    let (vertex_count, _) =
                        header.ok_or_else(|| malformed(line_number, "missing header line"))?;
                    let source = parse_count(tokens.next(), line_number)?;
                    let target = parse_count(tokens.next(), line_number)?;
                    if source >= vertex_count || target >= vertex_count {
                        return Err(malformed(line_number, "vertex id out of range"));
                    }
                    let label = parse_label(tokens.next(), line_number)?;
                    let interval = match (tokens.next(), tokens.next()) {
                        (None, _) => Interval::ALWAYS,
                        (Some(start), Some(end)) => Interval::new(
                            parse_time(start, line_number)?,
                            parse_time(end, line_number)?,
                        )
                        .ok_or_else(|| malformed(line_number, "interval start after end"))?,
                        (Some(_), None) => {
                            return Err(malformed(line_number, "interval is missing its end"))
                        }
                    };
                    edges.push(Edge::new(source, target, label, interval));
                }
                Some(_) => return Err(malformed(line_number, "unknown record type")),
            }
        }

        let (vertex_count, edge_count) = header.ok_or_else(|| malformed(0, "missing header line"))?;
        if edges.len() != edge_count {
            return Err(malformed(
                line_number,
                format!("expected {} edges, found {}", edge_count, edges.len()),
            ));
        }

        let external_ids = (0..edges.len() as i64).collect();

        Ok(Self {
            vertex_count,
            edges,
            external_ids,
        })
    }
}

impl ParseGraph {
    // CSR offsets and targets, filled in edge id order so
    // that each adjacency list is sorted.
    fn adjacency(&self, endpoint: impl Fn(&Edge) -> VertexId) -> (Vec<usize>, Vec<EdgeId>) {
        let mut offsets = vec![0_usize; self.vertex_count + 1];
        for edge in self.edges.iter() {
            offsets[endpoint(edge) + 1] += 1;
        }
        for vertex in 0..self.vertex_count {
            offsets[vertex + 1] += offsets[vertex];
        }

        // stores the next offset to insert for each vertex
        let mut next_offset = vec![0; self.vertex_count];
        let mut adjacency = vec![0; self.edges.len()];

        for (id, edge) in self.edges.iter().enumerate() {
            let vertex = endpoint(edge);
            adjacency[offsets[vertex] + next_offset[vertex]] = id;
            next_offset[vertex] += 1;
        }

        (offsets, adjacency)
    }

    fn label_index(&self) -> HashMap<Label, Box<[EdgeId]>> {
        let mut index = HashMap::<Label, Vec<EdgeId>>::new();
        for (id, edge) in self.edges.iter().enumerate() {
            index.entry(edge.label).or_default().push(id);
        }
        index
            .into_iter()
            .map(|(label, edges)| (label, edges.into_boxed_slice()))
            .collect()
    }
}

impl From<ParseGraph> for Graph {
    fn from(mut parse_graph: ParseGraph) -> Self {
        let max_endpoint = parse_graph
            .edges
            .iter()
            .map(|edge| edge.source.max(edge.target) + 1)
            .max()
            .unwrap_or_default();
        parse_graph.vertex_count = parse_graph.vertex_count.max(max_endpoint);

        let (out_offsets, out_edges) = parse_graph.adjacency(|edge| edge.source);
        let (in_offsets, in_edges) = parse_graph.adjacency(|edge| edge.target);
        let label_index = parse_graph.label_index();

        let max_degree = (0..parse_graph.vertex_count)
            .map(|v| out_offsets[v + 1] - out_offsets[v] + in_offsets[v + 1] - in_offsets[v])
            .max()
            .unwrap_or_default();
        let max_label_frequency = label_index
            .values()
            .map(|edges| edges.len())
            .max()
            .unwrap_or_default();

        Self {
            vertex_count: parse_graph.vertex_count,
            edges: parse_graph.edges.into_boxed_slice(),
            external_ids: parse_graph.external_ids.into_boxed_slice(),
            out_offsets: out_offsets.into_boxed_slice(),
            out_edges: out_edges.into_boxed_slice(),
            in_offsets: in_offsets.into_boxed_slice(),
            in_edges: in_edges.into_boxed_slice(),
            label_index,
            max_degree,
            max_label_frequency,
        }
    }
}

/// A graph described in GDL, e.g. `(a)-[:X {start: 0, end: 10}]->(b)`.
///
/// GDL relationship types start with an uppercase letter, so the label is
/// the lowercased first character of the type. A string property `label`
/// takes precedence, e.g. `-[{label: 'x'}]->`. The optional integer
/// properties `start` and `end` provide the validity interval.
pub struct GdlGraph(Graph);

impl Deref for GdlGraph {
    type Target = Graph;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for GdlGraph {
    type Err = Error;

    fn from_str(gdl: &str) -> Result<Self, Error> {
        fn time(rel: &gdl::graph::Relationship, key: &str) -> Result<Option<Time>, Error> {
            match rel.property_value(key) {
                None => Ok(None),
                Some(CypherValue::Integer(value)) => Ok(Some(*value)),
                Some(_) => Err(malformed(rel.id(), format!("{} must be an integer", key))),
            }
        }

        fn label(rel: &gdl::graph::Relationship) -> Result<Label, Error> {
            match rel.property_value("label") {
                Some(CypherValue::String(label)) => label
                    .chars()
                    .next()
                    .ok_or_else(|| malformed(rel.id(), "label must not be empty")),
                Some(_) => Err(malformed(rel.id(), "label must be a string")),
                None => rel
                    .rel_type()
                    .and_then(|rel_type| rel_type.chars().next())
                    .map(|first| first.to_ascii_lowercase())
                    .ok_or_else(|| malformed(rel.id(), "label or relationship type expected")),
            }
        }

        let gdl_graph = gdl.parse::<gdl::Graph>()?;

        let mut sorted_rels = gdl_graph.relationships().collect::<Vec<_>>();
        sorted_rels.sort_by_key(|rel| rel.id());

        let mut edges = Vec::with_capacity(sorted_rels.len());

        for rel in sorted_rels {
            let source = gdl_graph
                .get_node(rel.source())
                .ok_or_else(|| malformed(rel.id(), "unknown source"))?
                .id();
            let target = gdl_graph
                .get_node(rel.target())
                .ok_or_else(|| malformed(rel.id(), "unknown target"))?
                .id();
            let label = label(rel)?;
            let interval = match (time(rel, "start")?, time(rel, "end")?) {
                (Some(start), Some(end)) => Interval::new(start, end)
                    .ok_or_else(|| malformed(rel.id(), "interval start after end"))?,
                (None, None) => Interval::ALWAYS,
                _ => return Err(malformed(rel.id(), "start and end must be given together")),
            };
            edges.push(Edge::new(source, target, label, interval));
        }

        Ok(GdlGraph(Graph::new(gdl_graph.node_count(), edges)))
    }
}

impl From<GdlGraph> for Graph {
    fn from(gdl_graph: GdlGraph) -> Self {
        gdl_graph.0
    }
}

pub fn parse(path: &Path) -> Result<Graph, Error> {
    debug!("Reading from: {:?}", path);
    let start = Instant::now();
    let file = File::open(path)?;
    let parse_graph = ParseGraph::try_from(LineReader::new(file))?;
    debug!("Parsing graph: {:?}", start.elapsed());
    let start = Instant::now();
    let graph = Graph::from(parse_graph);
    debug!("Building graph: {:?}", start.elapsed());
    Ok(graph)
}
