use std::{
    collections::HashMap,
    fmt::Display,
    ops::{Deref, DerefMut},
};

use delegate::delegate;

use crate::graph::{Domain, EdgeId};

/// A partial injective function from query edges to data edges.
///
/// No two query edges are ever bound to the same data edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    /// data edge for each query edge
    images: Box<[Option<EdgeId>]>,
    /// query edge for each bound data edge
    preimages: HashMap<EdgeId, EdgeId>,
}

impl Mapping {
    /// Creates an empty mapping for a query graph with `query_edge_count` edges.
    pub fn new(query_edge_count: usize) -> Self {
        Mapping {
            images: vec![None; query_edge_count].into_boxed_slice(),
            preimages: HashMap::with_capacity(query_edge_count),
        }
    }

    /// Binds `query` to `data`.
    ///
    /// Returns `false` without changing the mapping if `query` is out of
    /// range or already bound, or `data` is already the image of a query edge.
    pub fn insert(&mut self, query: EdgeId, data: EdgeId) -> bool {
        if self.preimages.contains_key(&data) {
            return false;
        }
        match self.images.get_mut(query) {
            Some(image @ None) => {
                *image = Some(data);
                self.preimages.insert(data, query);
                true
            }
            _ => false,
        }
    }

    /// Unbinds `query` from `data`.
    ///
    /// Returns `false` without changing the mapping if the pair is not bound.
    pub fn remove(&mut self, query: EdgeId, data: EdgeId) -> bool {
        match self.images.get_mut(query) {
            Some(image) if *image == Some(data) => {
                *image = None;
                self.preimages.remove(&data);
                true
            }
            _ => false,
        }
    }

    /// Binds `query` to `data` for the lifetime of the returned guard.
    ///
    /// Dropping the guard removes the pair again, so nested bindings
    /// are undone in reverse order on every exit path.
    pub fn bind(&mut self, query: EdgeId, data: EdgeId) -> Option<Binding<'_>> {
        if self.insert(query, data) {
            Some(Binding {
                mapping: self,
                query,
                data,
            })
        } else {
            None
        }
    }

    pub fn get(&self, query: EdgeId) -> Option<EdgeId> {
        self.images.get(query).copied().flatten()
    }

    /// The query edge bound to `data`, if any.
    pub fn preimage(&self, data: EdgeId) -> Option<EdgeId> {
        self.preimages.get(&data).copied()
    }

    pub fn is_used(&self, data: EdgeId) -> bool {
        self.preimages.contains_key(&data)
    }

    /// Currently bound query edges in ascending order.
    pub fn domain(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.images
            .iter()
            .enumerate()
            .filter_map(|(query, data)| data.map(|_| query))
    }

    pub fn size(&self) -> usize {
        self.preimages.len()
    }

    pub fn query_edge_count(&self) -> usize {
        self.images.len()
    }

    pub fn is_complete(&self) -> bool {
        self.size() == self.images.len()
    }

    /// Snapshot of a complete mapping.
    pub fn to_embedding(&self) -> Option<Embedding> {
        self.images
            .iter()
            .copied()
            .collect::<Option<Vec<_>>>()
            .map(|images| Embedding(images.into_boxed_slice()))
    }
}

impl Domain for Mapping {
    fn contains(&self, edge: EdgeId) -> bool {
        self.images.get(edge).map_or(false, Option::is_some)
    }
}

/// A pair bound in a [`Mapping`] until the guard is dropped.
pub struct Binding<'a> {
    mapping: &'a mut Mapping,
    query: EdgeId,
    data: EdgeId,
}

impl Binding<'_> {
    pub fn pair(&self) -> (EdgeId, EdgeId) {
        (self.query, self.data)
    }
}

impl Deref for Binding<'_> {
    type Target = Mapping;

    fn deref(&self) -> &Self::Target {
        self.mapping
    }
}

impl DerefMut for Binding<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mapping
    }
}

impl Drop for Binding<'_> {
    fn drop(&mut self) {
        let removed = self.mapping.remove(self.query, self.data);
        debug_assert!(removed, "binding was removed out of order");
    }
}

/// A complete mapping: the data edge at index `q` is the image of query edge `q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Embedding(Box<[EdgeId]>);

impl Embedding {
    delegate! {
        to self.0 {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn iter(&self) -> std::slice::Iter<'_, EdgeId>;
        }
    }

    pub fn get(&self, query: EdgeId) -> EdgeId {
        self.0[query]
    }

    pub fn as_slice(&self) -> &[EdgeId] {
        &self.0
    }
}

impl From<Vec<EdgeId>> for Embedding {
    fn from(images: Vec<EdgeId>) -> Self {
        Embedding(images.into_boxed_slice())
    }
}

impl Display for Embedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self
            .0
            .iter()
            .enumerate()
            .map(|(query, data)| format!("{} -> {}", query, data))
            .collect::<Vec<_>>();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_conflicts() {
        let mut mapping = Mapping::new(3);

        assert!(mapping.insert(0, 7));
        // query edge already bound
        assert!(!mapping.insert(0, 8));
        // data edge already used
        assert!(!mapping.insert(1, 7));

        assert_eq!(mapping.size(), 1);
        assert_eq!(mapping.get(0), Some(7));
        assert_eq!(mapping.get(1), None);
        assert_eq!(mapping.preimage(7), Some(0));
    }

    #[test]
    fn test_insert_remove_restores_state() {
        let mut mapping = Mapping::new(3);
        assert!(mapping.insert(2, 4));
        let before = mapping.clone();

        assert!(mapping.insert(0, 5));
        assert!(mapping.remove(0, 5));

        assert_eq!(mapping, before);
        assert_eq!(mapping.domain().collect::<Vec<_>>(), vec![2]);
        assert_eq!(mapping.size(), 1);
        assert!(!mapping.is_used(5));
    }

    #[test]
    fn test_remove_unbound_pair() {
        let mut mapping = Mapping::new(2);
        assert!(mapping.insert(0, 1));
        assert!(!mapping.remove(0, 2));
        assert!(!mapping.remove(1, 1));
        assert_eq!(mapping.get(0), Some(1));
    }

    #[test]
    fn test_query_edge_out_of_range() {
        let mut mapping = Mapping::new(2);

        assert!(!mapping.insert(2, 0));
        assert!(!mapping.remove(5, 0));
        assert_eq!(mapping.get(2), None);
        assert!(mapping.bind(3, 1).is_none());
        assert_eq!(mapping.size(), 0);
        assert!(!mapping.is_used(0));
    }

    #[test]
    fn test_binding_undoes_on_drop() {
        let mut mapping = Mapping::new(2);
        {
            let mut outer = mapping.bind(0, 3).unwrap();
            assert_eq!(outer.size(), 1);
            {
                let inner = outer.bind(1, 4).unwrap();
                assert!(inner.is_complete());
                assert_eq!(inner.pair(), (1, 4));
            }
            assert_eq!(outer.size(), 1);
            assert!(outer.bind(1, 3).is_none());
        }
        assert_eq!(mapping.size(), 0);
        assert_eq!(mapping.domain().count(), 0);
    }

    #[test]
    fn test_to_embedding() {
        let mut mapping = Mapping::new(2);
        assert!(mapping.insert(1, 9));
        assert_eq!(mapping.to_embedding(), None);
        assert!(mapping.insert(0, 3));

        let embedding = mapping.to_embedding().unwrap();
        assert_eq!(embedding.as_slice(), &[3, 9]);
        assert_eq!(embedding.get(1), 9);
        assert_eq!(embedding.to_string(), "{0 -> 3, 1 -> 9}");
    }
}
