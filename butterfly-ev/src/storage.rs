//! Per-edge integer storage cells
//!
//! Every edge owns `ints_per_edge` consecutive 32-bit words. Encoded values
//! address a word by index within the edge and a bit range within the word.

/// Word-level access to the storage of all edges
pub trait EdgeIntAccess {
    /// Read word `index` of edge `edge_id`; unwritten words read as 0
    fn get_int(&self, edge_id: u32, index: usize) -> u32;

    /// Overwrite word `index` of edge `edge_id`
    fn set_int(&mut self, edge_id: u32, index: usize, value: u32);

    /// Words available to every edge
    fn ints_per_edge(&self) -> usize;
}

/// In-memory edge storage backed by one flat vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayEdgeIntAccess {
    ints_per_edge: usize,
    data: Vec<u32>,
}

impl ArrayEdgeIntAccess {
    pub fn new(ints_per_edge: usize) -> Self {
        Self {
            ints_per_edge,
            data: Vec::new(),
        }
    }

    /// Pre-size for `edges` edges so writes never reallocate
    pub fn with_capacity(ints_per_edge: usize, edges: usize) -> Self {
        Self {
            ints_per_edge,
            data: vec![0; ints_per_edge * edges],
        }
    }

    /// Number of edges with allocated storage
    pub fn edge_count(&self) -> usize {
        if self.ints_per_edge == 0 {
            0
        } else {
            self.data.len() / self.ints_per_edge
        }
    }

    /// Raw words of one edge (zeros if never written)
    pub fn edge_words(&self, edge_id: u32) -> Vec<u32> {
        (0..self.ints_per_edge)
            .map(|i| self.get_int(edge_id, i))
            .collect()
    }

    /// Panics on an index past the edge width; it would land in the next edge
    fn position(&self, edge_id: u32, index: usize) -> usize {
        assert!(
            index < self.ints_per_edge,
            "word index {index} exceeds {} ints per edge",
            self.ints_per_edge
        );
        edge_id as usize * self.ints_per_edge + index
    }
}

impl EdgeIntAccess for ArrayEdgeIntAccess {
    fn get_int(&self, edge_id: u32, index: usize) -> u32 {
        self.data
            .get(self.position(edge_id, index))
            .copied()
            .unwrap_or(0)
    }

    fn set_int(&mut self, edge_id: u32, index: usize, value: u32) {
        let pos = self.position(edge_id, index);
        if pos >= self.data.len() {
            // Grow by whole edges
            let edges = pos / self.ints_per_edge + 1;
            self.data.resize(edges * self.ints_per_edge, 0);
        }
        self.data[pos] = value;
    }

    fn ints_per_edge(&self) -> usize {
        self.ints_per_edge
    }
}

/// Opaque flags derived from relations (route memberships etc.)
///
/// Produced by the relation pre-pass, handed to parsers read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationFlags {
    ints: Vec<u32>,
}

impl RelationFlags {
    pub fn new(len: usize) -> Self {
        Self { ints: vec![0; len] }
    }

    pub fn from_ints(ints: Vec<u32>) -> Self {
        Self { ints }
    }

    pub fn ints(&self) -> &[u32] {
        &self.ints
    }

    pub fn len(&self) -> usize {
        self.ints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_edges_read_zero() {
        let access = ArrayEdgeIntAccess::new(2);
        assert_eq!(access.get_int(0, 0), 0);
        assert_eq!(access.get_int(41, 1), 0);
        assert_eq!(access.edge_count(), 0);
    }

    #[test]
    fn test_set_grows_by_whole_edges() {
        let mut access = ArrayEdgeIntAccess::new(2);
        access.set_int(3, 0, 7);
        assert_eq!(access.edge_count(), 4);
        assert_eq!(access.get_int(3, 0), 7);
        assert_eq!(access.get_int(3, 1), 0);
        assert_eq!(access.edge_words(3), vec![7, 0]);
    }

    #[test]
    fn test_edges_do_not_alias() {
        let mut access = ArrayEdgeIntAccess::with_capacity(1, 2);
        access.set_int(0, 0, u32::MAX);
        assert_eq!(access.get_int(1, 0), 0);
    }

    #[test]
    #[should_panic(expected = "word index 1 exceeds 1 ints per edge")]
    fn test_write_past_edge_width_panics() {
        let mut access = ArrayEdgeIntAccess::with_capacity(1, 2);
        access.set_int(0, 1, 12345);
    }

    #[test]
    #[should_panic(expected = "word index 2 exceeds 2 ints per edge")]
    fn test_read_past_edge_width_panics() {
        let access = ArrayEdgeIntAccess::new(2);
        access.get_int(0, 2);
    }
}
