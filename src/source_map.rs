//! Mapping between ROM addresses and source locations.

use std::collections::HashMap;

/// Mapping from ROM addresses into source locations. The assembler records the 1-based
/// line of every emitted instruction, so the most common type for `V` is `usize`.
#[derive(Debug, Clone)]
pub struct SourceMap<V> {
    inner: HashMap<u16, V>,
}

impl<V> Default for SourceMap<V> {
    fn default() -> SourceMap<V> {
        SourceMap {
            inner: HashMap::new(),
        }
    }
}

impl<V> SourceMap<V> {
    pub fn insert(&mut self, address: u16, location: V) {
        self.inner.insert(address, location);
    }

    /// Returns the location in the source which produced the instruction at `address`.
    pub fn get_source_location(&self, address: u16) -> Option<&V> {
        self.inner.get(&address)
    }
}
