use std::collections::HashMap;

use primitive_types::U256;

use super::key::MetadataQueryKey;
use super::state::{MetadataResult, ResolutionState};

/// Memoized successful resolutions of one resolver.
///
/// Entries are never revalidated nor evicted; `clear` is the only way to
/// drop them.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<MetadataQueryKey, MetadataResult>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MetadataQueryKey) -> Option<&MetadataResult> {
        self.entries.get(key)
    }

    /// Stores `result` if it is a success. Returns whether it was stored.
    pub fn insert(&mut self, key: MetadataQueryKey, result: MetadataResult) -> bool {
        if result.state != ResolutionState::Success {
            return false;
        }
        self.entries.insert(key, result);
        true
    }

    pub fn contains(&self, uri_template: &str, token_id: U256) -> bool {
        self.entries
            .contains_key(&MetadataQueryKey::new(uri_template, token_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
