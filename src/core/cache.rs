//! Analysis result cache
//!
//! Holds the latest `CodeContextModel` per file name. The cache is unbounded
//! unless a maximum entry count is configured; an unbounded cache grows with
//! every distinct file analyzed until it is cleared.

use lru::LruCache;
use std::num::NonZeroUsize;
use tracing::info;

use super::model::CodeContextModel;

/// Cache of analysis results keyed by file name
pub struct ContextCache {
    entries: LruCache<String, CodeContextModel>,
}

impl ContextCache {
    /// Create a cache; `None` or `Some(0)` means no entry limit
    pub fn new(max_entries: Option<usize>) -> Self {
        let entries = match max_entries.and_then(NonZeroUsize::new) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self { entries }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Store a model under its file name, replacing any previous one
    pub fn insert(&mut self, model: CodeContextModel) {
        let key = model.file_name.clone();
        if let Some((evicted, _)) = self.entries.push(key.clone(), model) {
            if evicted != key {
                info!("Evicted cached analysis for {}", evicted);
            }
        }
    }

    /// Look up a model without touching its recency
    pub fn get(&self, file_name: &str) -> Option<&CodeContextModel> {
        self.entries.peek(file_name)
    }

    /// Remove one entry
    pub fn evict(&mut self, file_name: &str) -> Option<CodeContextModel> {
        self.entries.pop(file_name)
    }

    /// Clear all cache
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached file names, most recently stored first
    pub fn file_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ProgramType;

    fn model(name: &str, program_type: ProgramType) -> CodeContextModel {
        let mut m = CodeContextModel::new(name);
        m.program_type = program_type;
        m
    }

    #[test]
    fn test_last_write_wins() {
        let mut cache = ContextCache::unbounded();
        cache.insert(model("ZA.abap", ProgramType::Program));
        cache.insert(model("ZA.abap", ProgramType::Report));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("ZA.abap").map(|m| m.program_type), Some(ProgramType::Report));
    }

    #[test]
    fn test_evict_and_clear() {
        let mut cache = ContextCache::default();
        cache.insert(model("ZA.abap", ProgramType::Program));
        cache.insert(model("ZB.abap", ProgramType::Program));

        assert!(cache.evict("ZA.abap").is_some());
        assert!(cache.evict("ZA.abap").is_none());
        assert_eq!(cache.file_names(), vec!["ZB.abap"]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_bounded_cache_drops_oldest() {
        let mut cache = ContextCache::new(Some(2));
        cache.insert(model("ZA.abap", ProgramType::Program));
        cache.insert(model("ZB.abap", ProgramType::Program));
        cache.insert(model("ZC.abap", ProgramType::Program));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("ZA.abap").is_none());
        assert!(cache.get("ZC.abap").is_some());
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        let mut cache = ContextCache::new(Some(0));
        for i in 0..50 {
            cache.insert(model(&format!("Z{}.abap", i), ProgramType::Program));
        }
        assert_eq!(cache.len(), 50);
    }
}
