//! Theme cache – memoizes normalized stylesheets per theme.
//!
//! Themes are reused across renders, so normalization runs once per theme.
//! The cache is keyed by an explicit, caller-controlled [`ThemeId`] rather
//! than by incidental object identity; callers that want cache hits pass the
//! same id for the same theme. Entries are never evicted: the number of
//! distinct themes in one process is small and bounded by user choice.
//!
//! Recomputing a key is idempotent, so an embedder sharing the cache across
//! threads can wrap it in a mutex; a race at worst duplicates work.

use std::collections::HashMap;
use std::sync::Arc;

use crate::style::{normalize, EngineVariant, NormalizedTheme, RawStylesheet};

/// Opaque handle identifying one theme. Stable across renders by contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThemeId(String);

impl ThemeId {
    pub fn new(id: impl Into<String>) -> Self {
        ThemeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThemeId {
    fn from(s: &str) -> Self {
        ThemeId(s.to_string())
    }
}

/// Cache of normalized themes. Values are shared pointers so a hit returns
/// the identical object every time.
#[derive(Debug, Default)]
pub struct StyleCache {
    entries: HashMap<ThemeId, Arc<NormalizedTheme>>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ThemeId) -> Option<Arc<NormalizedTheme>> {
        self.entries.get(id).cloned()
    }

    pub fn put(&mut self, id: ThemeId, theme: NormalizedTheme) -> Arc<NormalizedTheme> {
        let theme = Arc::new(theme);
        self.entries.insert(id, Arc::clone(&theme));
        theme
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize through the cache: returns the cached theme on a hit, computes
/// and stores it on a miss.
pub fn normalize_cached(
    cache: &mut StyleCache,
    id: &ThemeId,
    raw: &RawStylesheet,
    variant: EngineVariant,
) -> Arc<NormalizedTheme> {
    if let Some(hit) = cache.get(id) {
        return hit;
    }
    log::debug!("normalizing theme '{}'", id.as_str());
    cache.put(id.clone(), normalize(raw, variant))
}
