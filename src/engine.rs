//! Highlighting-engine seam.
//!
//! Tokenization, grammar definitions, and language detection live in an
//! external engine and are consumed as a black box: given source text and a
//! language hint, the engine returns an ordered forest of token nodes plus a
//! raw stylesheet. [`Highlighted`] is that bundle; [`HighlightEngine`] is the
//! trait an embedder implements to plug its engine in.
//!
//! For offline work (the CLI, fixtures, tests) the bundle can be loaded from
//! a JSON dump of the engine's output.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::style::{EngineVariant, RawStylesheet};
use crate::tree::TokenNode;

/// One engine invocation's output: the token forest and the theme stylesheet
/// that styles it. Deterministic for identical inputs by engine contract.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Highlighted {
    pub rows: Vec<TokenNode>,
    pub stylesheet: RawStylesheet,
    #[serde(default)]
    pub variant: EngineVariant,
}

impl Highlighted {
    /// Load an engine dump from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Load an engine dump from a file.
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("reading '{}': {e}", path.display()))?;
        Self::from_json(&json)
    }
}

/// The upstream tokenizer. Implementations must be deterministic for
/// identical `(source, language)` inputs; the language hint is a free-form
/// string (e.g. "rust").
pub trait HighlightEngine {
    fn highlight(&self, source: &str, language: &str) -> Result<Highlighted, String>;
}
