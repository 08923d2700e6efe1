//! # codepane – native render trees for syntax-highlighted code
//!
//! This crate converts the output of an external highlighting engine (a
//! nested element/text token tree plus a CSS-like stylesheet) into a flat or
//! virtualized hierarchy of native text primitives for a mobile UI toolkit
//! that has no HTML/CSS rendering. The pipeline stages are:
//!
//! 1. **Prepare** – append clipping-workaround blank lines ([`pipeline`])
//! 2. **Highlight** – external engine, consumed as a black box ([`engine`])
//! 3. **Normalize** – stylesheet → host-renderable styles ([`style`], cached
//!    per theme via [`cache`])
//! 4. **Render** – token tree → native node list ([`render`], IR in
//!    [`native`])
//!
//! The core is pure and infallible: a broken theme or a malformed tree
//! degrades styling fidelity, never the display of the source text.

pub mod cache;
pub mod engine;
pub mod native;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod tree;

// Re-exports for convenience
pub use cache::{StyleCache, ThemeId};
pub use engine::{HighlightEngine, Highlighted};
pub use native::RenderNode;
pub use pipeline::{prepare_source, render_highlighted, render_source};
pub use render::{RenderConfig, RenderStrategy, TreeRenderer};
pub use style::{normalize, EngineVariant, NormalizedTheme, RawStylesheet};
pub use tree::TokenNode;
