//! Pipeline – ties source preparation, the engine call, stylesheet
//! normalization, and the tree walk into single entry points.

use std::sync::Arc;

use crate::cache::{normalize_cached, StyleCache, ThemeId};
use crate::engine::{HighlightEngine, Highlighted};
use crate::native::RenderNode;
use crate::render::{RenderConfig, RenderStrategy, TreeRenderer};
use crate::style::NormalizedTheme;

/// Append the strategy's trailing blank lines to the source before
/// tokenization. The host's scroll/measurement rounding clips the final
/// visible line otherwise; the extra rows carry no line number and no
/// visible content.
pub fn prepare_source(source: &str, strategy: RenderStrategy) -> String {
    let mut prepared = String::with_capacity(source.len() + 2);
    prepared.push_str(source);
    for _ in 0..strategy.trailing_blank_rows() {
        prepared.push('\n');
    }
    prepared
}

/// Render an already-highlighted document. The theme is normalized through
/// `cache` under `theme_id`, so repeated renders with a stable id reuse the
/// normalized stylesheet.
pub fn render_highlighted(
    doc: &Highlighted,
    config: &RenderConfig,
    theme_id: &ThemeId,
    cache: &mut StyleCache,
) -> Vec<RenderNode> {
    let theme = normalize_cached(cache, theme_id, &doc.stylesheet, doc.variant);
    render_with_theme(doc, config, &theme)
}

/// Render an already-highlighted document against a pre-normalized theme.
pub fn render_with_theme(
    doc: &Highlighted,
    config: &RenderConfig,
    theme: &Arc<NormalizedTheme>,
) -> Vec<RenderNode> {
    TreeRenderer::new(config.clone()).render(&doc.rows, theme)
}

/// Full pipeline: source text → engine → normalized theme → render nodes.
pub fn render_source(
    engine: &dyn HighlightEngine,
    source: &str,
    language: &str,
    config: &RenderConfig,
    theme_id: &ThemeId,
    cache: &mut StyleCache,
) -> Result<Vec<RenderNode>, String> {
    let prepared = prepare_source(source, config.strategy);
    let doc = engine.highlight(&prepared, language)?;
    Ok(render_highlighted(&doc, config, theme_id, cache))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{EngineVariant, RawProps, RawStylesheet, RawValue};
    use crate::tree::TokenNode;
    use std::collections::BTreeMap;

    /// Splits the prepared source into one row per line, no token classes.
    /// Stands in for the external engine in tests.
    struct PlainEngine;

    impl HighlightEngine for PlainEngine {
        fn highlight(&self, source: &str, _language: &str) -> Result<Highlighted, String> {
            let rows = source
                .split('\n')
                .map(|l| TokenNode::span(&[], vec![TokenNode::text(l)]))
                .collect();
            let mut map = BTreeMap::new();
            let mut props = RawProps::new();
            props.insert("color".to_string(), RawValue::Str("#333".to_string()));
            map.insert("hljs".to_string(), props);
            Ok(Highlighted {
                rows,
                stylesheet: RawStylesheet(map),
                variant: EngineVariant::HighlightJs,
            })
        }
    }

    #[test]
    fn prepare_appends_per_strategy() {
        assert_eq!(prepare_source("x", RenderStrategy::Scrollable), "x\n\n");
        assert_eq!(prepare_source("x", RenderStrategy::Virtualized), "x\n");
    }

    #[test]
    fn full_pipeline_numbers_only_real_lines() {
        let config = RenderConfig {
            show_line_numbers: true,
            ..RenderConfig::default()
        };
        let mut cache = StyleCache::new();
        let out = render_source(
            &PlainEngine,
            "let a = 1;\nlet b = 2;",
            "rust",
            &config,
            &ThemeId::from("plain"),
            &mut cache,
        )
        .unwrap();
        assert_eq!(out.len(), 1);

        fn count_badges(node: &RenderNode) -> usize {
            let own = matches!(node, RenderNode::Badge(_)) as usize;
            own + node.children().iter().map(count_badges).sum::<usize>()
        }
        // Two source lines numbered; the appended trailing blanks are not.
        assert_eq!(count_badges(&out[0]), 2);
    }

    #[test]
    fn pipeline_reuses_cached_theme() {
        let mut cache = StyleCache::new();
        let id = ThemeId::from("plain");
        let config = RenderConfig::default();
        let _ = render_source(&PlainEngine, "a", "rust", &config, &id, &mut cache).unwrap();
        let _ = render_source(&PlainEngine, "b", "rust", &config, &id, &mut cache).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
