//! Tree renderer – walks the token tree and emits the native render nodes.
//!
//! Each top-level tree entry is one row (one physical source line). The walk
//! composes nested styled text spans down to text leaves, optionally
//! decorates the first element of a row with a 1-based line-number badge,
//! and materializes the rows under one of two container strategies:
//!
//! - [`RenderStrategy::Scrollable`] – every row eagerly inside one scroll
//!   container; long lines overflow horizontally.
//! - [`RenderStrategy::Virtualized`] – one fixed-height list item per row;
//!   each row is clipped to a single line so item heights stay stable.
//!
//! Both strategies produce visually identical content for the same input;
//! the choice is a performance/memory trade-off, not a behavioral one.
//!
//! The renderer never fails: an element without a tag renders nothing, a
//! class missing from the theme contributes no style.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::native::{
    LineBadge, RenderNode, RowContainer, ScrollContainer, TextLeaf, TextSpan, VirtualizedList,
};
use crate::style::{NormalizedTheme, Style};
use crate::tree::{ElementNode, TokenNode};

/// Gutter width is `GUTTER_WIDTH_FACTOR * font_size` minus this inset.
const GUTTER_INSET: f64 = 5.0;
const GUTTER_WIDTH_FACTOR: f64 = 1.75;
/// Line numbers use a smaller derived font size.
const GUTTER_FONT_FACTOR: f64 = 0.7;
/// Horizontal padding inside the gutter text while the document is short.
const GUTTER_TEXT_PADDING: f64 = 5.0;
/// From this many displayed rows on, the gutter padding drops to zero so the
/// 3-digit numbers do not grow the gutter unbounded.
const GUTTER_COMPACT_THRESHOLD: usize = 100;

/// Top padding of the content area inside either container.
const CONTENT_TOP_PADDING: f64 = 6.5;

/// Virtualized list tuning.
const VIRTUALIZED_WINDOW_SIZE: u32 = 40;
const VIRTUALIZED_INITIAL_ROWS: u32 = 30;
const VIRTUALIZED_ROW_LEFT_PADDING: f64 = 5.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Container materialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStrategy {
    /// Full forest rendered eagerly inside a scrollable container. Simplest;
    /// pays the whole layout cost up front. Used for small-to-medium
    /// documents.
    #[default]
    Scrollable,
    /// One top-level row per virtualized list item; only visible rows are
    /// materialized. Used for large documents.
    Virtualized,
}

impl RenderStrategy {
    /// Blank lines appended to the source before tokenization so the final
    /// visible line is not clipped by the host's scroll/measurement
    /// rounding. Excluded from the line-number count.
    pub fn trailing_blank_rows(&self) -> usize {
        match self {
            RenderStrategy::Scrollable => 2,
            RenderStrategy::Virtualized => 1,
        }
    }
}

/// Platform default monospace font.
pub fn default_font_family() -> &'static str {
    if cfg!(target_os = "ios") {
        "Menlo-Regular"
    } else {
        "monospace"
    }
}

/// Every recognized rendering option, as an explicit struct. Unrecognized
/// options are a caller-side type error, not a runtime pass-through.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub font_family: String,
    pub font_size: f64,
    pub show_line_numbers: bool,
    pub line_number_color: String,
    pub line_number_background: Option<String>,
    /// Overrides the theme's top-level background.
    pub background_color: Option<String>,
    pub padding: f64,
    pub scroll_enabled: bool,
    /// Overrides the theme's derived default text color.
    pub highlighter_color: Option<String>,
    /// Line-height alignment hook for pairing with an overlaid text input.
    pub highlighter_line_height: Option<f64>,
    /// Row height used by the virtualized strategy, for the same pairing.
    pub input_line_height: Option<f64>,
    pub strategy: RenderStrategy,
    /// Test/automation identifier forwarded to the container (with a
    /// `-scroll-view` suffix).
    pub test_id: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family().to_string(),
            font_size: 16.0,
            show_line_numbers: false,
            line_number_color: "rgba(127, 127, 127, 0.9)".to_string(),
            line_number_background: None,
            background_color: None,
            padding: 16.0,
            scroll_enabled: true,
            highlighter_color: None,
            highlighter_line_height: None,
            input_line_height: None,
            strategy: RenderStrategy::default(),
            test_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Memo key for one rendered row: content hash + node kind + child count
/// (plus the gutter inputs that feed into the row's output).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    hash: u64,
    is_text: bool,
    child_count: usize,
    line: Option<usize>,
    compact_gutter: bool,
}

struct MemoEntry {
    node: TokenNode,
    rendered: RenderNode,
}

/// Walks token trees into native render nodes. Holds a per-theme row memo so
/// repeated renders of an unchanged row reuse the previous result; the memo
/// is a recompute-avoidance optimization only and never changes output.
pub struct TreeRenderer {
    config: RenderConfig,
    memo: HashMap<RowKey, MemoEntry>,
    memo_theme: Option<Arc<NormalizedTheme>>,
}

impl TreeRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            memo: HashMap::new(),
            memo_theme: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render the token forest under the configured strategy. Returns a
    /// single container node holding every row.
    ///
    /// `rows` must come from source prepared with
    /// [`prepare_source`](crate::pipeline::prepare_source) (or otherwise end
    /// in the strategy's trailing blank rows): the last
    /// `trailing_blank_rows()` entries are treated as the clipping
    /// workaround and are excluded from the line-number count.
    pub fn render(&mut self, rows: &[TokenNode], theme: &Arc<NormalizedTheme>) -> Vec<RenderNode> {
        // Rows cached against a different theme are stale.
        if !self
            .memo_theme
            .as_ref()
            .is_some_and(|t| Arc::ptr_eq(t, theme))
        {
            self.memo.clear();
            self.memo_theme = Some(Arc::clone(theme));
        }

        let displayed = rows
            .len()
            .saturating_sub(self.config.strategy.trailing_blank_rows());
        let compact = displayed >= GUTTER_COMPACT_THRESHOLD;

        let rendered_rows: Vec<RenderNode> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let line = (self.config.show_line_numbers && i < displayed).then_some(i + 1);
                self.render_row(node, line, compact, theme)
            })
            .collect();

        vec![self.wrap_rows(rendered_rows, theme)]
    }

    // -- rows ---------------------------------------------------------------

    fn render_row(
        &mut self,
        node: &TokenNode,
        line: Option<usize>,
        compact: bool,
        theme: &NormalizedTheme,
    ) -> Option<RenderNode> {
        let key = self.row_key(node, line, compact);
        if let Some(entry) = self.memo.get(&key) {
            if entry.node == *node {
                return Some(entry.rendered.clone());
            }
        }

        let rendered = match self.config.strategy {
            RenderStrategy::Scrollable => {
                let mut row = self.render_node(node, theme)?;
                if let (Some(line), RenderNode::Span(span)) = (line, &mut row) {
                    span.children
                        .insert(0, RenderNode::Badge(self.line_badge(line, compact)));
                }
                row
            }
            RenderStrategy::Virtualized => {
                let mut row = self.render_node(node, theme)?;
                if let RenderNode::Span(span) = &mut row {
                    // Fixed-height items: clip instead of wrapping.
                    span.number_of_lines = Some(1);
                }
                let mut children = Vec::with_capacity(2);
                if let Some(line) = line {
                    children.push(RenderNode::Badge(self.line_badge(line, compact)));
                }
                children.push(row);
                RenderNode::Row(RowContainer {
                    style: self.virtualized_row_style(),
                    children,
                })
            }
        };

        self.memo.insert(
            key,
            MemoEntry {
                node: node.clone(),
                rendered: rendered.clone(),
            },
        );
        Some(rendered)
    }

    fn row_key(&self, node: &TokenNode, line: Option<usize>, compact: bool) -> RowKey {
        let mut hasher = DefaultHasher::new();
        node.hash(&mut hasher);
        RowKey {
            hash: hasher.finish(),
            is_text: node.is_text(),
            child_count: node.child_count(),
            line,
            compact_gutter: compact,
        }
    }

    // -- nodes --------------------------------------------------------------

    /// Recursive descent over one subtree. A tag-less element renders
    /// nothing.
    fn render_node(&self, node: &TokenNode, theme: &NormalizedTheme) -> Option<RenderNode> {
        match node {
            TokenNode::Text(t) => {
                // The forest already encodes line breaks structurally; an
                // embedded literal newline would render a visible blank.
                let value = t.value.replacen('\n', "", 1);
                Some(RenderNode::Leaf(TextLeaf {
                    // An empty value collapses to zero height and breaks row
                    // spacing; reserve one space instead.
                    value: if value.is_empty() {
                        " ".to_string()
                    } else {
                        value
                    },
                }))
            }
            TokenNode::Element(e) => {
                e.tag_name.as_ref()?;
                let children = e
                    .children
                    .iter()
                    .filter_map(|c| self.render_node(c, theme))
                    .collect();
                Some(RenderNode::Span(TextSpan {
                    styles: self.span_styles(e, theme),
                    number_of_lines: None,
                    children,
                }))
            }
        }
    }

    /// Ordered style layers for an element span; later layers win:
    /// default color, then each class in node order, then font settings.
    fn span_styles(&self, element: &ElementNode, theme: &NormalizedTheme) -> Vec<Style> {
        let mut layers = Vec::with_capacity(element.class_names.len() + 2);

        let mut color = Style::new();
        color.set_str(
            "color",
            self.config
                .highlighter_color
                .as_deref()
                .unwrap_or(&theme.default_color),
        );
        layers.push(color);

        for class in &element.class_names {
            if let Some(style) = theme.class_style(class) {
                layers.push(style.clone());
            }
        }

        let mut font = Style::new();
        font.set_str("fontFamily", &self.config.font_family)
            .set_num("fontSize", self.config.font_size)
            .set_num("margin", 0.0)
            .set_str("alignSelf", "flex-start");
        if let Some(lh) = self.config.highlighter_line_height {
            font.set_num("lineHeight", lh).set_num("height", lh);
        }
        layers.push(font);

        layers
    }

    // -- gutter -------------------------------------------------------------

    fn line_badge(&self, line: usize, compact: bool) -> LineBadge {
        let fs = self.config.font_size;

        let mut container_style = Style::new();
        container_style.set_num("width", GUTTER_WIDTH_FACTOR * fs - GUTTER_INSET);
        if let Some(bg) = &self.config.line_number_background {
            container_style.set_str("backgroundColor", bg);
        }

        let mut text_style = Style::new();
        text_style
            .set_num(
                "paddingHorizontal",
                if compact { 0.0 } else { GUTTER_TEXT_PADDING },
            )
            .set_str("textAlign", "center")
            .set_str("color", &self.config.line_number_color)
            .set_str("fontFamily", &self.config.font_family)
            .set_num("fontSize", GUTTER_FONT_FACTOR * fs);

        LineBadge {
            line,
            container_style,
            text_style,
        }
    }

    // -- containers ---------------------------------------------------------

    fn container_style(&self, theme: &NormalizedTheme) -> Style {
        let mut style = Style::new();
        style.set_str("width", "100%").set_str("height", "100%");
        let background = self.config.background_color.clone().or_else(|| {
            theme
                .block_style()
                .and_then(|s| s.get("backgroundColor"))
                .and_then(|v| v.as_str().map(str::to_string))
        });
        if let Some(bg) = background {
            style.set_str("backgroundColor", bg);
        }
        style
    }

    fn content_container_style(&self, theme: &NormalizedTheme) -> Vec<Style> {
        let mut overrides = Style::new();
        overrides
            .set_num("padding", 0.0)
            .set_num("paddingTop", CONTENT_TOP_PADDING)
            .set_num("paddingBottom", self.config.padding);
        vec![theme.block_style().cloned().unwrap_or_default(), overrides]
    }

    fn virtualized_row_style(&self) -> Style {
        let mut style = Style::new();
        style
            .set_num("margin", 0.0)
            .set_num("paddingLeft", VIRTUALIZED_ROW_LEFT_PADDING)
            .set_str("flexDirection", "row");
        if let Some(h) = self.config.input_line_height {
            style.set_num("height", h);
        }
        style
    }

    fn wrap_rows(&self, rows: Vec<RenderNode>, theme: &NormalizedTheme) -> RenderNode {
        let test_id = self
            .config
            .test_id
            .as_ref()
            .map(|t| format!("{t}-scroll-view"));
        match self.config.strategy {
            RenderStrategy::Scrollable => RenderNode::Scroll(ScrollContainer {
                style: self.container_style(theme),
                content_container_style: self.content_container_style(theme),
                scroll_enabled: self.config.scroll_enabled,
                horizontal_overflow: true,
                test_id,
                children: rows,
            }),
            RenderStrategy::Virtualized => {
                let mut style = self.container_style(theme);
                style.set_num("margin", 0.0).set_num("padding", 0.0);
                RenderNode::List(VirtualizedList {
                    style,
                    content_container_style: self.content_container_style(theme),
                    scroll_enabled: self.config.scroll_enabled,
                    window_size: VIRTUALIZED_WINDOW_SIZE,
                    initial_num_to_render: VIRTUALIZED_INITIAL_ROWS,
                    test_id,
                    items: rows,
                })
            }
        }
    }
}
