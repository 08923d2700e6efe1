//! Native render IR – the intermediate representation between the tree walk
//! and the host UI. This is the "frozen" structure that encodes exactly what
//! the host composes on screen: containers, styled text spans, text leaves,
//! and line-number badges.
//!
//! Every node serializes deterministically (style keys are ordered), so
//! rendering the same input twice yields byte-identical JSON.

use serde::{Deserialize, Serialize};

use crate::style::Style;

/// A native-renderable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Scroll(ScrollContainer),
    List(VirtualizedList),
    Row(RowContainer),
    Span(TextSpan),
    Leaf(TextLeaf),
    Badge(LineBadge),
}

/// Eager scroll container holding the full document. Pays the whole layout
/// cost up front; long lines overflow horizontally inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollContainer {
    pub style: Style,
    /// Ordered layers applied to the content area; later layers win.
    pub content_container_style: Vec<Style>,
    pub scroll_enabled: bool,
    /// Long lines may extend past the viewport and scroll horizontally.
    pub horizontal_overflow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    pub children: Vec<RenderNode>,
}

/// Virtualized list materializing only visible rows. Each item is one
/// [`RowContainer`] per top-level tree entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualizedList {
    pub style: Style,
    pub content_container_style: Vec<Style>,
    pub scroll_enabled: bool,
    pub window_size: u32,
    pub initial_num_to_render: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    pub items: Vec<RenderNode>,
}

/// Fixed-height row wrapper used by the virtualized strategy: an optional
/// leading gutter cell followed by the row's text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowContainer {
    pub style: Style,
    pub children: Vec<RenderNode>,
}

/// A styled text container wrapping nested spans and leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Ordered style layers; later entries win on conflicting keys.
    pub styles: Vec<Style>,
    /// When set, the host clips the span to this many lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_lines: Option<u32>,
    pub children: Vec<RenderNode>,
}

/// A text leaf carrying the rendered value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub value: String,
}

/// The line-number badge decorating the first element of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineBadge {
    /// 1-based source line number.
    pub line: usize,
    /// Style of the gutter cell (width, background).
    pub container_style: Style,
    /// Style of the number text itself.
    pub text_style: Style,
}

impl RenderNode {
    pub fn leaf(value: impl Into<String>) -> Self {
        RenderNode::Leaf(TextLeaf {
            value: value.into(),
        })
    }

    /// Direct children, if this node has any.
    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Scroll(s) => &s.children,
            RenderNode::List(l) => &l.items,
            RenderNode::Row(r) => &r.children,
            RenderNode::Span(s) => &s.children,
            RenderNode::Leaf(_) | RenderNode::Badge(_) => &[],
        }
    }

    /// Concatenated text content of the subtree, gutter badges excluded.
    /// Both container strategies must agree on this for the same input.
    pub fn text_content(&self) -> String {
        match self {
            RenderNode::Leaf(l) => l.value.clone(),
            RenderNode::Badge(_) => String::new(),
            other => other
                .children()
                .iter()
                .map(RenderNode::text_content)
                .collect(),
        }
    }
}

/// Serialize a node list to pretty JSON (the CLI's output format).
pub fn to_json(nodes: &[RenderNode]) -> String {
    serde_json::to_string_pretty(nodes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_skips_badges() {
        let row = RenderNode::Span(TextSpan {
            styles: Vec::new(),
            number_of_lines: None,
            children: vec![
                RenderNode::Badge(LineBadge {
                    line: 1,
                    container_style: Style::new(),
                    text_style: Style::new(),
                }),
                RenderNode::leaf("let "),
                RenderNode::leaf("x"),
            ],
        });
        assert_eq!(row.text_content(), "let x");
    }

    #[test]
    fn serialization_round_trips() {
        let node = RenderNode::Span(TextSpan {
            styles: vec![{
                let mut s = Style::new();
                s.set_str("color", "#abb2bf");
                s
            }],
            number_of_lines: Some(1),
            children: vec![RenderNode::leaf("fn")],
        });
        let json = serde_json::to_string(&node).unwrap();
        let back: RenderNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
