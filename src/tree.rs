//! Token tree – the nested element/text structure emitted by the external
//! highlighting engine.
//!
//! The engine hands us an ordered forest of nodes shaped like
//! `{type, tagName, properties: {className: []}, children, value}`. One
//! top-level node conventionally corresponds to one physical source line.
//! The tree is treated as immutable input: it is owned by the render call and
//! no node outlives one render pass.

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Tree types
// ---------------------------------------------------------------------------

/// A node in the token tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenNode {
    Element(ElementNode),
    Text(TextNode),
}

/// An element node carrying a tag, its class names, and children.
///
/// `tag_name` is `None` when the engine emitted an element without a tag;
/// such nodes render nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementNode {
    pub tag_name: Option<String>,
    /// Class names in document order. Order is style precedence: later
    /// classes override earlier ones when the style layers are flattened.
    pub class_names: Vec<String>,
    pub children: Vec<TokenNode>,
}

/// A text leaf. Never has children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextNode {
    pub value: String,
}

impl TokenNode {
    /// Convenience constructor for a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        TokenNode::Text(TextNode {
            value: value.into(),
        })
    }

    /// Convenience constructor for a `<span>` element.
    pub fn span(class_names: &[&str], children: Vec<TokenNode>) -> Self {
        TokenNode::Element(ElementNode {
            tag_name: Some("span".to_string()),
            class_names: class_names.iter().map(|c| c.to_string()).collect(),
            children,
        })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, TokenNode::Text(_))
    }

    /// Number of direct children (0 for text leaves).
    pub fn child_count(&self) -> usize {
        match self {
            TokenNode::Element(e) => e.children.len(),
            TokenNode::Text(_) => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

// The engine's JSON is loosely typed: `value` may be a string or a number,
// `className` is declared `any[]` upstream, and every field except `type` is
// optional. Deserialization absorbs all of that into the strict tree above.

#[derive(Deserialize)]
struct WireNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(rename = "tagName", default)]
    tag_name: Option<String>,
    #[serde(default)]
    properties: Option<WireProperties>,
    #[serde(default)]
    children: Option<Vec<WireNode>>,
}

#[derive(Deserialize, Default)]
struct WireProperties {
    #[serde(rename = "className", default)]
    class_name: Vec<serde_json::Value>,
}

impl WireNode {
    fn into_node<E: DeError>(self) -> Result<TokenNode, E> {
        match self.kind.as_str() {
            "text" => Ok(TokenNode::Text(TextNode {
                value: match self.value {
                    Some(serde_json::Value::String(s)) => s,
                    Some(serde_json::Value::Number(n)) => n.to_string(),
                    _ => String::new(),
                },
            })),
            "element" => {
                let props = self.properties.unwrap_or_default();
                let class_names = props
                    .class_name
                    .into_iter()
                    .filter_map(|v| match v {
                        serde_json::Value::String(s) => Some(s),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                let children = self
                    .children
                    .unwrap_or_default()
                    .into_iter()
                    .map(WireNode::into_node)
                    .collect::<Result<Vec<_>, E>>()?;
                Ok(TokenNode::Element(ElementNode {
                    tag_name: self.tag_name,
                    class_names,
                    children,
                }))
            }
            other => Err(E::custom(format!("unknown node type '{other}'"))),
        }
    }
}

impl<'de> Deserialize<'de> for TokenNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WireNode::deserialize(deserializer)?.into_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_element_with_classes() {
        let json = r#"{
            "type": "element",
            "tagName": "span",
            "properties": {"className": ["hljs-keyword"]},
            "children": [{"type": "text", "value": "fn"}]
        }"#;
        let node: TokenNode = serde_json::from_str(json).unwrap();
        if let TokenNode::Element(e) = &node {
            assert_eq!(e.tag_name.as_deref(), Some("span"));
            assert_eq!(e.class_names, vec!["hljs-keyword"]);
            assert_eq!(e.children, vec![TokenNode::text("fn")]);
        } else {
            panic!("Expected element");
        }
    }

    #[test]
    fn deserialize_tolerates_missing_fields() {
        let json = r#"{"type": "element"}"#;
        let node: TokenNode = serde_json::from_str(json).unwrap();
        if let TokenNode::Element(e) = &node {
            assert!(e.tag_name.is_none());
            assert!(e.class_names.is_empty());
            assert!(e.children.is_empty());
        } else {
            panic!("Expected element");
        }
    }

    #[test]
    fn deserialize_numeric_text_value() {
        let json = r#"{"type": "text", "value": 42}"#;
        let node: TokenNode = serde_json::from_str(json).unwrap();
        assert_eq!(node, TokenNode::text("42"));
    }

    #[test]
    fn deserialize_skips_non_string_classes() {
        let json = r#"{
            "type": "element",
            "tagName": "span",
            "properties": {"className": ["hljs-string", null, {"x": 1}]}
        }"#;
        let node: TokenNode = serde_json::from_str(json).unwrap();
        if let TokenNode::Element(e) = &node {
            assert_eq!(e.class_names, vec!["hljs-string"]);
        } else {
            panic!("Expected element");
        }
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let json = r#"{"type": "comment", "value": "hi"}"#;
        assert!(serde_json::from_str::<TokenNode>(json).is_err());
    }
}
