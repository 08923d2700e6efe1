//! Stylesheet normalizer – converts an engine-supplied CSS-like stylesheet
//! (class name → property map) into the flat, host-renderable form consumed
//! by the tree renderer.
//!
//! The host toolkit has no `em` units, no `display` model, and no
//! `overflow: auto`; inherited text properties must be applied per leaf, not
//! per container. Normalization rewrites or strips all of that, and derives
//! the default text color from the theme's top-level wrapper entry.
//!
//! Normalization never fails: malformed values pass through unchanged and a
//! broken theme degrades styling, never the display of the source text.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Base font size used to resolve relative (`em`) units, in px.
pub const BASE_FONT_PX: f64 = 16.0;

/// Fallback text color when the theme's top-level entry carries none.
pub const DEFAULT_TEXT_COLOR: &str = "#000";

/// Inherited text properties stripped from the top-level wrapper entries.
/// The host applies these per text leaf, not per container.
pub const INHERITED_TEXT_PROPERTIES: [&str; 16] = [
    "color",
    "textShadow",
    "textAlign",
    "whiteSpace",
    "wordSpacing",
    "wordBreak",
    "wordWrap",
    "lineHeight",
    "MozTabSize",
    "OTabSize",
    "tabSize",
    "WebkitHyphens",
    "MozHyphens",
    "msHyphens",
    "hyphens",
    "fontFamily",
];

// ---------------------------------------------------------------------------
// Engine variants
// ---------------------------------------------------------------------------

/// Which highlighting engine produced the stylesheet. The two variants use
/// different class names for the top-level block wrapper, and only one of
/// them exposes a secondary code-level wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineVariant {
    #[default]
    #[serde(rename = "highlightjs")]
    HighlightJs,
    #[serde(rename = "prism")]
    Prism,
}

impl EngineVariant {
    /// Class name of the wrapper entry for the whole block.
    pub fn block_class(&self) -> &'static str {
        match self {
            EngineVariant::HighlightJs => "hljs",
            EngineVariant::Prism => r#"pre[class*="language-"]"#,
        }
    }

    /// Class name of the secondary code-level wrapper, when the variant has
    /// one.
    pub fn code_class(&self) -> Option<&'static str> {
        match self {
            EngineVariant::HighlightJs => None,
            EngineVariant::Prism => Some(r#"code[class*="language-"]"#),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw stylesheet (engine side)
// ---------------------------------------------------------------------------

/// A raw CSS-like property value as supplied by the engine.
///
/// `Other` holds anything that is neither a string nor a number; such values
/// are passed through unchanged rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Num(f64),
    Str(String),
    Other(serde_json::Value),
}

/// One class entry: CSS-like property name → value.
pub type RawProps = BTreeMap<String, RawValue>;

/// An engine-supplied stylesheet: class name → property map.
///
/// Some theme sources deliver the map wrapped in a one-element list (an
/// observed upstream defect); deserialization takes the first element and
/// ignores the rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RawStylesheet(pub BTreeMap<String, RawProps>);

impl RawStylesheet {
    pub fn entries(&self) -> impl Iterator<Item = (&String, &RawProps)> {
        self.0.iter()
    }

    pub fn get(&self, class: &str) -> Option<&RawProps> {
        self.0.get(class)
    }
}

impl<'de> Deserialize<'de> for RawStylesheet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Map(BTreeMap<String, RawProps>),
            List(Vec<BTreeMap<String, RawProps>>),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Map(m) => Ok(RawStylesheet(m)),
            Wire::List(mut l) => {
                log::warn!("stylesheet supplied as a list; using first entry");
                Ok(RawStylesheet(if l.is_empty() {
                    BTreeMap::new()
                } else {
                    l.swap_remove(0)
                }))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized stylesheet (host side)
// ---------------------------------------------------------------------------

/// A host-renderable style value: a resolved color/keyword string or a
/// unitless number. `Other` carries malformed input forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Num(f64),
    Str(String),
    Other(serde_json::Value),
}

impl StyleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            StyleValue::Num(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&RawValue> for StyleValue {
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::Num(n) => StyleValue::Num(*n),
            RawValue::Str(s) => StyleValue::Str(s.clone()),
            RawValue::Other(v) => StyleValue::Other(v.clone()),
        }
    }
}

/// A flat style record. Keys are ordered so serialized output is
/// deterministic across renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(pub BTreeMap<String, StyleValue>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: StyleValue) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(key, StyleValue::Str(value.into()))
    }

    pub fn set_num(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.set(key, StyleValue::Num(value))
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Merge an ordered list of style layers into one flat record. Later layers
/// win on conflicting keys.
pub fn flatten_styles(layers: &[Style]) -> Style {
    let mut out = Style::new();
    for layer in layers {
        for (k, v) in &layer.0 {
            out.0.insert(k.clone(), v.clone());
        }
    }
    out
}

/// Class name → flat host-renderable style record.
pub type NormalizedStyleMap = BTreeMap<String, Style>;

/// The normalized form of one theme: the per-class styles plus the derived
/// default text color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTheme {
    pub styles: NormalizedStyleMap,
    pub default_color: String,
    pub variant: EngineVariant,
}

impl NormalizedTheme {
    /// Style record for a class, if the theme defines one. Lookups for an
    /// absent class contribute no style.
    pub fn class_style(&self, class: &str) -> Option<&Style> {
        self.styles.get(class)
    }

    /// The (already stripped) top-level block wrapper entry, when present.
    pub fn block_style(&self) -> Option<&Style> {
        self.styles.get(self.variant.block_class())
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize an engine stylesheet into host-renderable form and derive the
/// default text color. Pure and infallible; see the module docs for the
/// rewrite rules.
pub fn normalize(raw: &RawStylesheet, variant: EngineVariant) -> NormalizedTheme {
    let mut styles: NormalizedStyleMap = BTreeMap::new();
    for (class, props) in raw.entries() {
        let mut out = Style::new();
        for (key, value) in props {
            normalize_property(&mut out, key, value);
        }
        styles.insert(class.clone(), out);
    }

    let block = variant.block_class();
    let default_color = styles
        .get(block)
        .and_then(|s| s.get("color"))
        .and_then(StyleValue::as_str)
        .unwrap_or(DEFAULT_TEXT_COLOR)
        .to_string();

    if let Some(top) = styles.get_mut(block) {
        strip_inherited(top);
    }
    if let Some(code_class) = variant.code_class() {
        if let Some(code) = styles.get_mut(code_class) {
            strip_inherited(code);
        }
    }

    NormalizedTheme {
        styles,
        default_color,
        variant,
    }
}

/// Apply the per-property rewrite rules, in order:
/// 1. `overflow`/`overflowX` → `overflow` (`auto` becomes `scroll`)
/// 2. `em`-suffixed value → unitless `number * BASE_FONT_PX`
/// 3. `background` shorthand → `backgroundColor`
/// 4. `display` dropped
/// 5. everything else verbatim
fn normalize_property(out: &mut Style, key: &str, value: &RawValue) {
    if key == "overflow" || key == "overflowX" {
        let mapped = match value {
            RawValue::Str(s) if s == "auto" => StyleValue::Str("scroll".to_string()),
            other => StyleValue::from(other),
        };
        out.set("overflow", mapped);
        return;
    }
    if let RawValue::Str(s) = value {
        if let Some(px) = em_to_px(s) {
            out.set_num(key, px);
            return;
        }
    }
    match key {
        "background" => {
            out.set("backgroundColor", StyleValue::from(value));
        }
        "display" => {}
        _ => {
            out.set(key, StyleValue::from(value));
        }
    }
}

/// Parse `"<n>em..."` into `n * BASE_FONT_PX`. Returns `None` when the value
/// carries no `em` or the number prefix does not parse; the caller then
/// passes the value through verbatim.
fn em_to_px(value: &str) -> Option<f64> {
    let idx = value.find("em")?;
    value[..idx]
        .trim()
        .parse::<f64>()
        .ok()
        .map(|n| n * BASE_FONT_PX)
}

/// Strip inherited text properties from a wrapper entry, and drop a
/// `backgroundColor` of `none` (the host has no matching transparent-keyword
/// convention).
fn strip_inherited(style: &mut Style) {
    for prop in INHERITED_TEXT_PROPERTIES {
        style.remove(prop);
    }
    if style.get("backgroundColor").and_then(StyleValue::as_str) == Some("none") {
        style.remove("backgroundColor");
    }
}
