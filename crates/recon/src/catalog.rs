//! Typed in-memory form of a catalog.
//!
//! Attribute values and text are held in source markup form (entity
//! references left escaped) so an untouched entity renders back to the
//! same bytes. Plain values coming from datasets go through
//! [`escape_attr`] before they are stored.

use std::borrow::Cow;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Ordered attribute list. Setting an existing name keeps its position,
/// a new name is appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Description,
    Year,
    Manufacturer,
    Info,
    Rom,
    Sample,
    Sound,
    Video,
    Input,
    Driver,
}

impl ChildKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Year => "year",
            Self::Manufacturer => "manufacturer",
            Self::Info => "info",
            Self::Rom => "rom",
            Self::Sample => "sample",
            Self::Sound => "sound",
            Self::Video => "video",
            Self::Input => "input",
            Self::Driver => "driver",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "description" => Self::Description,
            "year" => Self::Year,
            "manufacturer" => Self::Manufacturer,
            "info" => Self::Info,
            "rom" => Self::Rom,
            "sample" => Self::Sample,
            "sound" => Self::Sound,
            "video" => Self::Video,
            "input" => Self::Input,
            "driver" => Self::Driver,
            _ => return None,
        })
    }

    /// Elements rendered as `<tag>text</tag>` rather than empty tags.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Description | Self::Year | Self::Manufacturer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub kind: ChildKind,
    pub attrs: Attributes,
    /// Content of text elements, `None` for empty ones.
    pub text: Option<String>,
}

impl Child {
    pub fn element(kind: ChildKind, attrs: Attributes) -> Self {
        Self { kind, attrs, text: None }
    }

    pub fn text(kind: ChildKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            attrs: Attributes::new(),
            text: Some(text.into()),
        }
    }

    /// Build an `<info name=".." value=".."/>` child from plain values.
    pub fn info(name: &str, value: &str) -> Self {
        let mut attrs = Attributes::new();
        attrs.push("name", escape_attr(name));
        attrs.push("value", escape_attr(value));
        Self::element(ChildKind::Info, attrs)
    }

    /// `name` attribute of an info child.
    pub fn info_name(&self) -> Option<&str> {
        match self.kind {
            ChildKind::Info => self.attrs.get("name"),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entities + catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Element name, `game` or `machine`.
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Child>,
}

impl Entity {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// The entity identifier: the `name` attribute with entity references
    /// resolved. `None` when the attribute is missing or empty.
    pub fn name(&self) -> Option<Cow<'_, str>> {
        self.attrs
            .get("name")
            .filter(|raw| !raw.is_empty())
            .map(unescape)
    }

    pub fn first(&self, kind: ChildKind) -> Option<&Child> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn of_kind(&self, kind: ChildKind) -> impl Iterator<Item = &Child> {
        self.children.iter().filter(move |c| c.kind == kind)
    }
}

/// A parsed primary catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Source text before the first entity element.
    pub header: String,
    /// Root element name, used for the closing tag.
    pub root: String,
    pub entities: Vec<Entity>,
}

impl Catalog {
    /// Identifiers of every named entity. Nameless entities never match.
    pub fn universe(&self) -> crate::model::Universe {
        self.entities
            .iter()
            .filter_map(|e| e.name().map(Cow::into_owned))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape a plain value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    let escaped = quick_xml::escape::partial_escape(value);
    if escaped.contains('"') {
        Cow::Owned(escaped.replace('"', "&quot;"))
    } else {
        escaped
    }
}

/// Resolve entity references in a markup value. Malformed references are
/// left as they are.
pub fn unescape(value: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(value).unwrap_or(Cow::Borrowed(value))
}
