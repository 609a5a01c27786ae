//! Generic extension tree for elements outside the core RSS schema.
//!
//! Any element that lives in a non-default namespace (e.g. `itunes:author`,
//! `dc:creator`, `media:content`) is captured here instead of being dropped:
//!
//! - **[`Extensions`]**: namespace prefix → local element name → occurrences
//! - **[`Extension`]**: one occurrence with text, attributes, and nested children
//!
//! The typed projectors ([`DublinCoreExtension`], [`ITunesFeedExtension`],
//! [`ITunesItemExtension`]) read from a single prefix bucket ([`ExtensionMap`])
//! and never mutate it.

mod dublincore;
mod itunes;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::rss::{ElementSink, MarshalError};

pub use dublincore::DublinCoreExtension;
pub use itunes::{ITunesCategory, ITunesFeedExtension, ITunesItemExtension, ITunesOwner};

/// Canonical prefix for the Dublin Core vocabulary.
pub const DUBLIN_CORE_PREFIX: &str = "dc";
/// Canonical prefix for the iTunes podcast vocabulary.
pub const ITUNES_PREFIX: &str = "itunes";

/// Namespace URIs the reader canonicalises and the default root declares.
pub const KNOWN_NAMESPACES: &[(&str, &str)] = &[
    (DUBLIN_CORE_PREFIX, "http://purl.org/dc/elements/1.1/"),
    (ITUNES_PREFIX, "http://www.itunes.com/dtds/podcast-1.0.dtd"),
    ("content", "http://purl.org/rss/1.0/modules/content/"),
    ("atom", "http://www.w3.org/2005/Atom"),
    ("media", "http://search.yahoo.com/mrss/"),
];

/// Looks up the canonical prefix bound to a well-known namespace URI.
pub fn canonical_prefix(uri: &str) -> Option<&'static str> {
    KNOWN_NAMESPACES
        .iter()
        .find(|(_, known)| *known == uri)
        .map(|(prefix, _)| *prefix)
}

/// Looks up the namespace URI for a canonical prefix.
pub fn namespace_uri(prefix: &str) -> Option<&'static str> {
    KNOWN_NAMESPACES
        .iter()
        .find(|(known, _)| *known == prefix)
        .map(|(_, uri)| *uri)
}

/// Element local name → ordered occurrences, for one namespace prefix.
pub type ExtensionMap = IndexMap<String, Vec<Extension>>;

/// Namespace prefix → [`ExtensionMap`], attached to a feed or an item.
///
/// A missing prefix or name is equivalent to an empty occurrence list.
pub type Extensions = IndexMap<String, ExtensionMap>;

/// A single XML element found in a non-default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Local element name, without prefix.
    pub name: String,
    /// Character data. May be empty, and may coexist with `children`.
    pub value: String,
    /// Attributes in document order.
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
    /// Nested elements keyed by local name.
    #[serde(default)]
    pub children: IndexMap<String, Vec<Extension>>,
}

impl Extension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Extension) -> Self {
        self.children
            .entry(child.name.clone())
            .or_default()
            .push(child);
        self
    }

    /// First child occurrence named `name`, if any.
    pub fn first_child(&self, name: &str) -> Option<&Extension> {
        self.children.get(name).and_then(|matches| matches.first())
    }

    /// Writes this occurrence and its subtree as `prefix:name` elements.
    pub(crate) fn encode<S: ElementSink>(
        &self,
        sink: &mut S,
        prefix: &str,
    ) -> Result<(), MarshalError> {
        let name = format!("{}:{}", prefix, self.name);
        let attrs: Vec<(&str, &str)> = self
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        if self.children.is_empty() {
            return sink.text_element(&name, &attrs, &self.value);
        }

        sink.start(&name, &attrs)?;
        if !self.value.is_empty() {
            sink.text(&self.value)?;
        }
        for child in self.children.values().flatten() {
            child.encode(sink, prefix)?;
        }
        sink.end(&name)
    }
}

/// Returns the value of the first `name` occurrence, or `""` when absent.
pub fn get_scalar(extensions: &ExtensionMap, name: &str) -> String {
    first(extensions, name)
        .map(|m| m.value.clone())
        .unwrap_or_default()
}

/// Returns the value of every `name` occurrence in document order.
///
/// Absent and zero-occurrence keys both yield an empty `Vec`.
pub fn get_array(extensions: &ExtensionMap, name: &str) -> Vec<String> {
    extensions
        .get(name)
        .map(|matches| matches.iter().map(|m| m.value.clone()).collect())
        .unwrap_or_default()
}

/// First occurrence of `name`, treating an empty list like a missing key.
pub fn first<'a>(extensions: &'a ExtensionMap, name: &str) -> Option<&'a Extension> {
    extensions.get(name).and_then(|matches| matches.first())
}

/// Emits `<name>value</name>`, or nothing when `value` is empty.
pub(crate) fn encode_text<S: ElementSink>(
    sink: &mut S,
    name: &str,
    value: &str,
) -> Result<(), MarshalError> {
    if value.is_empty() {
        return Ok(());
    }
    sink.text_element(name, &[], value)
}

/// Emits one `<name>` per entry, each suppressed independently when empty.
pub(crate) fn encode_string_array<S: ElementSink>(
    sink: &mut S,
    name: &str,
    values: &[String],
) -> Result<(), MarshalError> {
    for value in values {
        encode_text(sink, name, value)?;
    }
    Ok(())
}
