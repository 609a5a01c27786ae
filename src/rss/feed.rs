use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extensions::{
    DublinCoreExtension, Extensions, ITunesFeedExtension, ITunesItemExtension,
};

// ============================================================================
// Feed
// ============================================================================

/// An RSS channel together with the document wrapper it was read from.
///
/// `root_name` and `root_attrs` are captured from the source document so the
/// same `<rss …>` element (version, namespace declarations, anything else)
/// is reproduced on serialize. They are not part of the structural dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feed {
    #[serde(skip)]
    pub root_name: String,
    #[serde(skip)]
    pub root_attrs: Vec<(String, String)>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub managing_editor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub web_master: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pub_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_build_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_build_date_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub generator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub docs: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ttl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rating: String,
    /// `None` omits `<skipHours>`; `Some` always writes the container.
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub skip_hours: Option<Vec<String>>,
    /// `None` omits `<skipDays>`; `Some` always writes the container.
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub skip_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_input: Option<TextInput>,
    #[serde(rename = "dcExt", skip_serializing_if = "Option::is_none")]
    pub dublin_core_ext: Option<DublinCoreExtension>,
    #[serde(rename = "itunesExt", skip_serializing_if = "Option::is_none")]
    pub itunes_ext: Option<ITunesFeedExtension>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    pub items: Vec<Item>,
    pub version: String,
}

impl Feed {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    /// Forgets the captured `<rss …>` wrapper so the default root is used.
    pub fn reset_root(&mut self) {
        self.root_name.clear();
        self.root_attrs.clear();
    }

    /// True when any item, or the channel itself, carries the given projection.
    pub(crate) fn uses_itunes(&self) -> bool {
        self.itunes_ext.is_some() || self.items.iter().any(|i| i.itunes_ext.is_some())
    }

    pub(crate) fn uses_dublin_core(&self) -> bool {
        self.dublin_core_ext.is_some() || self.items.iter().any(|i| i.dublin_core_ext.is_some())
    }
}

fn is_none_or_empty(value: &Option<Vec<String>>) -> bool {
    value.as_ref().map_or(true, Vec::is_empty)
}

// ============================================================================
// Item
// ============================================================================

/// A single `<item>` of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosure: Option<Enclosure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pub_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(rename = "dcExt", skip_serializing_if = "Option::is_none")]
    pub dublin_core_ext: Option<DublinCoreExtension>,
    #[serde(rename = "itunesExt", skip_serializing_if = "Option::is_none")]
    pub itunes_ext: Option<ITunesItemExtension>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    /// Unprefixed elements outside the RSS schema, in insertion order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub custom: IndexMap<String, String>,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Value objects
// ============================================================================

/// Channel artwork (`<image>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub width: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub height: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Media attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enclosure {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub length: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guid {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(rename = "isPermaLink", skip_serializing_if = "String::is_empty")]
    pub is_permalink: String,
}

/// The channel an item was republished from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl Category {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            domain: String::new(),
            value: value.into(),
        }
    }
}

/// A text input box displayed with the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextInput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
}

/// rssCloud registration endpoint for update notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cloud {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub register_procedure: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocol: String,
}
