use serde::{Deserialize, Serialize};

use super::{encode_string_array, get_array, ExtensionMap};
use crate::rss::{ElementSink, MarshalError};

/// Dublin Core metadata attached to a feed or an item.
///
/// Every field is a sequence because the vocabulary allows repeated
/// elements. An empty sequence means the element was not present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DublinCoreExtension {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creator: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subject: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub publisher: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributor: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub kind: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub language: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relation: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coverage: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rights: Vec<String>,
}

impl DublinCoreExtension {
    /// Lifts the `dc` prefix bucket into typed fields. Never fails.
    pub fn from_extensions(extensions: &ExtensionMap) -> Self {
        Self {
            title: get_array(extensions, "title"),
            creator: get_array(extensions, "creator"),
            author: get_array(extensions, "author"),
            subject: get_array(extensions, "subject"),
            description: get_array(extensions, "description"),
            publisher: get_array(extensions, "publisher"),
            contributor: get_array(extensions, "contributor"),
            date: get_array(extensions, "date"),
            kind: get_array(extensions, "type"),
            format: get_array(extensions, "format"),
            identifier: get_array(extensions, "identifier"),
            source: get_array(extensions, "source"),
            language: get_array(extensions, "language"),
            relation: get_array(extensions, "relation"),
            coverage: get_array(extensions, "coverage"),
            rights: get_array(extensions, "rights"),
        }
    }

    /// Writes every populated field as repeated `dc:*` elements.
    pub fn encode<S: ElementSink>(&self, sink: &mut S) -> Result<(), MarshalError> {
        encode_string_array(sink, "dc:title", &self.title)?;
        encode_string_array(sink, "dc:creator", &self.creator)?;
        encode_string_array(sink, "dc:author", &self.author)?;
        encode_string_array(sink, "dc:subject", &self.subject)?;
        encode_string_array(sink, "dc:description", &self.description)?;
        encode_string_array(sink, "dc:publisher", &self.publisher)?;
        encode_string_array(sink, "dc:contributor", &self.contributor)?;
        encode_string_array(sink, "dc:date", &self.date)?;
        encode_string_array(sink, "dc:type", &self.kind)?;
        encode_string_array(sink, "dc:format", &self.format)?;
        encode_string_array(sink, "dc:identifier", &self.identifier)?;
        encode_string_array(sink, "dc:source", &self.source)?;
        encode_string_array(sink, "dc:language", &self.language)?;
        encode_string_array(sink, "dc:relation", &self.relation)?;
        encode_string_array(sink, "dc:coverage", &self.coverage)?;
        encode_string_array(sink, "dc:rights", &self.rights)?;
        Ok(())
    }
}
