use serde::{Deserialize, Serialize};

use super::{encode_text, first, get_scalar, Extension, ExtensionMap, ITUNES_PREFIX};
use crate::rss::{ElementSink, MarshalError};

/// iTunes podcast fields for a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ITunesFeedExtension {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub block: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<ITunesCategory>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub explicit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<ITunesOwner>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Artwork URL, carried by the `href` attribute rather than text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub complete: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub new_feed_url: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// iTunes podcast fields for a single episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ITunesItemExtension {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub block: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub explicit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub keywords: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub is_closed_captioned: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub episode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub season: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub order: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub episode_type: String,
}

/// A podcast category with at most one level of subcategory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ITunesCategory {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Box<ITunesCategory>>,
}

/// Contact details for the podcast owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ITunesOwner {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl ITunesFeedExtension {
    /// Lifts the `itunes` prefix bucket of a channel. Never fails.
    pub fn from_extensions(extensions: &ExtensionMap) -> Self {
        Self {
            author: get_scalar(extensions, "author"),
            block: get_scalar(extensions, "block"),
            categories: parse_categories(extensions),
            explicit: get_scalar(extensions, "explicit"),
            keywords: get_scalar(extensions, "keywords"),
            owner: parse_owner(extensions),
            subtitle: get_scalar(extensions, "subtitle"),
            summary: get_scalar(extensions, "summary"),
            image: parse_image(extensions),
            complete: get_scalar(extensions, "complete"),
            new_feed_url: get_scalar(extensions, "new-feed-url"),
            kind: get_scalar(extensions, "type"),
        }
    }

    pub fn encode<S: ElementSink>(&self, sink: &mut S) -> Result<(), MarshalError> {
        self.encode_over(sink, None)
    }

    /// Like [`encode`](Self::encode), but the owner element also carries the
    /// children of the first raw `owner` occurrence that the projection does
    /// not model.
    pub(crate) fn encode_over<S: ElementSink>(
        &self,
        sink: &mut S,
        raw: Option<&ExtensionMap>,
    ) -> Result<(), MarshalError> {
        encode_text(sink, "itunes:author", &self.author)?;
        encode_text(sink, "itunes:block", &self.block)?;
        for category in &self.categories {
            category.encode(sink)?;
        }
        encode_text(sink, "itunes:explicit", &self.explicit)?;
        encode_text(sink, "itunes:keywords", &self.keywords)?;
        if let Some(owner) = &self.owner {
            owner.encode(sink, raw.and_then(|bucket| first(bucket, "owner")))?;
        }
        encode_text(sink, "itunes:subtitle", &self.subtitle)?;
        encode_text(sink, "itunes:summary", &self.summary)?;
        encode_image(sink, &self.image)?;
        encode_text(sink, "itunes:complete", &self.complete)?;
        encode_text(sink, "itunes:new-feed-url", &self.new_feed_url)?;
        encode_text(sink, "itunes:type", &self.kind)?;
        Ok(())
    }
}

impl ITunesItemExtension {
    /// Lifts the `itunes` prefix bucket of an item. Never fails.
    pub fn from_extensions(extensions: &ExtensionMap) -> Self {
        Self {
            author: get_scalar(extensions, "author"),
            block: get_scalar(extensions, "block"),
            duration: get_scalar(extensions, "duration"),
            explicit: get_scalar(extensions, "explicit"),
            keywords: get_scalar(extensions, "keywords"),
            subtitle: get_scalar(extensions, "subtitle"),
            summary: get_scalar(extensions, "summary"),
            image: parse_image(extensions),
            is_closed_captioned: get_scalar(extensions, "isClosedCaptioned"),
            episode: get_scalar(extensions, "episode"),
            season: get_scalar(extensions, "season"),
            order: get_scalar(extensions, "order"),
            episode_type: get_scalar(extensions, "episodeType"),
        }
    }

    pub fn encode<S: ElementSink>(&self, sink: &mut S) -> Result<(), MarshalError> {
        encode_text(sink, "itunes:author", &self.author)?;
        encode_text(sink, "itunes:block", &self.block)?;
        encode_text(sink, "itunes:duration", &self.duration)?;
        encode_text(sink, "itunes:explicit", &self.explicit)?;
        encode_text(sink, "itunes:keywords", &self.keywords)?;
        encode_text(sink, "itunes:subtitle", &self.subtitle)?;
        encode_text(sink, "itunes:summary", &self.summary)?;
        encode_image(sink, &self.image)?;
        encode_text(sink, "itunes:isClosedCaptioned", &self.is_closed_captioned)?;
        encode_text(sink, "itunes:episode", &self.episode)?;
        encode_text(sink, "itunes:season", &self.season)?;
        encode_text(sink, "itunes:order", &self.order)?;
        encode_text(sink, "itunes:episodeType", &self.episode_type)?;
        Ok(())
    }
}

impl ITunesCategory {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subcategory: None,
        }
    }

    pub fn with_subcategory(mut self, text: impl Into<String>) -> Self {
        self.subcategory = Some(Box::new(ITunesCategory::new(text)));
        self
    }

    fn encode<S: ElementSink>(&self, sink: &mut S) -> Result<(), MarshalError> {
        let attrs = text_attr(&self.text);
        match &self.subcategory {
            None => sink.text_element("itunes:category", &attrs, ""),
            Some(sub) => {
                sink.start("itunes:category", &attrs)?;
                // One level only: a subcategory's own subcategory is never written.
                sink.text_element("itunes:category", &text_attr(&sub.text), "")?;
                sink.end("itunes:category")
            }
        }
    }
}

impl ITunesOwner {
    fn encode<S: ElementSink>(
        &self,
        sink: &mut S,
        raw: Option<&Extension>,
    ) -> Result<(), MarshalError> {
        sink.start("itunes:owner", &[])?;
        encode_text(sink, "itunes:name", &self.name)?;
        encode_text(sink, "itunes:email", &self.email)?;
        if let Some(raw) = raw {
            for (name, occurrences) in &raw.children {
                let modeled = usize::from(name == "name" || name == "email");
                for child in occurrences.iter().skip(modeled) {
                    child.encode(sink, ITUNES_PREFIX)?;
                }
            }
        }
        sink.end("itunes:owner")
    }
}

fn text_attr(text: &str) -> Vec<(&str, &str)> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![("text", text)]
    }
}

/// `<itunes:image href="…"></itunes:image>`, or nothing when `href` is empty.
fn encode_image<S: ElementSink>(sink: &mut S, href: &str) -> Result<(), MarshalError> {
    if href.is_empty() {
        return Ok(());
    }
    sink.text_element("itunes:image", &[("href", href)], "")
}

fn parse_image(extensions: &ExtensionMap) -> String {
    first(extensions, "image")
        .and_then(|image| image.attrs.get("href"))
        .cloned()
        .unwrap_or_default()
}

fn parse_owner(extensions: &ExtensionMap) -> Option<ITunesOwner> {
    let owner = first(extensions, "owner")?;
    let child_value = |name: &str| {
        owner
            .first_child(name)
            .map(|child| child.value.clone())
            .unwrap_or_default()
    };
    Some(ITunesOwner {
        name: child_value("name"),
        email: child_value("email"),
    })
}

fn parse_categories(extensions: &ExtensionMap) -> Vec<ITunesCategory> {
    let Some(matches) = extensions.get("category") else {
        return Vec::new();
    };

    matches
        .iter()
        .map(|cat| ITunesCategory {
            text: cat.attrs.get("text").cloned().unwrap_or_default(),
            subcategory: cat.first_child("category").map(|sub| {
                Box::new(ITunesCategory::new(
                    sub.attrs.get("text").cloned().unwrap_or_default(),
                ))
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rss::XmlSink;

    fn bucket(occurrences: Vec<Extension>) -> ExtensionMap {
        let mut map = ExtensionMap::new();
        for ext in occurrences {
            map.entry(ext.name.clone()).or_default().push(ext);
        }
        map
    }

    fn render<F>(encode: F) -> String
    where
        F: FnOnce(&mut XmlSink<Vec<u8>>) -> Result<(), MarshalError>,
    {
        let mut sink = XmlSink::compact(Vec::new());
        encode(&mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_image_lifted_from_href_attribute() {
        let ext = bucket(vec![
            Extension::new("image", "ignored text").with_attr("href", "http://x/a.png")
        ]);
        let feed = ITunesFeedExtension::from_extensions(&ext);
        let item = ITunesItemExtension::from_extensions(&ext);
        assert_eq!(feed.image, "http://x/a.png");
        assert_eq!(item.image, "http://x/a.png");
    }

    #[test]
    fn test_image_without_href_is_empty() {
        let ext = bucket(vec![Extension::new("image", "http://x/a.png")]);
        assert_eq!(ITunesFeedExtension::from_extensions(&ext).image, "");
    }

    #[test]
    fn test_image_lowered_as_href_attribute() {
        let itunes = ITunesFeedExtension {
            image: "http://x/a.png".to_string(),
            ..Default::default()
        };
        assert_eq!(
            render(|s| itunes.encode(s)),
            r#"<itunes:image href="http://x/a.png"></itunes:image>"#
        );
    }

    #[test]
    fn test_item_image_lowered_as_href_attribute() {
        let itunes = ITunesItemExtension {
            image: "http://x/ep.png".to_string(),
            ..Default::default()
        };
        assert_eq!(
            render(|s| itunes.encode(s)),
            r#"<itunes:image href="http://x/ep.png"></itunes:image>"#
        );
    }

    #[test]
    fn test_owner_with_only_name() {
        let ext = bucket(vec![
            Extension::new("owner", "").with_child(Extension::new("name", "Jane"))
        ]);
        let owner = ITunesFeedExtension::from_extensions(&ext).owner;
        assert_eq!(
            owner,
            Some(ITunesOwner {
                name: "Jane".to_string(),
                email: String::new(),
            })
        );
    }

    #[test]
    fn test_owner_absent_is_none() {
        let ext = bucket(vec![Extension::new("author", "Jane")]);
        assert!(ITunesFeedExtension::from_extensions(&ext).owner.is_none());
    }

    #[test]
    fn test_owner_with_no_children_is_some() {
        let ext = bucket(vec![Extension::new("owner", "")]);
        assert_eq!(
            ITunesFeedExtension::from_extensions(&ext).owner,
            Some(ITunesOwner::default())
        );
    }

    #[test]
    fn test_categories_keep_one_level_of_nesting() {
        let grandchild = Extension::new("category", "").with_attr("text", "Deep");
        let child = Extension::new("category", "")
            .with_attr("text", "Software How-To")
            .with_child(grandchild);
        let top = Extension::new("category", "")
            .with_attr("text", "Technology")
            .with_child(child);
        let ext = bucket(vec![top, Extension::new("category", "").with_attr("text", "Arts")]);

        let itunes = ITunesFeedExtension::from_extensions(&ext);
        assert_eq!(
            itunes.categories,
            vec![
                ITunesCategory::new("Technology").with_subcategory("Software How-To"),
                ITunesCategory::new("Arts"),
            ]
        );
        let sub = itunes.categories[0].subcategory.as_ref().unwrap();
        assert!(sub.subcategory.is_none());
    }

    #[test]
    fn test_category_lower_drops_deeper_levels() {
        let mut sub = ITunesCategory::new("Software How-To");
        sub.subcategory = Some(Box::new(ITunesCategory::new("Deep")));
        let itunes = ITunesFeedExtension {
            categories: vec![ITunesCategory {
                text: "Technology".to_string(),
                subcategory: Some(Box::new(sub)),
            }],
            ..Default::default()
        };

        let out = render(|s| itunes.encode(s));
        assert_eq!(
            out,
            concat!(
                r#"<itunes:category text="Technology">"#,
                r#"<itunes:category text="Software How-To"></itunes:category>"#,
                "</itunes:category>"
            )
        );
        assert!(!out.contains("Deep"));
    }

    #[test]
    fn test_feed_lower_order_and_suppression() {
        let itunes = ITunesFeedExtension {
            author: "Jane".to_string(),
            kind: "episodic".to_string(),
            explicit: "no".to_string(),
            owner: Some(ITunesOwner {
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
            }),
            new_feed_url: "https://example.com/new.xml".to_string(),
            ..Default::default()
        };

        assert_eq!(
            render(|s| itunes.encode(s)),
            concat!(
                "<itunes:author>Jane</itunes:author>",
                "<itunes:explicit>no</itunes:explicit>",
                "<itunes:owner><itunes:name>Jane</itunes:name>",
                "<itunes:email>jane@example.com</itunes:email></itunes:owner>",
                "<itunes:new-feed-url>https://example.com/new.xml</itunes:new-feed-url>",
                "<itunes:type>episodic</itunes:type>"
            )
        );
    }

    #[test]
    fn test_owner_keeps_unmodeled_raw_children() {
        let raw = bucket(vec![Extension::new("owner", "")
            .with_child(Extension::new("name", "Jane"))
            .with_child(Extension::new("phone", "555"))
            .with_child(Extension::new("name", "Janet"))]);
        let itunes = ITunesFeedExtension::from_extensions(&raw);

        assert_eq!(
            render(|s| itunes.encode_over(s, Some(&raw))),
            concat!(
                "<itunes:owner><itunes:name>Jane</itunes:name>",
                "<itunes:name>Janet</itunes:name>",
                "<itunes:phone>555</itunes:phone></itunes:owner>"
            )
        );
        // Without the raw bucket only modeled fields are written.
        assert_eq!(
            render(|s| itunes.encode(s)),
            "<itunes:owner><itunes:name>Jane</itunes:name></itunes:owner>"
        );
    }

    #[test]
    fn test_item_lift_scalars() {
        let ext = bucket(vec![
            Extension::new("duration", "01:02:03"),
            Extension::new("episode", "7"),
            Extension::new("season", "2"),
            Extension::new("episodeType", "full"),
            Extension::new("isClosedCaptioned", "Yes"),
        ]);
        let item = ITunesItemExtension::from_extensions(&ext);
        assert_eq!(item.duration, "01:02:03");
        assert_eq!(item.episode, "7");
        assert_eq!(item.season, "2");
        assert_eq!(item.episode_type, "full");
        assert_eq!(item.is_closed_captioned, "Yes");
        assert_eq!(item.author, "");
    }

    #[test]
    fn test_empty_extension_emits_nothing() {
        assert_eq!(render(|s| ITunesFeedExtension::default().encode(s)), "");
        assert_eq!(render(|s| ITunesItemExtension::default().encode(s)), "");
    }
}
