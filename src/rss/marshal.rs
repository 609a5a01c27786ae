//! Ordered XML writer for [`Feed`] and [`Item`].
//!
//! Element order is fixed here and never derived from struct field order.
//! Each field has one emission policy:
//!
//! | policy            | fields                                               |
//! |-------------------|------------------------------------------------------|
//! | suppress if empty | every scalar string, custom item entries             |
//! | omit if unset     | image, cloud, textinput, enclosure, guid, source     |
//! | per entry         | categories, `dc:*` sequences, `itunes:category`      |
//! | wrapper if set    | skipHours / skipDays (written even with no entries)  |
//! | attribute         | `itunes:image` (`href`), enclosure, cloud, guid      |

use std::fmt;

use serde::Serialize;

use super::feed::{Category, Cloud, Enclosure, Feed, Guid, Image, Item, Source, TextInput};
use super::sink::{ElementSink, MarshalError, XmlSink};
use crate::extensions::{
    encode_string_array, encode_text, namespace_uri, Extensions, DUBLIN_CORE_PREFIX,
    ITUNES_PREFIX,
};

/// Root element used when a feed carries no captured wrapper.
pub const DEFAULT_ROOT: &str = "rss";

/// Raw names a typed projection writes itself, for one prefix.
struct Coverage {
    prefix: &'static str,
    /// Written from the first occurrence only; later occurrences stay raw.
    scalars: &'static [&'static str],
    /// Every occurrence is written by the projection.
    sequences: &'static [&'static str],
}

impl Coverage {
    /// How many leading occurrences of `name` the projection already wrote.
    fn written(&self, name: &str, occurrences: usize) -> usize {
        if self.sequences.contains(&name) {
            occurrences
        } else if self.scalars.contains(&name) {
            occurrences.min(1)
        } else {
            0
        }
    }
}

const ITUNES_FEED_COVERAGE: Coverage = Coverage {
    prefix: ITUNES_PREFIX,
    scalars: &[
        "author",
        "block",
        "explicit",
        "keywords",
        "owner",
        "subtitle",
        "summary",
        "image",
        "complete",
        "new-feed-url",
        "type",
        "title",
    ],
    sequences: &["category"],
};

const ITUNES_ITEM_COVERAGE: Coverage = Coverage {
    prefix: ITUNES_PREFIX,
    scalars: &[
        "author",
        "block",
        "duration",
        "explicit",
        "keywords",
        "subtitle",
        "summary",
        "image",
        "isClosedCaptioned",
        "episode",
        "season",
        "order",
        "episodeType",
        "title",
    ],
    sequences: &[],
};

const DUBLIN_CORE_COVERAGE: Coverage = Coverage {
    prefix: DUBLIN_CORE_PREFIX,
    scalars: &[],
    sequences: &[
        "title",
        "creator",
        "author",
        "subject",
        "description",
        "publisher",
        "contributor",
        "date",
        "type",
        "format",
        "identifier",
        "source",
        "language",
        "relation",
        "coverage",
        "rights",
    ],
};

/// Serializes `feed` indented by two spaces, with no line prefix.
pub fn marshal(feed: &Feed) -> Result<Vec<u8>, MarshalError> {
    feed.marshal_indent("", "  ")
}

impl Feed {
    /// XML declaration followed by the document, with no whitespace.
    pub fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
        self.marshal_with(XmlSink::compact(Vec::new()))
    }

    /// XML declaration followed by the document. Each line starts with
    /// `prefix` and one `indent` per nesting level.
    pub fn marshal_indent(&self, prefix: &str, indent: &str) -> Result<Vec<u8>, MarshalError> {
        self.marshal_with(XmlSink::indented(Vec::new(), prefix, indent))
    }

    fn marshal_with(&self, mut sink: XmlSink<Vec<u8>>) -> Result<Vec<u8>, MarshalError> {
        tracing::debug!(
            items = self.items.len(),
            captured_root = !self.root_name.is_empty(),
            "Marshaling feed"
        );
        sink.write_declaration()?;
        self.encode(&mut sink)?;
        Ok(sink.into_inner())
    }

    /// Writes the root element, the channel and every item to `sink`.
    pub fn encode<S: ElementSink>(&self, sink: &mut S) -> Result<(), MarshalError> {
        let (root, root_attrs) = self.root_element();
        let root_attrs: Vec<(&str, &str)> = root_attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        sink.start(&root, &root_attrs)?;
        sink.start("channel", &[])?;

        encode_text(sink, "title", &self.title)?;
        encode_text(sink, "link", &self.link)?;
        encode_text(sink, "description", &self.description)?;
        encode_text(sink, "language", &self.language)?;
        encode_text(sink, "copyright", &self.copyright)?;
        encode_text(sink, "managingEditor", &self.managing_editor)?;
        encode_text(sink, "webMaster", &self.web_master)?;
        encode_text(sink, "pubDate", &self.pub_date)?;
        encode_text(sink, "lastBuildDate", &self.last_build_date)?;
        encode_categories(sink, &self.categories)?;
        encode_text(sink, "generator", &self.generator)?;
        encode_text(sink, "docs", &self.docs)?;
        encode_text(sink, "ttl", &self.ttl)?;
        if let Some(image) = &self.image {
            encode_image(sink, image)?;
        }
        encode_text(sink, "rating", &self.rating)?;
        encode_wrapped(sink, "skipHours", "hour", self.skip_hours.as_deref())?;
        encode_wrapped(sink, "skipDays", "day", self.skip_days.as_deref())?;
        if let Some(text_input) = &self.text_input {
            encode_text_input(sink, text_input)?;
        }
        if let Some(cloud) = &self.cloud {
            encode_cloud(sink, cloud)?;
        }

        let mut covered: Vec<&Coverage> = Vec::new();
        if let Some(itunes) = &self.itunes_ext {
            itunes.encode_over(sink, self.extensions.get(ITUNES_PREFIX))?;
            encode_text(sink, "itunes:title", &self.title)?;
            covered.push(&ITUNES_FEED_COVERAGE);
        }
        if let Some(dc) = &self.dublin_core_ext {
            dc.encode(sink)?;
            covered.push(&DUBLIN_CORE_COVERAGE);
        }
        encode_unprojected(sink, &self.extensions, &covered)?;

        for item in &self.items {
            item.encode(sink)?;
        }

        sink.end("channel")?;
        sink.end(&root)
    }

    /// The captured wrapper, or `<rss>` with the declarations this feed needs.
    ///
    /// A captured root keeps its attributes in order. Declarations for known
    /// prefixes the output uses but the root does not bind are appended, so
    /// canonicalised aliases still resolve.
    fn root_element(&self) -> (String, Vec<(String, String)>) {
        if !self.root_name.is_empty() {
            let mut attrs = self.root_attrs.clone();
            let missing = self.namespace_declarations(&attrs);
            attrs.extend(missing);
            return (self.root_name.clone(), attrs);
        }

        let mut attrs = Vec::new();
        if !self.version.is_empty() {
            attrs.push(("version".to_string(), self.version.clone()));
        }
        let declarations = self.namespace_declarations(&attrs);
        attrs.extend(declarations);
        (DEFAULT_ROOT.to_string(), attrs)
    }

    /// `xmlns:<prefix>` pairs for known prefixes written anywhere in the
    /// document and not already declared in `declared`.
    fn namespace_declarations(&self, declared: &[(String, String)]) -> Vec<(String, String)> {
        let mut prefixes: Vec<&str> = Vec::new();
        if self.uses_itunes() {
            prefixes.push(ITUNES_PREFIX);
        }
        if self.uses_dublin_core() {
            prefixes.push(DUBLIN_CORE_PREFIX);
        }
        let raw_buckets = std::iter::once(&self.extensions)
            .chain(self.items.iter().map(|i| &i.extensions))
            .flat_map(|ext| ext.keys());
        for prefix in raw_buckets {
            if !prefixes.contains(&prefix.as_str()) {
                prefixes.push(prefix.as_str());
            }
        }

        prefixes
            .into_iter()
            .filter_map(|prefix| {
                let key = format!("xmlns:{}", prefix);
                if declared.iter().any(|(k, _)| *k == key) {
                    return None;
                }
                namespace_uri(prefix).map(|uri| (key, uri.to_string()))
            })
            .collect()
    }

    /// Field-labeled JSON rendering of the whole model, for diagnostics.
    ///
    /// Typed projections appear under `dcExt`/`itunesExt`, separately from
    /// the raw `extensions` tree.
    pub fn dump(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dump = self.dump().map_err(|_| fmt::Error)?;
        f.write_str(&dump)
    }
}

impl Item {
    /// Writes one `<item>` element, projections inlined after the custom entries.
    pub fn encode<S: ElementSink>(&self, sink: &mut S) -> Result<(), MarshalError> {
        sink.start("item", &[])?;

        encode_text(sink, "title", &self.title)?;
        encode_text(sink, "link", &self.link)?;
        encode_text(sink, "description", &self.description)?;
        encode_text(sink, "content", &self.content)?;
        encode_text(sink, "author", &self.author)?;
        encode_categories(sink, &self.categories)?;
        encode_text(sink, "comments", &self.comments)?;
        if let Some(enclosure) = &self.enclosure {
            encode_enclosure(sink, enclosure)?;
        }
        if let Some(guid) = &self.guid {
            encode_guid(sink, guid)?;
        }
        encode_text(sink, "pubDate", &self.pub_date)?;
        if let Some(source) = &self.source {
            encode_source(sink, source)?;
        }
        for (name, value) in &self.custom {
            encode_text(sink, name, value)?;
        }

        let mut covered: Vec<&Coverage> = Vec::new();
        if let Some(itunes) = &self.itunes_ext {
            itunes.encode(sink)?;
            encode_text(sink, "itunes:title", &self.title)?;
            covered.push(&ITUNES_ITEM_COVERAGE);
        }
        if let Some(dc) = &self.dublin_core_ext {
            dc.encode(sink)?;
            covered.push(&DUBLIN_CORE_COVERAGE);
        }
        encode_unprojected(sink, &self.extensions, &covered)?;

        sink.end("item")
    }
}

/// Keeps only attributes with a value.
fn present<'a>(attrs: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    attrs.iter().copied().filter(|(_, v)| !v.is_empty()).collect()
}

/// Writes raw extension occurrences that no typed projection on this node wrote.
///
/// A covered scalar name skips only its first occurrence, so repeated
/// elements survive next to the projected value.
fn encode_unprojected<S: ElementSink>(
    sink: &mut S,
    extensions: &Extensions,
    covered: &[&Coverage],
) -> Result<(), MarshalError> {
    for (prefix, bucket) in extensions {
        let coverage = covered.iter().find(|c| c.prefix == prefix.as_str());
        for (name, occurrences) in bucket {
            let written = coverage.map_or(0, |c| c.written(name, occurrences.len()));
            for ext in &occurrences[written..] {
                ext.encode(sink, prefix)?;
            }
        }
    }
    Ok(())
}

fn encode_wrapped<S: ElementSink>(
    sink: &mut S,
    name: &str,
    entry_name: &str,
    values: Option<&[String]>,
) -> Result<(), MarshalError> {
    let Some(values) = values else {
        return Ok(());
    };
    sink.start(name, &[])?;
    encode_string_array(sink, entry_name, values)?;
    sink.end(name)
}

fn encode_categories<S: ElementSink>(
    sink: &mut S,
    categories: &[Category],
) -> Result<(), MarshalError> {
    for category in categories {
        let attrs = present(&[("domain", category.domain.as_str())]);
        sink.text_element("category", &attrs, &category.value)?;
    }
    Ok(())
}

fn encode_image<S: ElementSink>(sink: &mut S, image: &Image) -> Result<(), MarshalError> {
    sink.start("image", &[])?;
    encode_text(sink, "url", &image.url)?;
    encode_text(sink, "link", &image.link)?;
    encode_text(sink, "title", &image.title)?;
    encode_text(sink, "width", &image.width)?;
    encode_text(sink, "height", &image.height)?;
    encode_text(sink, "description", &image.description)?;
    sink.end("image")
}

fn encode_text_input<S: ElementSink>(
    sink: &mut S,
    text_input: &TextInput,
) -> Result<(), MarshalError> {
    sink.start("textinput", &[])?;
    encode_text(sink, "title", &text_input.title)?;
    encode_text(sink, "description", &text_input.description)?;
    encode_text(sink, "name", &text_input.name)?;
    encode_text(sink, "link", &text_input.link)?;
    sink.end("textinput")
}

fn encode_cloud<S: ElementSink>(sink: &mut S, cloud: &Cloud) -> Result<(), MarshalError> {
    let attrs = present(&[
        ("domain", cloud.domain.as_str()),
        ("port", cloud.port.as_str()),
        ("path", cloud.path.as_str()),
        ("registerProcedure", cloud.register_procedure.as_str()),
        ("protocol", cloud.protocol.as_str()),
    ]);
    sink.text_element("cloud", &attrs, "")
}

fn encode_enclosure<S: ElementSink>(
    sink: &mut S,
    enclosure: &Enclosure,
) -> Result<(), MarshalError> {
    let attrs = present(&[
        ("url", enclosure.url.as_str()),
        ("length", enclosure.length.as_str()),
        ("type", enclosure.kind.as_str()),
    ]);
    sink.text_element("enclosure", &attrs, "")
}

fn encode_guid<S: ElementSink>(sink: &mut S, guid: &Guid) -> Result<(), MarshalError> {
    let attrs = present(&[("isPermaLink", guid.is_permalink.as_str())]);
    sink.text_element("guid", &attrs, &guid.value)
}

fn encode_source<S: ElementSink>(sink: &mut S, source: &Source) -> Result<(), MarshalError> {
    let attrs = present(&[("url", source.url.as_str())]);
    sink.text_element("source", &attrs, &source.title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{DublinCoreExtension, Extension, ITunesFeedExtension, ITunesItemExtension};

    fn compact(feed: &Feed) -> String {
        String::from_utf8(feed.marshal().unwrap()).unwrap()
    }

    fn item_xml(item: &Item) -> String {
        let mut sink = XmlSink::compact(Vec::new());
        item.encode(&mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("{} not found in {}", needle, haystack))
    }

    #[test]
    fn test_empty_feed_uses_default_root() {
        assert_eq!(
            compact(&Feed::default()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss><channel></channel></rss>"
        );
    }

    #[test]
    fn test_default_root_declares_version_and_namespaces() {
        let mut feed = Feed {
            version: "2.0".to_string(),
            itunes_ext: Some(ITunesFeedExtension::default()),
            ..Feed::default()
        };
        let mut item = Item::new("Ep");
        item.dublin_core_ext = Some(DublinCoreExtension::default());
        feed.items.push(item);

        let out = compact(&feed);
        assert!(out.contains(concat!(
            r#"<rss version="2.0" "#,
            r#"xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/">"#
        )));
    }

    #[test]
    fn test_captured_root_is_reproduced_exactly() {
        let feed = Feed {
            root_name: "rss".to_string(),
            root_attrs: vec![
                ("xmlns:custom".to_string(), "http://example.com/ns".to_string()),
                ("version".to_string(), "0.92".to_string()),
            ],
            version: "ignored".to_string(),
            ..Feed::default()
        };
        let out = compact(&feed);
        assert!(out.contains(r#"<rss xmlns:custom="http://example.com/ns" version="0.92"><channel>"#));
        assert!(out.ends_with("</channel></rss>"));
    }

    #[test]
    fn test_channel_element_order() {
        let feed = Feed {
            title: "T".to_string(),
            link: "L".to_string(),
            description: "D".to_string(),
            language: "en".to_string(),
            copyright: "C".to_string(),
            managing_editor: "M".to_string(),
            web_master: "W".to_string(),
            pub_date: "P".to_string(),
            last_build_date: "B".to_string(),
            categories: vec![Category::new("Cat")],
            generator: "G".to_string(),
            docs: "Docs".to_string(),
            ttl: "60".to_string(),
            image: Some(Image {
                url: "u".to_string(),
                ..Image::default()
            }),
            rating: "R".to_string(),
            skip_hours: Some(vec!["1".to_string()]),
            skip_days: Some(vec!["Monday".to_string()]),
            text_input: Some(TextInput {
                name: "q".to_string(),
                ..TextInput::default()
            }),
            cloud: Some(Cloud {
                domain: "rpc.example.com".to_string(),
                ..Cloud::default()
            }),
            itunes_ext: Some(ITunesFeedExtension {
                author: "IA".to_string(),
                ..Default::default()
            }),
            dublin_core_ext: Some(DublinCoreExtension {
                creator: vec!["DC".to_string()],
                ..Default::default()
            }),
            items: vec![Item::new("I")],
            ..Feed::default()
        };

        let out = compact(&feed);
        let order = [
            "<title>T</title>",
            "<link>L</link>",
            "<description>D</description>",
            "<language>en</language>",
            "<copyright>C</copyright>",
            "<managingEditor>M</managingEditor>",
            "<webMaster>W</webMaster>",
            "<pubDate>P</pubDate>",
            "<lastBuildDate>B</lastBuildDate>",
            "<category>Cat</category>",
            "<generator>G</generator>",
            "<docs>Docs</docs>",
            "<ttl>60</ttl>",
            "<image><url>u</url></image>",
            "<rating>R</rating>",
            "<skipHours><hour>1</hour></skipHours>",
            "<skipDays><day>Monday</day></skipDays>",
            "<textinput><name>q</name></textinput>",
            r#"<cloud domain="rpc.example.com"></cloud>"#,
            "<itunes:author>IA</itunes:author>",
            "<itunes:title>T</itunes:title>",
            "<dc:creator>DC</dc:creator>",
            "<item><title>I</title>",
        ];
        let positions: Vec<usize> = order.iter().map(|n| position(&out, n)).collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "unexpected order: {}",
            out
        );
    }

    #[test]
    fn test_unset_fields_are_suppressed() {
        let out = compact(&Feed::new("", ""));
        for name in ["<title", "<image", "<skipHours", "<skipDays", "<cloud", "<itunes:", "<dc:"] {
            assert!(!out.contains(name), "{} should be suppressed in {}", name, out);
        }
    }

    #[test]
    fn test_present_but_empty_skip_hours_keeps_wrapper() {
        let feed = Feed {
            skip_hours: Some(Vec::new()),
            skip_days: Some(vec![String::new()]),
            ..Feed::default()
        };
        let out = compact(&feed);
        assert!(out.contains("<skipHours></skipHours>"), "{}", out);
        assert!(out.contains("<skipDays></skipDays>"), "{}", out);
    }

    #[test]
    fn test_item_element_order() {
        let mut item = Item {
            title: "T".to_string(),
            link: "L".to_string(),
            description: "D".to_string(),
            content: "C".to_string(),
            author: "A".to_string(),
            categories: vec![Category {
                domain: "d".to_string(),
                value: "v".to_string(),
            }],
            comments: "Cm".to_string(),
            enclosure: Some(Enclosure {
                url: "http://x/a.mp3".to_string(),
                length: "10".to_string(),
                kind: "audio/mpeg".to_string(),
            }),
            guid: Some(Guid {
                value: "g1".to_string(),
                is_permalink: "false".to_string(),
            }),
            pub_date: "P".to_string(),
            source: Some(Source {
                title: "S".to_string(),
                url: "http://x/".to_string(),
            }),
            itunes_ext: Some(ITunesItemExtension {
                episode: "3".to_string(),
                ..Default::default()
            }),
            dublin_core_ext: Some(DublinCoreExtension {
                rights: vec!["R".to_string()],
                ..Default::default()
            }),
            ..Item::default()
        };
        item.custom.insert("custom".to_string(), "X".to_string());

        assert_eq!(
            item_xml(&item),
            concat!(
                "<item><title>T</title><link>L</link><description>D</description>",
                "<content>C</content><author>A</author>",
                r#"<category domain="d">v</category><comments>Cm</comments>"#,
                r#"<enclosure url="http://x/a.mp3" length="10" type="audio/mpeg"></enclosure>"#,
                r#"<guid isPermaLink="false">g1</guid><pubDate>P</pubDate>"#,
                r#"<source url="http://x/">S</source><custom>X</custom>"#,
                "<itunes:episode>3</itunes:episode><itunes:title>T</itunes:title>",
                "<dc:rights>R</dc:rights></item>"
            )
        );
    }

    #[test]
    fn test_custom_entries_keep_insertion_order() {
        let mut item = Item::default();
        item.custom.insert("b".to_string(), "2".to_string());
        item.custom.insert("a".to_string(), "1".to_string());
        item.custom.insert("c".to_string(), "3".to_string());

        assert_eq!(item_xml(&item), "<item><b>2</b><a>1</a><c>3</c></item>");
    }

    #[test]
    fn test_unprojected_extensions_are_reemitted() {
        let mut item = Item::default();
        let media = Extension::new("content", "")
            .with_attr("url", "http://x/v.mp4")
            .with_child(Extension::new("title", "Clip"));
        item.extensions
            .entry("media".to_string())
            .or_default()
            .insert("content".to_string(), vec![media]);
        item.extensions
            .entry("itunes".to_string())
            .or_default()
            .insert("episode".to_string(), vec![Extension::new("episode", "9")]);
        item.extensions
            .entry("itunes".to_string())
            .or_default()
            .insert("chapters".to_string(), vec![Extension::new("chapters", "ch")]);
        item.itunes_ext = Some(ITunesItemExtension {
            episode: "9".to_string(),
            ..Default::default()
        });

        assert_eq!(
            item_xml(&item),
            concat!(
                "<item><itunes:episode>9</itunes:episode>",
                r#"<media:content url="http://x/v.mp4"><media:title>Clip</media:title></media:content>"#,
                "<itunes:chapters>ch</itunes:chapters></item>"
            )
        );
    }

    #[test]
    fn test_raw_bucket_written_when_projection_missing() {
        let mut item = Item::default();
        item.extensions
            .entry("itunes".to_string())
            .or_default()
            .insert("episode".to_string(), vec![Extension::new("episode", "4")]);

        assert_eq!(item_xml(&item), "<item><itunes:episode>4</itunes:episode></item>");
    }

    #[test]
    fn test_repeated_scalar_occurrences_are_kept() {
        let mut item = Item::default();
        let itunes = item.extensions.entry("itunes".to_string()).or_default();
        itunes.insert(
            "author".to_string(),
            vec![Extension::new("author", "A"), Extension::new("author", "B")],
        );
        let dc = item.extensions.entry("dc".to_string()).or_default();
        dc.insert(
            "subject".to_string(),
            vec![Extension::new("subject", "x"), Extension::new("subject", "y")],
        );
        item.itunes_ext = Some(ITunesItemExtension::from_extensions(&item.extensions["itunes"]));
        item.dublin_core_ext = Some(DublinCoreExtension::from_extensions(&item.extensions["dc"]));

        assert_eq!(
            item_xml(&item),
            concat!(
                "<item><itunes:author>A</itunes:author>",
                "<dc:subject>x</dc:subject><dc:subject>y</dc:subject>",
                "<itunes:author>B</itunes:author></item>"
            )
        );
    }

    #[test]
    fn test_captured_root_gains_missing_canonical_declaration() {
        let feed = Feed {
            root_name: "rss".to_string(),
            root_attrs: vec![(
                "xmlns:pod".to_string(),
                "http://www.itunes.com/dtds/podcast-1.0.dtd".to_string(),
            )],
            itunes_ext: Some(ITunesFeedExtension {
                author: "Jane".to_string(),
                ..Default::default()
            }),
            ..Feed::default()
        };
        let out = compact(&feed);
        assert!(out.contains(concat!(
            r#"<rss xmlns:pod="http://www.itunes.com/dtds/podcast-1.0.dtd" "#,
            r#"xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>"#
        )), "{}", out);
    }

    #[test]
    fn test_captured_root_declaring_prefix_is_untouched() {
        let attrs = vec![
            ("version".to_string(), "2.0".to_string()),
            (
                "xmlns:itunes".to_string(),
                "http://www.itunes.com/dtds/podcast-1.0.dtd".to_string(),
            ),
        ];
        let feed = Feed {
            root_name: "rss".to_string(),
            root_attrs: attrs.clone(),
            itunes_ext: Some(ITunesFeedExtension::default()),
            ..Feed::default()
        };
        assert_eq!(feed.root_element(), ("rss".to_string(), attrs));
    }

    #[test]
    fn test_compact_and_indented_differ_only_in_whitespace() {
        let mut feed = Feed::new("Title", "https://example.com");
        feed.skip_hours = Some(vec!["1".to_string(), "2".to_string()]);
        feed.items.push(Item::new("One"));
        feed.items.push(Item::new("Two"));

        let compact = compact(&feed);
        let indented = String::from_utf8(feed.marshal_indent("", "    ").unwrap()).unwrap();
        assert!(indented.contains("\n    <channel>"));
        assert!(indented.contains("\n        <item>"));

        let squeeze = |s: &str| -> String {
            s.lines().map(str::trim).collect::<Vec<_>>().join("")
        };
        assert_eq!(squeeze(&compact), squeeze(&indented));
    }

    #[test]
    fn test_marshal_helper_uses_two_space_indent() {
        let out = String::from_utf8(marshal(&Feed::new("T", "")).unwrap()).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss>\n  <channel>\n    <title>T</title>\n  </channel>\n</rss>"
        );
    }

    struct ClosedWriter;

    impl std::io::Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let mut sink = XmlSink::compact(ClosedWriter);
        let err = Feed::new("T", "").encode(&mut sink).unwrap_err();
        assert!(err.to_string().contains("closed"), "{}", err);
    }

    #[test]
    fn test_dump_labels_projections_separately_from_raw_tree() {
        let mut feed = Feed::new("Podcast", "");
        feed.itunes_ext = Some(ITunesFeedExtension {
            author: "Jane".to_string(),
            ..Default::default()
        });
        feed.extensions
            .entry("itunes".to_string())
            .or_default()
            .insert("author".to_string(), vec![Extension::new("author", "Jane")]);

        let dump = feed.to_string();
        assert!(dump.contains("\"itunesExt\": {"), "{}", dump);
        assert!(dump.contains("\"extensions\": {"), "{}", dump);
        assert!(dump.contains("\n    \"title\": \"Podcast\""), "{}", dump);
        assert!(dump.contains("\"items\": []"), "{}", dump);
        assert!(!dump.contains("rootName"), "{}", dump);
    }
}
