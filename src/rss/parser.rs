use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::feed::{Category, Cloud, Enclosure, Feed, Guid, Image, Item, Source, TextInput};
use crate::extensions::{
    canonical_prefix, DublinCoreExtension, Extension, Extensions, ITunesFeedExtension,
    ITunesItemExtension, DUBLIN_CORE_PREFIX, ITUNES_PREFIX,
};

/// SEC-003: Maximum element nesting depth accepted by the reader.
const MAX_DEPTH: usize = 64;

/// Errors that can occur while reading an RSS document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has no <channel> element")]
    MissingChannel,

    /// SEC-003: Nesting depth exceeds safety limit.
    #[error("Element nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// Parses an RSS document from raw bytes. The input must be UTF-8.
pub fn parse(bytes: &[u8]) -> Result<Feed, ParseError> {
    let content = std::str::from_utf8(bytes).map_err(|e| ParseError::XmlParse(e.to_string()))?;
    parse_str(content)
}

/// Parses an RSS document into a [`Feed`].
///
/// Elements in a prefixed namespace land in the feed's or item's
/// [`Extensions`]; `itunes` and `dc` buckets are additionally lifted into
/// their typed projections. The root element's name and attributes are
/// captured verbatim.
pub fn parse_str(content: &str) -> Result<Feed, ParseError> {
    let root = read_tree(content)?;
    let namespaces = Namespaces::declared_on(&root);

    let channel = root
        .children
        .iter()
        .find(|c| c.name == "channel")
        .ok_or(ParseError::MissingChannel)?;

    let mut feed = Feed {
        root_name: root.name.clone(),
        root_attrs: root.attrs.clone(),
        version: root.attr("version").unwrap_or_default().to_string(),
        ..Feed::default()
    };

    for child in &channel.children {
        if let Some((prefix, local)) = split_name(&child.name) {
            push_extension(&mut feed.extensions, namespaces.canonical(prefix), local, child);
            continue;
        }

        match child.name.as_str() {
            "title" => feed.title = child.text.clone(),
            "link" => feed.link = child.text.clone(),
            "description" => feed.description = child.text.clone(),
            "language" => feed.language = child.text.clone(),
            "copyright" => feed.copyright = child.text.clone(),
            "managingEditor" => feed.managing_editor = child.text.clone(),
            "webMaster" => feed.web_master = child.text.clone(),
            "pubDate" => feed.pub_date = child.text.clone(),
            "lastBuildDate" => feed.last_build_date = child.text.clone(),
            "category" => feed.categories.push(read_category(child)),
            "generator" => feed.generator = child.text.clone(),
            "docs" => feed.docs = child.text.clone(),
            "ttl" => feed.ttl = child.text.clone(),
            "image" => feed.image = Some(read_image(child)),
            "rating" => feed.rating = child.text.clone(),
            "skipHours" => feed.skip_hours = Some(child.texts_of("hour")),
            "skipDays" => feed.skip_days = Some(child.texts_of("day")),
            "textinput" | "textInput" => feed.text_input = Some(read_text_input(child)),
            "cloud" => feed.cloud = Some(read_cloud(child)),
            "item" => feed.items.push(read_item(child, &namespaces)),
            other => tracing::debug!(element = other, "Skipping unknown channel element"),
        }
    }

    feed.pub_date_parsed = parse_date(&feed.pub_date);
    feed.last_build_date_parsed = parse_date(&feed.last_build_date);
    if let Some(bucket) = feed.extensions.get(ITUNES_PREFIX) {
        feed.itunes_ext = Some(ITunesFeedExtension::from_extensions(bucket));
    }
    if let Some(bucket) = feed.extensions.get(DUBLIN_CORE_PREFIX) {
        feed.dublin_core_ext = Some(DublinCoreExtension::from_extensions(bucket));
    }

    tracing::debug!(
        root = %feed.root_name,
        items = feed.items.len(),
        extension_prefixes = feed.extensions.len(),
        "Parsed feed"
    );
    Ok(feed)
}

fn read_item(node: &Node, namespaces: &Namespaces) -> Item {
    let mut item = Item::default();

    for child in &node.children {
        if let Some((prefix, local)) = split_name(&child.name) {
            push_extension(&mut item.extensions, namespaces.canonical(prefix), local, child);
            continue;
        }

        match child.name.as_str() {
            "title" => item.title = child.text.clone(),
            "link" => item.link = child.text.clone(),
            "description" => item.description = child.text.clone(),
            "content" => item.content = child.text.clone(),
            "author" => item.author = child.text.clone(),
            "category" => item.categories.push(read_category(child)),
            "comments" => item.comments = child.text.clone(),
            "enclosure" => {
                item.enclosure = Some(Enclosure {
                    url: child.attr_string("url"),
                    length: child.attr_string("length"),
                    kind: child.attr_string("type"),
                })
            }
            "guid" => {
                item.guid = Some(Guid {
                    value: child.text.clone(),
                    is_permalink: child.attr_string("isPermaLink"),
                })
            }
            "pubDate" => item.pub_date = child.text.clone(),
            "source" => {
                item.source = Some(Source {
                    title: child.text.clone(),
                    url: child.attr_string("url"),
                })
            }
            other => {
                if !child.children.is_empty() {
                    tracing::debug!(element = other, "Skipping structured custom item element");
                } else if !child.text.is_empty() {
                    item.custom.insert(other.to_string(), child.text.clone());
                }
            }
        }
    }

    item.pub_date_parsed = parse_date(&item.pub_date);
    if let Some(bucket) = item.extensions.get(ITUNES_PREFIX) {
        item.itunes_ext = Some(ITunesItemExtension::from_extensions(bucket));
    }
    if let Some(bucket) = item.extensions.get(DUBLIN_CORE_PREFIX) {
        item.dublin_core_ext = Some(DublinCoreExtension::from_extensions(bucket));
    }
    item
}

fn read_category(node: &Node) -> Category {
    Category {
        domain: node.attr_string("domain"),
        value: node.text.clone(),
    }
}

fn read_image(node: &Node) -> Image {
    Image {
        url: node.child_text("url"),
        link: node.child_text("link"),
        title: node.child_text("title"),
        width: node.child_text("width"),
        height: node.child_text("height"),
        description: node.child_text("description"),
    }
}

fn read_text_input(node: &Node) -> TextInput {
    TextInput {
        title: node.child_text("title"),
        description: node.child_text("description"),
        name: node.child_text("name"),
        link: node.child_text("link"),
    }
}

fn read_cloud(node: &Node) -> Cloud {
    Cloud {
        domain: node.attr_string("domain"),
        port: node.attr_string("port"),
        path: node.attr_string("path"),
        register_procedure: node.attr_string("registerProcedure"),
        protocol: node.attr_string("protocol"),
    }
}

fn push_extension(extensions: &mut Extensions, prefix: &str, local: &str, node: &Node) {
    extensions
        .entry(prefix.to_string())
        .or_default()
        .entry(local.to_string())
        .or_default()
        .push(node.to_extension(local));
}

/// Best-effort RFC 2822 then RFC 3339 parse.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Splits `prefix:local`. Unprefixed names yield `None`.
fn split_name(name: &str) -> Option<(&str, &str)> {
    name.split_once(':')
        .filter(|(prefix, local)| !prefix.is_empty() && !local.is_empty())
}

fn local_name(name: &str) -> &str {
    split_name(name).map_or(name, |(_, local)| local)
}

// ============================================================================
// Namespace prefixes
// ============================================================================

/// Maps document prefixes bound to well-known URIs onto canonical ones, so
/// `xmlns:podcast="http://www.itunes.com/dtds/podcast-1.0.dtd"` lands in `itunes`.
struct Namespaces {
    aliases: IndexMap<String, &'static str>,
}

impl Namespaces {
    fn declared_on(root: &Node) -> Self {
        let mut aliases = IndexMap::new();
        let channel = root.children.iter().filter(|c| c.name == "channel");
        for node in std::iter::once(root).chain(channel) {
            for (key, uri) in &node.attrs {
                let Some(prefix) = key.strip_prefix("xmlns:") else {
                    continue;
                };
                if let Some(canonical) = canonical_prefix(uri) {
                    aliases.insert(prefix.to_string(), canonical);
                }
            }
        }
        Self { aliases }
    }

    fn canonical<'a>(&self, prefix: &'a str) -> &'a str {
        self.aliases.get(prefix).copied().unwrap_or(prefix)
    }
}

// ============================================================================
// Element tree
// ============================================================================

#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn attr_string(&self, key: &str) -> String {
        self.attr(key).unwrap_or_default().to_string()
    }

    fn child_text(&self, name: &str) -> String {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.clone())
            .unwrap_or_default()
    }

    /// Non-empty text of every direct child named `name`.
    fn texts_of(&self, name: &str) -> Vec<String> {
        self.children
            .iter()
            .filter(|c| c.name == name && !c.text.is_empty())
            .map(|c| c.text.clone())
            .collect()
    }

    fn to_extension(&self, local: &str) -> Extension {
        let mut children: IndexMap<String, Vec<Extension>> = IndexMap::new();
        for child in &self.children {
            let child_local = local_name(&child.name);
            children
                .entry(child_local.to_string())
                .or_default()
                .push(child.to_extension(child_local));
        }
        Extension {
            name: local.to_string(),
            value: self.text.clone(),
            attrs: self.attrs.iter().cloned().collect(),
            children,
        }
    }
}

/// Reads the whole document into a [`Node`] tree rooted at the document element.
///
/// SEC-002: entity handling relies on quick-xml (0.37) never expanding
/// `<!ENTITY>` declarations; only the five XML builtins resolve.
fn read_tree(content: &str) -> Result<Node, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError::MaxDepthExceeded(MAX_DEPTH));
                }
                stack.push(start_node(&e, &reader)?);
            }
            Ok(Event::Empty(e)) => {
                let node = start_node(&e, &reader)?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ParseError::XmlParse(err.to_string()))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let data = e.into_inner();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();

        if root.is_some() && stack.is_empty() {
            break;
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::XmlParse(format!(
            "Unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or(ParseError::MissingRoot)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn start_node(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Node, ParseError> {
    let mut node = Node {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ..Node::default()
    };

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(element = %node.name, error = %err, "Skipping malformed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| ParseError::XmlParse(err.to_string()))?;
        node.attrs.push((key, value.into_owned()));
    }
    Ok(node)
}
