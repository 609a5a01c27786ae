//! RSS document model, reader, and ordered writer.
//!
//! - [`feed`]: the typed [`Feed`]/[`Item`] model and its value objects
//! - [`parser`]: reads an RSS document into the model using `quick-xml`
//! - [`marshal`]: writes the model back out in a fixed element order
//! - [`sink`]: the element-stream writer the marshaler targets
//!
//! # Example
//!
//! ```
//! use rsswire::rss;
//!
//! let feed = rss::parse_str(r#"<rss version="2.0"><channel><title>Hi</title></channel></rss>"#)?;
//! let xml = feed.marshal_indent("", "  ")?;
//! assert!(String::from_utf8_lossy(&xml).contains("<title>Hi</title>"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod feed;
mod marshal;
mod parser;
mod sink;

pub use feed::{Category, Cloud, Enclosure, Feed, Guid, Image, Item, Source, TextInput};
pub use marshal::{marshal, DEFAULT_ROOT};
pub use parser::{parse, parse_str, ParseError};
pub use sink::{ElementSink, MarshalError, XmlSink};
