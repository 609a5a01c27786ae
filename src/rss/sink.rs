use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

/// Errors raised while writing a document.
///
/// The underlying writer's failure is passed through unchanged; nothing is
/// retried and whatever was already written stays written.
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}

/// Element-stream writer used by the marshaler.
///
/// Calls nest like the document: every `start` is matched by an `end`
/// with the same name.
pub trait ElementSink {
    /// Opens `<name attrs…>`.
    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), MarshalError>;

    /// Writes escaped character data inside the currently open element.
    fn text(&mut self, text: &str) -> Result<(), MarshalError>;

    /// Closes `</name>`.
    fn end(&mut self, name: &str) -> Result<(), MarshalError>;

    /// Writes `<name attrs…>text</name>` as a single leaf element.
    fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), MarshalError> {
        self.start(name, attrs)?;
        if !text.is_empty() {
            self.text(text)?;
        }
        self.end(name)
    }
}

/// [`ElementSink`] backed by a `quick-xml` [`Writer`].
///
/// In indented mode every line starts with `prefix` followed by `indent`
/// once per nesting level. Leaf elements stay on one line.
pub struct XmlSink<W: Write> {
    writer: Writer<W>,
    prefix: String,
    indent: String,
    depth: usize,
    put_newline: bool,
    indented_in: bool,
}

impl<W: Write> XmlSink<W> {
    /// Writes elements back to back with no whitespace between them.
    pub fn compact(inner: W) -> Self {
        Self::indented(inner, "", "")
    }

    /// Starts every line with `prefix` and one `indent` per nesting level.
    ///
    /// Both strings are written verbatim, unescaped. They must be XML
    /// whitespace (spaces, tabs, newlines), otherwise the output has
    /// character data outside the root element.
    pub fn indented(inner: W, prefix: &str, indent: &str) -> Self {
        Self {
            writer: Writer::new(inner),
            prefix: prefix.to_string(),
            indent: indent.to_string(),
            depth: 0,
            put_newline: false,
            indented_in: false,
        }
    }

    /// Writes `<?xml version="1.0" encoding="UTF-8"?>` and a newline.
    pub fn write_declaration(&mut self) -> Result<(), MarshalError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped("\n")))?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_indent(&mut self, delta: isize) -> Result<(), MarshalError> {
        if self.prefix.is_empty() && self.indent.is_empty() {
            return Ok(());
        }
        if delta < 0 {
            self.depth = self.depth.saturating_sub(1);
            if self.indented_in {
                // Closing a leaf: keep `</name>` on the same line.
                self.indented_in = false;
                return Ok(());
            }
        }
        self.indented_in = false;

        let mut whitespace = String::new();
        if self.put_newline {
            whitespace.push('\n');
        } else {
            self.put_newline = true;
        }
        whitespace.push_str(&self.prefix);
        for _ in 0..self.depth {
            whitespace.push_str(&self.indent);
        }
        if delta > 0 {
            self.depth += 1;
            self.indented_in = true;
        }

        if !whitespace.is_empty() {
            self.writer
                .write_event(Event::Text(BytesText::from_escaped(whitespace)))?;
        }
        Ok(())
    }
}

impl<W: Write> ElementSink for XmlSink<W> {
    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), MarshalError> {
        self.write_indent(1)?;
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), MarshalError> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), MarshalError> {
        self.write_indent(-1)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}
