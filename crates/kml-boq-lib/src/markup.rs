//! Minimal XML element tree
//!
//! Extraction rules run against this tree rather than against the streaming reader,
//! so `quick-xml` stays an implementation detail of [`parse_document`].

use crate::{ConvertError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

/// An element with its namespace prefix stripped
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Self {
        Self::new(String::from_utf8_lossy(start.local_name().as_ref()).into_owned())
    }

    #[cfg(test)]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Child elements, skipping text nodes
    pub(crate) fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order (pre-order), excluding `self`
    pub(crate) fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.child_elements().collect::<Vec<_>>().into_iter().rev().collect(),
        }
    }

    /// All descendant elements named `name`, in document order
    pub(crate) fn descendants_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |element| element.name == name)
    }

    /// First descendant named `name` in document order
    #[inline]
    pub(crate) fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|element| element.name == name)
    }

    /// Concatenated text of this element and all its descendants
    pub(crate) fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Pre-order iterator over descendant elements
pub(crate) struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let children: Vec<&Element> = element.child_elements().collect();
        self.stack.extend(children.into_iter().rev());
        Some(element)
    }
}

/// Parse markup text into a tree rooted at a synthetic `#document` element
pub(crate) fn parse_document(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = vec![Element::new("#document".to_string())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Element::from_start(&start)),
            Ok(Event::Empty(start)) => {
                let element = Element::from_start(&start);
                push_child(&mut stack, Node::Element(element));
            }
            Ok(Event::End(_)) => {
                // quick-xml checks that end names match, so the document root never pops here
                if stack.len() > 1 {
                    if let Some(element) = stack.pop() {
                        push_child(&mut stack, Node::Element(element));
                    }
                }
            }
            Ok(Event::Text(raw)) => {
                let text = match raw.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(e) => {
                        tracing::debug!("Keeping undecodable text verbatim: {}", e);
                        String::from_utf8_lossy(&raw).into_owned()
                    }
                };
                push_child(&mut stack, Node::Text(text));
            }
            Ok(Event::CData(cdata)) => {
                let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                push_child(&mut stack, Node::Text(text));
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes
            Ok(_) => {}
            Err(e) => return Err(markup_error(&reader, e.to_string())),
        }
    }

    if stack.len() > 1 {
        let unclosed = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(markup_error(
            &reader,
            format!("unclosed element <{}>", unclosed),
        ));
    }

    Ok(stack.pop().unwrap_or_else(|| Element::new("#document".to_string())))
}

fn markup_error(reader: &Reader<&[u8]>, message: String) -> ConvertError {
    ConvertError::Markup {
        position: reader.error_position(),
        message,
    }
}

#[inline]
fn push_child(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}
