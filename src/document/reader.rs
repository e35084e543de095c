use super::{Document, Element, Node};
use crate::error::SplitError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Build a document tree from quick-xml events.
///
/// Whitespace-only text between sibling elements is formatting and is
/// dropped. Any other text, including the whitespace-only value of a leaf
/// element, is kept unescaped.
pub(super) fn parse_document(bytes: &[u8]) -> Result<Document, SplitError> {
    let mut reader = Reader::from_reader(bytes);
    let mut tree = TreeBuilder::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SplitError::parse(reader.error_position() as u64, e.to_string()))?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Start(start) => tree.stack.push(start_element(&start, position)?),
            Event::Empty(start) => {
                let element = start_element(&start, position)?;
                tree.attach(Node::Element(element), position)?;
            }
            Event::End(_) => {
                let mut element = tree
                    .stack
                    .pop()
                    .ok_or_else(|| SplitError::parse(position, "unexpected closing tag"))?;
                drop_formatting(&mut element);
                tree.attach(Node::Element(element), position)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| SplitError::parse(position, e.to_string()))?;
                // Outside the root only whitespace is legal and it never matters
                if tree.stack.is_empty() && text.trim().is_empty() {
                    continue;
                }
                tree.attach(Node::Text(text.into_owned()), position)?;
            }
            Event::CData(data) => {
                let data = utf8(&data, position)?;
                tree.attach(Node::CData(data), position)?;
            }
            Event::Comment(comment) => {
                let comment = utf8(&comment, position)?;
                tree.attach(Node::Comment(comment), position)?;
            }
            Event::PI(pi) => {
                let pi = utf8(&pi, position)?;
                tree.attach(Node::ProcessingInstruction(pi), position)?;
            }
            Event::DocType(doctype) => {
                let doctype = utf8(&doctype, position)?;
                tree.attach(Node::DocType(doctype), position)?;
            }
            // Regenerated on write
            Event::Decl(_) => {}
            Event::Eof => break,
        }
    }

    let position = reader.buffer_position() as u64;
    if let Some(open) = tree.stack.last() {
        return Err(SplitError::parse(
            position,
            format!("unclosed element <{}>", open.name),
        ));
    }

    let root = tree
        .root
        .ok_or_else(|| SplitError::parse(position, "document has no root element"))?;

    Ok(Document {
        prolog: tree.prolog,
        root,
        epilog: tree.epilog,
    })
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
    prolog: Vec<Node>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node, position: u64) -> Result<(), SplitError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(SplitError::parse(position, "multiple root elements"));
                }
                self.root = Some(element);
            }
            Node::Text(_) | Node::CData(_) => {
                return Err(SplitError::parse(
                    position,
                    "character data outside the root element",
                ));
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }

        Ok(())
    }
}

/// Strip whitespace-only text from an element that also has child elements
fn drop_formatting(element: &mut Element) {
    let has_elements = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Element(_)));
    if has_elements {
        element
            .children
            .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
    }
}

fn start_element(start: &BytesStart<'_>, position: u64) -> Result<Element, SplitError> {
    let name = utf8(start.name().as_ref(), position)?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| SplitError::parse(position, e.to_string()))?;
        let key = utf8(attr.key.as_ref(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|e| SplitError::parse(position, e.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn utf8(bytes: &[u8], position: u64) -> Result<String, SplitError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| SplitError::parse(position, format!("invalid UTF-8: {}", e)))
}
