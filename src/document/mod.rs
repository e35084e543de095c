mod reader;
mod writer;


pub use writer::WriteOptions;

use crate::error::SplitError;
use std::collections::BTreeMap;

/// Index path from the root element to a descendant element
pub type ElementPath = Vec<usize>;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data
    Text(String),
    CData(String),
    /// Raw comment body
    Comment(String),
    /// Raw processing instruction body (target and content)
    ProcessingInstruction(String),
    /// Raw doctype body
    DocType(String),
}

/// An element with its qualified name, ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written in the source (e.g. "diffgr:diffgram")
    pub name: String,
    /// Attributes in source order, qualified keys, unescaped values
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Comments, PIs and doctype before the root (declaration excluded)
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and PIs after the root
    pub epilog: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Iterate child elements, skipping text and other nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.child_elements()
            .find(|e| e.local_name() == local_name)
    }

    /// Concatenated direct text and CDATA content
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &idx in path {
            current = match current.children.get(idx) {
                Some(Node::Element(e)) => e,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &idx in path {
            current = match current.children.get_mut(idx) {
                Some(Node::Element(e)) => e,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Path to the first element (self included, document order) with this local name
    pub fn find_path(&self, local_name: &str) -> Option<ElementPath> {
        if self.local_name() == local_name {
            return Some(Vec::new());
        }
        for (idx, node) in self.children.iter().enumerate() {
            if let Node::Element(child) = node {
                if let Some(mut rest) = child.find_path(local_name) {
                    rest.insert(0, idx);
                    return Some(rest);
                }
            }
        }
        None
    }

    /// Descendants with this local name in document order, not descending into matches
    pub fn descendants_named<'a>(&'a self, local_name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(local_name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, local_name: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.local_name() == local_name {
                found.push(child);
            } else {
                child.collect_named(local_name, found);
            }
        }
    }

    /// Remove every descendant element with this local name; returns how many went
    pub fn remove_descendants_named(&mut self, local_name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|node| match node {
            Node::Element(e) => e.local_name() != local_name,
            _ => true,
        });
        let mut removed = before - self.children.len();
        for node in &mut self.children {
            if let Node::Element(child) = node {
                removed += child.remove_descendants_named(local_name);
            }
        }
        removed
    }

    /// Prefixes this element declares, as (prefix, uri)
    fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(k, v)| {
            k.strip_prefix("xmlns:")
                .map(|prefix| (prefix, v.as_str()))
        })
    }
}

impl Document {
    /// Parse a complete XML document from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, SplitError> {
        reader::parse_document(bytes)
    }

    /// Serialize the document with a fresh XML declaration
    pub fn to_bytes(&self, options: &WriteOptions) -> Result<Vec<u8>, SplitError> {
        writer::write_document(self, options)
    }

    /// Find a prefix bound to `uri` in scope at the element at `path`.
    ///
    /// Only explicit `xmlns:prefix` declarations count; a default namespace
    /// cannot qualify attributes.
    pub fn prefix_in_scope(&self, path: &[usize], uri: &str) -> Option<String> {
        let mut scope: BTreeMap<&str, &str> = BTreeMap::new();
        let mut current = &self.root;
        scope.extend(current.namespace_declarations());

        for &idx in path {
            current = match current.children.get(idx) {
                Some(Node::Element(e)) => e,
                _ => return None,
            };
            scope.extend(current.namespace_declarations());
        }

        scope
            .into_iter()
            .find(|(_, bound)| *bound == uri)
            .map(|(prefix, _)| prefix.to_string())
    }
}

pub(crate) fn local_part(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}
