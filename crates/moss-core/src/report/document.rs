//! Parser-independent document model.
//!
//! An HTML parser only has to locate an element and hand back an owned [`Element`] tree;
//! all rewriting and serialization happens on that tree.

use std::fmt::Write as _;

/// Elements serialized without content or closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "frame", "hr", "img", "input", "link", "meta", "param",
    "source", "wbr",
];

/// Elements whose text content is written verbatim.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Capability the report pipeline needs from an HTML parsing library.
pub trait DocumentParser {
    /// Parse `markup` and return a detached copy of the first element named `tag`
    /// in document order, if there is one.
    fn locate(&self, markup: &str, tag: &str) -> Option<Element>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag: String = tag.into();
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_ascii_lowercase();
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(index).1)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Descendant elements named `tag`, in document order. The element itself is not included.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(element) = child {
                if element.tag.eq_ignore_ascii_case(tag) {
                    found.push(element);
                }
                element.collect(tag, found);
            }
        }
    }

    pub fn count(&self, tag: &str) -> usize {
        self.find_all(tag).len()
    }

    /// Visit descendant elements named `tag` in document order, allowing mutation.
    ///
    /// A matched element's children are visited after `visit` returns, against its
    /// possibly renamed tag.
    pub fn try_for_each_mut<E>(
        &mut self,
        tag: &str,
        visit: &mut impl FnMut(&mut Element) -> Result<(), E>,
    ) -> Result<(), E> {
        for child in &mut self.children {
            if let Node::Element(element) = child {
                if element.tag.eq_ignore_ascii_case(tag) {
                    visit(element)?;
                }
                element.try_for_each_mut(tag, visit)?;
            }
        }
        Ok(())
    }

    /// Serialize the element, including its own tag.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_html(out),
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Comment(comment) => {
                    let _ = write!(out, "<!--{}-->", comment);
                }
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
