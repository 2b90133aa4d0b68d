//! A small HTML element tree.
//!
//! Renderers build [`Element`]s rather than strings so tests can inspect the
//! structure; [`Element::to_html`] serialises with text and attribute values
//! escaped as comrak escapes them. [`Node::Html`] is emitted verbatim.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Trusted markup inserted as-is.
    Html(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Set an attribute, replacing an earlier value.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a class to the `class` attribute.
    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.children.push(Node::Html(html.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn add_class(&mut self, class: &str) {
        let classes = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr("class", classes);
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Direct child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Every descendant element with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.tag == tag {
                found.push(child);
            }
            child.collect(tag, found);
        }
    }

    /// Concatenated text content, as a browser's `textContent` would give.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Element(e) => out.push_str(&e.text_content()),
                Node::Text(t) | Node::Html(t) => out.push_str(t),
            }
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_html(out),
                Node::Text(t) => out.push_str(&escape(t)),
                Node::Html(h) => out.push_str(h),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escape `&`, `<`, `>` and `"` the way comrak does in rendered notes.
pub fn escape(text: &str) -> String {
    let mut buf = Vec::with_capacity(text.len());
    // Writing into a Vec cannot fail
    let _ = comrak::html::escape(&mut buf, text.as_bytes());
    String::from_utf8_lossy(&buf).into_owned()
}
