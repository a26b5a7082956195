//! Minimal owned XML tree
//!
//! The template is read into this tree with quick-xml, generated fragments are
//! spliced into it, and the result is written back with quick-xml without any
//! pretty printing. Element names are kept as written (`fx:ECU`), prefixes are
//! not resolved.

use crate::config::DocumentOrder;
use crate::types::{FibexError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// A child node of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// Processing instruction content, without the `<?` `?>` delimiters
    ProcessingInstruction(String),
    /// Document type declaration content, after the `DOCTYPE` keyword
    DocType(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder method: set an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder method: append a text node (empty text adds nothing)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
        self
    }

    /// Builder method: append a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Concatenated text content of direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert a child at the head or the tail depending on `order`
    pub fn place(&mut self, child: Element, order: DocumentOrder) {
        match order {
            DocumentOrder::Prepend => self.children.insert(0, Node::Element(child)),
            DocumentOrder::Append => self.children.push(Node::Element(child)),
        }
    }

    /// Place several children as if [`Element::place`] was called for each in turn
    pub fn place_all(&mut self, children: Vec<Element>, order: DocumentOrder) {
        let nodes = children.into_iter().map(Node::Element);
        match order {
            DocumentOrder::Prepend => {
                let mut placed: Vec<Node> = nodes.rev().collect();
                placed.append(&mut self.children);
                self.children = placed;
            }
            DocumentOrder::Append => self.children.extend(nodes),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Remove the first direct child with the given name
    pub fn remove_child(&mut self, name: &str) -> Option<Element> {
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.name == name))?;
        match self.children.remove(pos) {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// First descendant with the given name, depth first in document order
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for child in self.children.iter_mut() {
            if let Node::Element(e) = child {
                if e.name == name {
                    return Some(e);
                }
                if let Some(found) = e.find_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All outermost descendants with the given name, in document order
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect(name, &mut out);
        out
    }

    fn collect<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == name {
                out.push(child);
            } else {
                child.collect(name, out);
            }
        }
    }

    pub fn find_all_mut(&mut self, name: &str) -> Vec<&mut Element> {
        let mut out = Vec::new();
        self.collect_mut(name, &mut out);
        out
    }

    fn collect_mut<'a>(&'a mut self, name: &str, out: &mut Vec<&'a mut Element>) {
        for child in self.children.iter_mut() {
            if let Node::Element(e) = child {
                if e.name == name {
                    out.push(e);
                } else {
                    e.collect_mut(name, out);
                }
            }
        }
    }

    /// Visit this element and every descendant element, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.child_elements() {
            child.walk(visit);
        }
    }
}

/// XML declaration of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Declaration {
    fn from_event(decl: &BytesDecl<'_>) -> Result<Self> {
        let utf8 = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
        Ok(Self {
            version: utf8(decl.version()?.as_ref()),
            encoding: decl.encoding().transpose()?.map(|e| utf8(e.as_ref())),
            standalone: decl.standalone().transpose()?.map(|s| utf8(s.as_ref())),
        })
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub declaration: Option<Declaration>,
    /// Comments and whitespace before the root element
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and whitespace after the root element
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parse a document from a string
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let node = match reader.read_event()? {
                Event::Decl(decl) => {
                    declaration = Some(Declaration::from_event(&decl)?);
                    continue;
                }
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                    continue;
                }
                Event::Empty(start) => Node::Element(element_from_start(&start)?),
                Event::End(_) => match stack.pop() {
                    Some(element) => Node::Element(element),
                    None => return Err(FibexError::Xml("unbalanced end tag".to_string())),
                },
                Event::Text(text) => Node::Text(text.unescape()?.into_owned()),
                Event::CData(data) => Node::CData(String::from_utf8_lossy(&data.into_inner()).into_owned()),
                Event::Comment(comment) => {
                    Node::Comment(String::from_utf8_lossy(&comment.into_inner()).into_owned())
                }
                Event::PI(pi) => Node::ProcessingInstruction(String::from_utf8_lossy(&pi.into_inner()).into_owned()),
                Event::DocType(doctype) => Node::DocType(String::from_utf8_lossy(&doctype.into_inner()).into_owned()),
                Event::Eof => break,
            };

            match (stack.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, Node::Element(element)) => {
                    if root.is_some() {
                        return Err(FibexError::Xml("more than one root element".to_string()));
                    }
                    root = Some(element);
                }
                (None, Node::Text(text)) if !text.trim().is_empty() => {
                    return Err(FibexError::Xml("text outside the root element".to_string()));
                }
                (None, node) => {
                    if root.is_some() {
                        epilog.push(node);
                    } else {
                        prolog.push(node);
                    }
                }
            }
        }

        if !stack.is_empty() {
            return Err(FibexError::Xml(format!("unclosed element <{}>", stack[stack.len() - 1].name)));
        }
        let root = root.ok_or_else(|| FibexError::Xml("document has no root element".to_string()))?;

        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the document as UTF-8 without added whitespace
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            let encoding = decl.encoding.as_deref().map(|enc| {
                if enc.eq_ignore_ascii_case("utf-8") || enc.eq_ignore_ascii_case("utf8") {
                    enc
                } else {
                    log::warn!("Template declares encoding {}, output is written as UTF-8", enc);
                    "UTF-8"
                }
            });
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                encoding,
                decl.standalone.as_deref(),
            )))?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        String::from_utf8(writer.into_inner()).map_err(|e| FibexError::Xml(e.to_string()))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element)?,
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(comment) => writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?,
        Node::ProcessingInstruction(pi) => writer.write_event(Event::PI(BytesText::from_escaped(pi.as_str())))?,
        Node::DocType(doctype) => writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?,
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?><!-- header --><root a="1"><x:item id="i1">one &amp; two</x:item><empty/><x:item id="i2"/></root>"#;

    #[test]
    fn test_parse_and_write_is_stable() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.name, "root");
        assert_eq!(doc.prolog, vec![Node::Comment(" header ".to_string())]);
        assert_eq!(doc.to_xml_string().unwrap(), SAMPLE);
    }

    #[test]
    fn test_processing_instructions_and_doctype_are_kept() {
        let text = r#"<?xml version="1.0"?><?xml-stylesheet href="a.xsl"?><!DOCTYPE root><root><?keep me?></root>"#;
        let doc = Document::parse(text).unwrap();
        assert_eq!(
            doc.prolog,
            vec![
                Node::ProcessingInstruction(r#"xml-stylesheet href="a.xsl""#.to_string()),
                Node::DocType("root".to_string()),
            ]
        );
        assert_eq!(doc.root.children, vec![Node::ProcessingInstruction("keep me".to_string())]);

        let written = doc.to_xml_string().unwrap();
        assert!(written.contains(r#"<?xml-stylesheet href="a.xsl"?>"#));
        assert!(written.contains("<!DOCTYPE root>"));
        assert!(written.contains("<root><?keep me?></root>"));
    }

    #[test]
    fn test_find_and_text() {
        let doc = Document::parse(SAMPLE).unwrap();
        let item = doc.root.find("x:item").unwrap();
        assert_eq!(item.attr("id"), Some("i1"));
        assert_eq!(item.text(), "one & two");
        assert_eq!(item.local_name(), "item");
        assert_eq!(doc.root.find_all("x:item").len(), 2);
        assert!(doc.root.find("missing").is_none());
    }

    #[test]
    fn test_place_order() {
        let mut parent = Element::new("p").with_child(Element::new("existing"));
        parent.place_all(vec![Element::new("a"), Element::new("b")], DocumentOrder::Prepend);
        let names: Vec<_> = parent.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "existing"]);

        let mut parent = Element::new("p").with_child(Element::new("existing"));
        parent.place_all(vec![Element::new("a"), Element::new("b")], DocumentOrder::Append);
        let names: Vec<_> = parent.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["existing", "a", "b"]);
    }

    #[test]
    fn test_find_all_mut_and_remove() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        for item in doc.root.find_all_mut("x:item") {
            item.set_attr("seen", "true");
        }
        assert!(doc.root.find_all("x:item").iter().all(|e| e.attr("seen") == Some("true")));

        assert!(doc.root.remove_child("empty").is_some());
        assert!(doc.root.remove_child("empty").is_none());
    }

    #[test]
    fn test_escaping_on_write() {
        let doc = Document {
            declaration: None,
            prolog: Vec::new(),
            root: Element::new("r").with_attr("v", "a<b").with_text("x & y"),
            epilog: Vec::new(),
        };
        assert_eq!(doc.to_xml_string().unwrap(), r#"<r v="a&lt;b">x &amp; y</r>"#);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(Document::parse("<a><b></a>").is_err());
        assert!(Document::parse("<a>").is_err());
        assert!(Document::parse("").is_err());
    }
}
