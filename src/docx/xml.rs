//! Mutable XML element tree for WordprocessingML parts.
//!
//! Parts are read with the quick-xml event reader into an owned tree, edited in
//! place, and written back with the quick-xml writer. Namespace prefixes are
//! kept verbatim (`w:p`, `w:tbl`); lookups go by local name.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    /// Comments, CDATA and processing instructions, written back untouched.
    Raw(Event<'static>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name including the prefix, e.g. `w:tc`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// A parsed XML part: everything before the root element plus the root.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    prolog: Vec<Event<'static>>,
    pub root: XmlElement,
}

/// Local part of a qualified name (`w:tbl` -> `tbl`).
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }

    /// Child elements, skipping text and raw nodes.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.is(local))
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |element| element.is(local))
    }

    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|element| element.is(local))
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the child named `name`, inserting it as the first child if absent.
    ///
    /// Property containers (`w:pPr`, `w:rPr`, `w:tcPr`) must lead their parent.
    pub fn leading_child_mut(&mut self, name: &str) -> &mut XmlElement {
        let local = local_part(name);
        let index = match self.position_of(local) {
            Some(index) => index,
            None => {
                self.children
                    .insert(0, XmlNode::Element(XmlElement::new(name)));
                0
            }
        };
        self.element_at_mut(index)
    }

    /// Returns the child named `name`, inserting it where the schema sequence
    /// `order` puts it if absent. Children whose names are not listed in
    /// `order` never push the insertion point forward.
    pub fn ordered_child_mut(&mut self, name: &str, order: &[&str]) -> &mut XmlElement {
        let local = local_part(name);
        let index = match self.position_of(local) {
            Some(index) => index,
            None => {
                let rank = order.iter().position(|candidate| *candidate == local);
                let at = rank
                    .and_then(|rank| {
                        self.children.iter().position(|node| match node {
                            XmlNode::Element(element) => order
                                .iter()
                                .position(|candidate| *candidate == element.local_name())
                                .is_some_and(|other| other > rank),
                            _ => false,
                        })
                    })
                    .unwrap_or(self.children.len());
                self.children
                    .insert(at, XmlNode::Element(XmlElement::new(name)));
                at
            }
        };
        self.element_at_mut(index)
    }

    fn position_of(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(element) if element.is(local)))
    }

    fn element_at_mut(&mut self, index: usize) -> &mut XmlElement {
        match &mut self.children[index] {
            XmlNode::Element(element) => element,
            _ => unreachable!("index always points at an element node"),
        }
    }
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            prolog: vec![Event::Decl(quick_xml::events::BytesDecl::new(
                "1.0",
                Some("UTF-8"),
                Some("yes"),
            ))],
            root,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let xml = std::str::from_utf8(bytes).map_err(|err| err.to_string())?;
        let mut reader = Reader::from_str(xml);
        let mut prolog = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or("unexpected closing tag")?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape().map_err(|err| err.to_string())?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                        None if root.is_none() => {
                            prolog.push(Event::Text(BytesText::new(&text).into_owned()))
                        }
                        None => {}
                    }
                }
                Ok(Event::Eof) => break,
                Ok(other) => match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Raw(other.into_owned())),
                    None if root.is_none() => prolog.push(other.into_owned()),
                    None => {}
                },
                Err(err) => {
                    return Err(format!(
                        "error at position {}: {err}",
                        reader.buffer_position()
                    ))
                }
            }
        }

        if !stack.is_empty() {
            return Err(format!("unclosed element <{}>", stack[stack.len() - 1].name));
        }
        let root = root.ok_or("document has no root element")?;
        Ok(Self { prolog, root })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.prolog {
            emit(&mut writer, event.clone())?;
        }
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element <{}>", element.name)),
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|err| err.to_string())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => emit(writer, Event::Text(BytesText::new(text)))?,
            XmlNode::Raw(event) => emit(writer, event.clone())?,
        }
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}
