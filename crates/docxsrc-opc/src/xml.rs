//! Markup element model
//!
//! Parts that carry XML are parsed into a small, immutable element tree with
//! resolved namespaces. Elements are shared through [`Arc`] so that views
//! over the tree (the inspector nodes, code generators) can hold on to a
//! subtree without borrowing the whole package.

use std::fmt;
use std::sync::Arc;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OpcError, Result};
use crate::schema::{self, ElementClass};

/// Namespace bound to the reserved `xml` prefix
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of `xmlns` declarations
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// Type name reported for elements missing from the schema tables
pub const UNKNOWN_ELEMENT_TYPE: &str = "OpenXmlUnknownElement";

/// A prefixed or unprefixed XML name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix, if any
    pub prefix: Option<String>,
    /// Local part
    pub local: String,
}

impl QName {
    /// Split a raw `prefix:local` name
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An attribute with its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written
    pub name: QName,
    /// Resolved namespace (unprefixed attributes have none)
    pub namespace: Option<String>,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Check whether this attribute is an `xmlns` / `xmlns:p` declaration
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NS)
    }

    /// Prefix declared by this attribute: `Some(None)` for `xmlns`,
    /// `Some(Some(p))` for `xmlns:p`, `None` if not a declaration
    pub fn declared_prefix(&self) -> Option<Option<&str>> {
        if !self.is_namespace_declaration() {
            return None;
        }
        match &self.name.prefix {
            Some(_) => Some(Some(self.name.local.as_str())),
            None => Some(None),
        }
    }
}

/// Content of an element, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A child element
    Element(Arc<Element>),
    /// Character data (unescaped)
    Text(String),
    /// A CDATA section
    CData(String),
    /// A comment
    Comment(String),
}

/// A parsed markup element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: QName,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    children: Vec<Content>,
}

impl Element {
    /// Name as written
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Namespace prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.prefix.as_deref()
    }

    /// Local name
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Resolved namespace URI
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// All attributes in document order, including namespace declarations
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attributes that are not namespace declarations
    pub fn plain_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| !a.is_namespace_declaration())
    }

    /// Namespace declarations made on this element, as (prefix, uri)
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.attributes
            .iter()
            .filter_map(|a| a.declared_prefix().map(|p| (p, a.value.as_str())))
    }

    /// Value of an attribute matched by local name
    ///
    /// Unprefixed attributes are preferred; namespaced attributes with the
    /// same local name (`w:val`) match when no unprefixed one exists.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        let mut candidates = self
            .plain_attributes()
            .filter(|a| a.name.local == local);
        let first = candidates.next()?;
        if first.namespace.is_none() {
            return Some(&first.value);
        }
        candidates
            .find(|a| a.namespace.is_none())
            .or(Some(first))
            .map(|a| a.value.as_str())
    }

    /// Value of an attribute matched by namespace and local name
    pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.plain_attributes()
            .find(|a| a.name.local == local && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }

    /// All content in document order
    pub fn children(&self) -> &[Content] {
        &self.children
    }

    /// Direct child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Arc<Element>> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Check whether any direct content is text or CDATA
    pub fn has_text(&self) -> bool {
        self.children
            .iter()
            .any(|c| matches!(c, Content::Text(_) | Content::CData(_)))
    }

    /// Check whether all direct content is text or CDATA
    pub fn has_only_text(&self) -> bool {
        !self.children.is_empty()
            && self
                .children
                .iter()
                .all(|c| matches!(c, Content::Text(_) | Content::CData(_)))
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Content::Text(t) | Content::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }

    /// Schema class of this element, when known
    pub fn class(&self) -> Option<&'static ElementClass> {
        schema::element_class(self.namespace_uri()?, self.local_name())
    }

    /// Concrete type name (`Paragraph`, `Row`, `OpenXmlUnknownElement`)
    pub fn type_name(&self) -> &'static str {
        self.class().map_or(UNKNOWN_ELEMENT_TYPE, |c| c.name)
    }

    /// Value of the `xml:space` attribute on this element
    pub fn xml_space(&self) -> Option<&str> {
        self.attribute_ns(XML_NS, "space")
    }

    /// Merge adjacent text runs and drop empty ones, recursively
    pub fn normalize(&mut self) {
        let mut merged: Vec<Content> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            match child {
                Content::Text(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(Content::Text(prev)) = merged.last_mut() {
                        prev.push_str(&text);
                    } else {
                        merged.push(Content::Text(text));
                    }
                }
                Content::Element(mut element) => {
                    Arc::make_mut(&mut element).normalize();
                    merged.push(Content::Element(element));
                }
                other => merged.push(other),
            }
        }
        self.children = merged;
    }

    /// Serialize this element and its subtree compactly
    ///
    /// Namespace bindings the subtree uses but does not declare itself are
    /// declared on the start tag, so the result parses standalone.
    pub fn outer_xml(&self) -> String {
        let mut inherited = Vec::new();
        collect_inherited_namespaces(self, &mut Vec::new(), &mut inherited);

        let mut out = String::new();
        write_compact(&mut out, self, &inherited);
        out
    }

    /// Serialize the content of this element compactly
    ///
    /// Unlike [`Element::outer_xml`], no namespace declarations are added.
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_content(&mut out, child);
        }
        out
    }
}

/// Options for [`parse`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Keep whitespace-only text everywhere, not only in
    /// `xml:space="preserve"` scopes
    pub preserve_whitespace: bool,
}

/// Parse XML bytes into their root element
///
/// The XML declaration, doctype, processing instructions and any content
/// outside the root element are skipped. Whitespace-only text is dropped
/// unless [`ParseOptions::preserve_whitespace`] is set or the text sits in
/// an `xml:space="preserve"` scope.
pub fn parse(xml: &[u8], options: ParseOptions) -> Result<Element> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut scope: Vec<(Option<String>, String)> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let open = open_element(e, &mut scope, stack.last())?;
                if stack.is_empty() && root.is_some() {
                    return Err(OpcError::InvalidStructure(
                        "multiple root elements".to_string(),
                    ));
                }
                stack.push(open);
            }
            Event::Empty(ref e) => {
                let open = open_element(e, &mut scope, stack.last())?;
                let element = open.close(&mut scope);
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let open = stack.pop().ok_or_else(|| {
                    OpcError::InvalidStructure("unexpected end tag".to_string())
                })?;
                let element = open.close(&mut scope);
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(ref e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape().map_err(quick_xml::Error::from)?;
                    let keep = options.preserve_whitespace
                        || current.preserve
                        || !is_xml_whitespace(&text);
                    if keep {
                        current.children.push(Content::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(ref e) => {
                if let Some(current) = stack.last_mut() {
                    let data = String::from_utf8_lossy(e).into_owned();
                    current.children.push(Content::CData(data));
                }
            }
            Event::Comment(ref e) => {
                if let Some(current) = stack.last_mut() {
                    let comment = String::from_utf8_lossy(e).into_owned();
                    current.children.push(Content::Comment(comment));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(OpcError::InvalidStructure(format!(
            "unclosed element <{}>",
            stack[stack.len() - 1].name
        )));
    }

    root.ok_or_else(|| OpcError::InvalidStructure("no root element".to_string()))
}

/// Escape character data for element content
pub fn escape_text(text: &str) -> std::borrow::Cow<'_, str> {
    partial_escape(text)
}

/// Escape an attribute value for a double-quoted attribute
///
/// Tabs and line breaks are written as character references so that they
/// survive attribute-value normalization when read back.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    out
}

/// Check whether text consists only of XML whitespace
pub fn is_xml_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// Element being built while its end tag has not been seen
struct OpenElement {
    name: QName,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    children: Vec<Content>,
    /// Namespace scope length to restore on close
    scope_len: usize,
    /// Inside an `xml:space="preserve"` scope
    preserve: bool,
}

impl OpenElement {
    fn close(self, scope: &mut Vec<(Option<String>, String)>) -> Element {
        scope.truncate(self.scope_len);
        Element {
            name: self.name,
            namespace: self.namespace,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

fn open_element(
    e: &BytesStart<'_>,
    scope: &mut Vec<(Option<String>, String)>,
    parent: Option<&OpenElement>,
) -> Result<OpenElement> {
    let name = QName::parse(&String::from_utf8_lossy(e.name().as_ref()));
    let scope_len = scope.len();

    let mut raw_attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let attr_name = QName::parse(&String::from_utf8_lossy(attr.key.as_ref()));
        let value = attr.unescape_value().map_err(quick_xml::Error::from)?.into_owned();

        if attr_name.prefix.as_deref() == Some("xmlns") {
            scope.push((Some(attr_name.local.clone()), value.clone()));
        } else if attr_name.prefix.is_none() && attr_name.local == "xmlns" {
            scope.push((None, value.clone()));
        }
        raw_attributes.push((attr_name, value));
    }

    let mut attributes = Vec::with_capacity(raw_attributes.len());
    let mut preserve = parent.map(|p| p.preserve).unwrap_or(false);
    for (attr_name, value) in raw_attributes {
        let namespace = match attr_name.prefix.as_deref() {
            Some("xmlns") => Some(XMLNS_NS.to_string()),
            None if attr_name.local == "xmlns" => Some(XMLNS_NS.to_string()),
            None => None,
            Some(prefix) => Some(resolve_prefix(scope, Some(prefix))?),
        };
        if namespace.as_deref() == Some(XML_NS) && attr_name.local == "space" {
            preserve = value == "preserve";
        }
        attributes.push(Attribute {
            name: attr_name,
            namespace,
            value,
        });
    }

    let namespace = match name.prefix.as_deref() {
        Some(prefix) => Some(resolve_prefix(scope, Some(prefix))?),
        None => resolve_prefix(scope, None).ok().filter(|uri| !uri.is_empty()),
    };

    Ok(OpenElement {
        name,
        namespace,
        attributes,
        children: Vec::new(),
        scope_len,
        preserve,
    })
}

fn resolve_prefix(scope: &[(Option<String>, String)], prefix: Option<&str>) -> Result<String> {
    if prefix == Some("xml") {
        return Ok(XML_NS.to_string());
    }
    scope
        .iter()
        .rev()
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, uri)| uri.clone())
        .ok_or_else(|| match prefix {
            Some(p) => OpcError::InvalidStructure(format!("undeclared namespace prefix '{}'", p)),
            None => OpcError::InvalidStructure("no default namespace".to_string()),
        })
}

fn attach(stack: &mut [OpenElement], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Content::Element(Arc::new(element)));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(OpcError::InvalidStructure(
            "multiple root elements".to_string(),
        )),
    }
}

fn collect_inherited_namespaces(
    element: &Element,
    declared: &mut Vec<Option<String>>,
    out: &mut Vec<(Option<String>, String)>,
) {
    let mark = declared.len();
    declared.extend(
        element
            .namespace_declarations()
            .map(|(prefix, _)| prefix.map(str::to_string)),
    );

    let mut require = |prefix: Option<&str>, namespace: Option<&str>| {
        let Some(uri) = namespace else { return };
        if prefix == Some("xml") || uri == XMLNS_NS {
            return;
        }
        let bound_inside = declared.iter().any(|p| p.as_deref() == prefix);
        let recorded = out.iter().any(|(p, _)| p.as_deref() == prefix);
        if !bound_inside && !recorded {
            out.push((prefix.map(str::to_string), uri.to_string()));
        }
    };

    require(element.prefix(), element.namespace_uri());
    for attr in element.plain_attributes() {
        if attr.name.prefix.is_some() {
            require(attr.name.prefix.as_deref(), attr.namespace.as_deref());
        }
    }

    for child in element.child_elements() {
        collect_inherited_namespaces(child, declared, out);
    }
    declared.truncate(mark);
}

fn write_compact(out: &mut String, element: &Element, extra: &[(Option<String>, String)]) {
    out.push('<');
    out.push_str(&element.name.to_string());
    for (prefix, uri) in extra {
        match prefix {
            Some(p) => out.push_str(&format!(" xmlns:{}=\"{}\"", p, escape_attribute(uri))),
            None => out.push_str(&format!(" xmlns=\"{}\"", escape_attribute(uri))),
        }
    }
    for attr in &element.attributes {
        out.push_str(&format!(" {}=\"{}\"", attr.name, escape_attribute(&attr.value)));
    }

    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_content(out, child);
    }
    out.push_str("</");
    out.push_str(&element.name.to_string());
    out.push('>');
}

fn write_content(out: &mut String, content: &Content) {
    match content {
        Content::Element(e) => write_compact(out, e, &[]),
        Content::Text(t) => out.push_str(&escape_text(t)),
        Content::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        Content::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn parse_str(xml: &str) -> Element {
        parse(xml.as_bytes(), ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let root = parse_str(&format!(
            r#"<?xml version="1.0"?><w:document xmlns:w="{W}"><w:body><w:p w:rsidR="00AB"/></w:body></w:document>"#
        ));

        assert_eq!(root.local_name(), "document");
        assert_eq!(root.prefix(), Some("w"));
        assert_eq!(root.namespace_uri(), Some(W));

        let body = root.child_elements().next().unwrap();
        let p = body.child_elements().next().unwrap();
        assert_eq!(p.namespace_uri(), Some(W));
        assert_eq!(p.attribute_ns(W, "rsidR"), Some("00AB"));
        assert_eq!(p.attribute("rsidR"), Some("00AB"));
    }

    #[test]
    fn test_parse_default_namespace() {
        let root = parse_str(r#"<worksheet xmlns="urn:x"><sheetData/></worksheet>"#);
        let child = root.child_elements().next().unwrap();
        assert_eq!(child.prefix(), None);
        assert_eq!(child.namespace_uri(), Some("urn:x"));
    }

    #[test]
    fn test_parse_undeclared_prefix_fails() {
        let result = parse(b"<w:document/>", ParseOptions::default());
        assert!(matches!(result, Err(OpcError::InvalidStructure(_))));
    }

    #[test]
    fn test_parse_mismatched_end_fails() {
        let result = parse(b"<a><b></a></b>", ParseOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unclosed_fails() {
        let result = parse(b"<a><b>", ParseOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_whitespace_dropped_outside_preserve_scope() {
        let root = parse_str("<a>\n  <b> </b>\n  <c xml:space=\"preserve\"> </c>\n</a>");
        assert_eq!(root.children().len(), 2);

        let mut elements = root.child_elements();
        let b = elements.next().unwrap();
        assert!(b.children().is_empty());
        let c = elements.next().unwrap();
        assert_eq!(c.text(), " ");
    }

    #[test]
    fn test_whitespace_kept_when_requested() {
        let root = parse(
            b"<a>\n  <b/>\n</a>",
            ParseOptions {
                preserve_whitespace: true,
            },
        )
        .unwrap();
        assert_eq!(root.children().len(), 3);
    }

    #[test]
    fn test_text_is_unescaped() {
        let root = parse_str("<t>a &amp; b &lt; c</t>");
        assert_eq!(root.text(), "a & b < c");
        assert!(root.has_only_text());
    }

    #[test]
    fn test_namespace_declarations() {
        let root = parse_str(r#"<a xmlns="urn:d" xmlns:x="urn:x" x:k="v"/>"#);
        let decls: Vec<_> = root.namespace_declarations().collect();
        assert_eq!(decls, vec![(None, "urn:d"), (Some("x"), "urn:x")]);
        assert_eq!(root.plain_attributes().count(), 1);
    }

    #[test]
    fn test_outer_xml_adds_inherited_namespaces() {
        let root = parse_str(&format!(
            r#"<w:document xmlns:w="{W}"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:body></w:document>"#
        ));
        let body = root.child_elements().next().unwrap();
        let p = body.child_elements().next().unwrap();

        assert_eq!(
            p.outer_xml(),
            format!(r#"<w:p xmlns:w="{W}"><w:r><w:t>Hi</w:t></w:r></w:p>"#)
        );
    }

    #[test]
    fn test_outer_xml_does_not_redeclare() {
        let root = parse_str(r#"<a xmlns:x="urn:x"><x:b xmlns:x="urn:other"><x:c/></x:b></a>"#);
        let b = root.child_elements().next().unwrap();
        assert_eq!(b.outer_xml(), r#"<x:b xmlns:x="urn:other"><x:c /></x:b>"#);
    }

    #[test]
    fn test_outer_xml_round_trips_through_parse() {
        let root = parse_str(r#"<a xmlns="urn:d"><b k="1 &amp; 2">x &gt; y</b><!--note--></a>"#);
        let b = root.child_elements().next().unwrap();
        let reparsed = parse_str(&b.outer_xml());

        assert_eq!(reparsed.namespace_uri(), Some("urn:d"));
        assert_eq!(reparsed.attribute("k"), Some("1 & 2"));
        assert_eq!(reparsed.text(), "x > y");
    }

    #[test]
    fn test_inner_xml() {
        let root = parse_str("<a>one<b/>two</a>");
        assert_eq!(root.inner_xml(), "one<b />two");
    }

    #[test]
    fn test_normalize_merges_adjacent_text() {
        let mut root = parse_str("<a>one<!--x-->two</a>");
        // Drop the comment to leave two adjacent runs behind
        root.children.retain(|c| !matches!(c, Content::Comment(_)));
        root.children.push(Content::Text(String::new()));
        root.normalize();

        assert_eq!(root.children(), &[Content::Text("onetwo".to_string())]);
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute("a\"b<c>&\n\t"),
            "a&quot;b&lt;c&gt;&amp;&#10;&#9;"
        );
    }

    #[test]
    fn test_type_name_fallback() {
        let root = parse_str(r#"<x:thing xmlns:x="urn:nobody"/>"#);
        assert_eq!(root.type_name(), UNKNOWN_ELEMENT_TYPE);
    }
}
