//! Streaming XML record reader using quick-xml
//!
//! Trace exports put their records as direct children of a few container
//! elements (`<Events>`, `<processlist>`, `<eventlist>`). [`RecordStream`]
//! walks the file once and materializes one record subtree at a time, so
//! multi-million-record event lists never sit in memory together.

use std::io::BufRead;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One element of a record subtree, namespace prefixes stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content; `None` for empty elements
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.with_context(|| format!("bad attribute on <{name}>"))?;
            let key = attr.key;
            if key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let key = String::from_utf8_lossy(key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: None,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Read the rest of the element opened by `start`, including descendants.
pub fn read_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::from_start(start)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let child = read_element(reader, &e)?;
                element.children.push(child);
            }
            Event::Empty(e) => element.children.push(Element::from_start(&e)?),
            Event::Text(t) => element.push_text(&t.unescape()?),
            Event::CData(c) => element.push_text(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(_) => break,
            Event::Eof => bail!("unexpected end of file inside <{}>", element.name),
            _ => {}
        }
        buf.clear();
    }

    // Leaf text is kept verbatim; between child elements only content counts
    if !element.children.is_empty() {
        element.text = element
            .text
            .take()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
    }
    Ok(element)
}

/// Streaming XML reader over any buffered input
///
/// Text is not trimmed: leaf values reach the coercer exactly as written.
pub fn from_reader<R: BufRead>(input: R) -> Reader<R> {
    Reader::from_reader(input)
}

/// Streaming reader over in-memory XML
pub fn from_str(xml: &str) -> Reader<&[u8]> {
    Reader::from_str(xml)
}

/// One record: the container it came from plus its subtree
#[derive(Debug)]
pub struct Record {
    pub container: &'static str,
    pub element: Element,
}

/// Yields every direct child of the named container elements, in file order.
pub struct RecordStream<R> {
    reader: Reader<R>,
    containers: &'static [&'static str],
    seen: Vec<bool>,
    current: Option<usize>,
    buf: Vec<u8>,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(reader: Reader<R>, containers: &'static [&'static str]) -> Self {
        Self {
            reader,
            containers,
            seen: vec![false; containers.len()],
            current: None,
            buf: Vec::new(),
        }
    }

    /// Whether a container element with this name was encountered
    pub fn seen(&self, container: &str) -> bool {
        self.containers
            .iter()
            .zip(&self.seen)
            .any(|(name, seen)| *name == container && *seen)
    }

    /// Byte offset of the reader, for diagnostics
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Next record, or `None` at end of document.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            self.buf.clear();
            let position = self.reader.buffer_position();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .with_context(|| format!("XML parse error near byte {position}"))?;
            match event {
                Event::Start(e) => match self.current {
                    Some(idx) => {
                        let element = read_element(&mut self.reader, &e)?;
                        return Ok(Some(Record {
                            container: self.containers[idx],
                            element,
                        }));
                    }
                    None => {
                        if let Some(idx) = container_index(self.containers, &e) {
                            self.seen[idx] = true;
                            self.current = Some(idx);
                        }
                    }
                },
                Event::Empty(e) => match self.current {
                    Some(idx) => {
                        return Ok(Some(Record {
                            container: self.containers[idx],
                            element: Element::from_start(&e)?,
                        }));
                    }
                    None => {
                        if let Some(idx) = container_index(self.containers, &e) {
                            self.seen[idx] = true;
                        }
                    }
                },
                Event::End(_) if self.current.is_some() => self.current = None,
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

fn container_index(containers: &[&str], start: &BytesStart<'_>) -> Option<usize> {
    let name = start.local_name();
    containers.iter().position(|c| c.as_bytes() == name.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(xml: &str, containers: &'static [&'static str]) -> Vec<Record> {
        let mut stream = RecordStream::new(from_str(xml), containers);
        let mut out = Vec::new();
        while let Some(record) = stream.next_record().unwrap() {
            out.push(record);
        }
        out
    }

    #[test]
    fn yields_direct_children_of_containers() {
        let xml = r#"<?xml version="1.0"?>
<root>
  <header><item>skip</item></header>
  <list>
    <item id="1"><a>x</a></item>
    <item id="2"/>
  </list>
</root>"#;
        let recs = records(xml, &["list"]);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].element.attribute("id"), Some("1"));
        assert_eq!(recs[0].element.child("a").unwrap().text(), Some("x"));
        assert!(recs[1].element.children.is_empty());
        assert_eq!(recs[1].element.text, None);
    }

    #[test]
    fn tracks_multiple_containers_in_order() {
        let xml = "<procmon><processlist><process/><process/></processlist>\
                   <eventlist><event/></eventlist></procmon>";
        let recs = records(xml, &["processlist", "eventlist"]);
        let containers: Vec<&str> = recs.iter().map(|r| r.container).collect();
        assert_eq!(containers, vec!["processlist", "processlist", "eventlist"]);
    }

    #[test]
    fn strips_namespaces_and_unescapes() {
        let xml = r#"<e:Events xmlns:e="urn:x"><e:Event><e:Data Name="a">1 &lt; 2</e:Data><e:Raw><![CDATA[<b>]]></e:Raw></e:Event></e:Events>"#;
        let recs = records(xml, &["Events"]);
        let event = &recs[0].element;
        assert_eq!(event.name, "Event");
        let data = event.child("Data").unwrap();
        assert_eq!(data.attribute("Name"), Some("a"));
        assert_eq!(data.text(), Some("1 < 2"));
        assert_eq!(event.child("Raw").unwrap().text(), Some("<b>"));
    }

    #[test]
    fn default_namespace_declaration_is_not_an_attribute() {
        let xml = r#"<TraceData xmlns="http://tempuri.org/TracePersistence.xsd"><Events><Event name="x"/></Events></TraceData>"#;
        let recs = records(xml, &["Events"]);
        assert_eq!(
            recs[0].element.attributes,
            vec![("name".to_string(), "x".to_string())]
        );
    }

    #[test]
    fn leaf_text_keeps_surrounding_whitespace() {
        let xml = "<Events>\n  <Event>\n    <a>  select 1\n</a>\n    <b> </b>\n    <c></c>\n  </Event>\n</Events>";
        let recs = records(xml, &["Events"]);
        let event = &recs[0].element;
        assert_eq!(event.children.len(), 3);
        assert_eq!(event.text, None);
        assert_eq!(event.child("a").unwrap().text(), Some("  select 1\n"));
        assert_eq!(event.child("b").unwrap().text(), Some(" "));
        assert_eq!(event.child("c").unwrap().text(), None);
    }

    #[test]
    fn mixed_content_text_is_trimmed() {
        let xml = "<Events><Event>\n  note\n  <a>1</a>\n</Event></Events>";
        let recs = records(xml, &["Events"]);
        assert_eq!(recs[0].element.text(), Some("note"));
    }

    #[test]
    fn seen_reports_missing_containers() {
        let mut stream = RecordStream::new(from_str("<root><a/></root>"), &["Events"]);
        assert!(stream.next_record().unwrap().is_none());
        assert!(!stream.seen("Events"));
    }

    #[test]
    fn empty_container_is_seen() {
        let mut stream = RecordStream::new(from_str("<root><Events/></root>"), &["Events"]);
        assert!(stream.next_record().unwrap().is_none());
        assert!(stream.seen("Events"));
    }

    #[test]
    fn truncated_record_is_an_error() {
        let xml = "<root><Events><Event><Column>12";
        let mut stream = RecordStream::new(from_str(xml), &["Events"]);
        assert!(stream.next_record().is_err());
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        let xml = "<root><Events><Event><a></b></Event></Events></root>";
        let mut stream = RecordStream::new(from_str(xml), &["Events"]);
        assert!(stream.next_record().is_err());
    }
}
