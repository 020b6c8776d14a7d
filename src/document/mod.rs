//! Document Reader: loads a letter from disk and parses it into an element tree.

mod tree;

pub use tree::{XmlElement, XmlNode};

use crate::error::{PlacenameError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    source: String,
    root: XmlElement,
}

impl Document {
    /// Parse markup that has already been read. `path` is only used in errors.
    pub fn parse(path: impl Into<PathBuf>, source: String) -> Result<Self> {
        let path = path.into();
        let root = parse_tree(&source).map_err(|message| PlacenameError::Parse {
            path: path.clone(),
            message,
        })?;
        Ok(Self { path, source, root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// All elements named `name` in document order.
    pub fn elements(&self, name: &str) -> Vec<&XmlElement> {
        self.root.descendants(name)
    }

    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.root.find(name)
    }
}

/// Read `path` as UTF-8 and parse it.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    // read_to_string rejects invalid UTF-8 with ErrorKind::InvalidData
    let source = fs::read_to_string(path).map_err(|e| PlacenameError::io(path, e))?;
    debug!("Read {} bytes", source.len());
    Document::parse(path, source)
}

fn parse_tree(source: &str) -> std::result::Result<XmlElement, String> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    // Entities declared in the internal DTD subset
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} at byte {}", e, reader.buffer_position()))?;
        match event {
            Event::Start(start) => stack.push(element_from(&start, &entities)?),
            Event::Empty(start) => {
                let element = element_from(&start, &entities)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without matching opening tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape_with(|name| entities.get(name).map(String::as_str))
                    .map_err(|e| e.to_string())?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_child(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    parent.push_child(XmlNode::Text(text));
                }
            }
            Event::DocType(doctype) => {
                entities.extend(entity_declarations(&String::from_utf8_lossy(&doctype)));
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name()));
    }
    root.ok_or_else(|| "no root element".to_string())
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element <{}>", element.name())),
    }
    Ok(())
}

fn element_from(
    start: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> std::result::Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value_with(|name| entities.get(name).map(String::as_str))
            .map_err(|e| e.to_string())?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement::new(name, attributes))
}

/// Internal general entities of a doctype body, e.g.
/// `TEI [<!ENTITY uuml "&#252;">]`. Parameter and external entities are skipped.
fn entity_declarations(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = doctype;
    while let Some(start) = rest.find("<!ENTITY") {
        rest = rest[start + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(value_end) = rest[1..].find(quote) else {
            break;
        };
        let raw = &rest[1..1 + value_end];
        rest = &rest[1 + value_end + 1..];

        // Character references in the value are expanded at declaration time
        let value = quick_xml::escape::unescape(raw)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        if !name.is_empty() {
            entities.entry(name.to_string()).or_insert(value);
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LETTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <correspDesc>
      <correspAction type="received"><date when-iso="1875-03-10"/></correspAction>
      <correspAction type="sent"><date when-iso="1875-03-02">2 March 1875</date></correspAction>
    </correspDesc>
  </teiHeader>
  <text><body><p>Greetings from <placeName ref="tgn/7000874">Rome</placeName> &amp; beyond.</p></body></text>
</TEI>"#;

    #[test]
    fn parses_elements_and_attributes() {
        let doc = Document::parse("letter.xml", LETTER.to_string()).unwrap();
        assert_eq!(doc.root().name(), "TEI");
        let dates = doc.elements("date");
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[1].attr("when-iso"), Some("1875-03-02"));
        assert_eq!(dates[1].text(), "2 March 1875");
        assert_eq!(doc.find("placeName").unwrap().attr("ref"), Some("tgn/7000874"));
    }

    #[test]
    fn unescapes_entities() {
        let doc = Document::parse("letter.xml", LETTER.to_string()).unwrap();
        assert!(doc.find("p").unwrap().text().contains("& beyond"));
    }

    #[test]
    fn strips_namespace_prefixes() {
        let xml = r#"<rdf:RDF xmlns:rdf="r" xmlns:schema="s"><schema:latitude rdf:datatype="d">41.9</schema:latitude></rdf:RDF>"#;
        let doc = Document::parse("payload.rdf", xml.to_string()).unwrap();
        let lat = doc.find("latitude").unwrap();
        assert_eq!(lat.text(), "41.9");
        assert_eq!(lat.attr("datatype"), Some("d"));
        assert!(doc.root().attributes().is_empty());
    }

    #[test]
    fn resolves_entities_declared_in_doctype() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE TEI [
  <!ENTITY uuml "&#252;">
  <!ENTITY city 'Z&#252;rich'>
]>
<TEI><placeName ref="tgn/7007&uuml;">Z&uuml;rich</placeName><p>&city;</p></TEI>"#;
        let doc = Document::parse("letter.xml", xml.to_string()).unwrap();
        let place = doc.find("placeName").unwrap();
        assert_eq!(place.text(), "Zürich");
        assert_eq!(place.attr("ref"), Some("tgn/7007ü"));
        assert_eq!(doc.find("p").unwrap().text(), "Zürich");
    }

    #[test]
    fn undeclared_entity_is_parse_error() {
        let err = Document::parse("bad.xml", "<a>Z&uuml;rich</a>".to_string()).unwrap_err();
        assert!(matches!(err, PlacenameError::Parse { .. }), "{err}");
    }

    #[test]
    fn entity_declarations_skip_parameter_and_external_entities() {
        let entities = entity_declarations(
            r#"TEI [<!ENTITY % local SYSTEM "x.ent"> <!ENTITY logo SYSTEM "logo.png"> <!ENTITY amp2 "&amp;">]"#,
        );
        assert_eq!(entities.len(), 1);
        assert_eq!(entities.get("amp2").map(String::as_str), Some("&"));
    }

    #[test]
    fn cdata_is_text() {
        let doc = Document::parse("x.xml", "<a><![CDATA[1 < 2]]></a>".to_string()).unwrap();
        assert_eq!(doc.root().text(), "1 < 2");
    }

    #[test]
    fn mismatched_tags_are_parse_errors() {
        let err = Document::parse("bad.xml", "<a><b></a>".to_string()).unwrap_err();
        assert!(matches!(err, PlacenameError::Parse { .. }), "{err}");
    }

    #[test]
    fn unclosed_root_is_parse_error() {
        let err = Document::parse("bad.xml", "<a><b/>".to_string()).unwrap_err();
        assert!(matches!(err, PlacenameError::Parse { .. }), "{err}");
    }

    #[test]
    fn empty_input_is_parse_error() {
        let err = Document::parse("empty.xml", String::new()).unwrap_err();
        assert!(matches!(err, PlacenameError::Parse { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path().join("absent.xml")).unwrap_err();
        assert!(matches!(err, PlacenameError::Io { .. }), "{err}");
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.xml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"<a>Z\xfcrich</a>").unwrap();
        drop(file);

        let err = read_document(&path).unwrap_err();
        match err {
            PlacenameError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData)
            }
            other => panic!("expected I/O error, got {other}"),
        }
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.xml");
        fs::write(&path, LETTER).unwrap();
        let doc = read_document(&path).unwrap();
        assert_eq!(doc.path(), path.as_path());
        assert_eq!(doc.source(), LETTER);
    }
}
