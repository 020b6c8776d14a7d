//! Minimal element tree built from quick-xml events.
//!
//! Names are stored without namespace prefixes, so `tei:placeName` and
//! `placeName` are looked up the same way, as are `schema:latitude` and
//! `latitude`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, node: XmlNode) {
        // Adjacent text (e.g. split around an entity) is merged into one node
        if let (XmlNode::Text(new), Some(XmlNode::Text(last))) = (&node, self.children.last_mut()) {
            last.push_str(new);
            return;
        }
        self.children.push(node);
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }

    /// All elements named `name` in document order, including `self`.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            if let XmlNode::Element(element) = child {
                element.collect_named(name, found);
            }
        }
    }

    /// First element named `name` in document order.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            XmlNode::Element(element) => element.find(name),
            XmlNode::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlElement {
        let mut inner = XmlElement::new("hi", vec![]);
        inner.push_child(XmlNode::Text("Rom".to_string()));
        let mut place = XmlElement::new(
            "placeName",
            vec![("ref".to_string(), "tgn/7000874".to_string())],
        );
        place.push_child(XmlNode::Element(inner));
        place.push_child(XmlNode::Text("e".to_string()));

        let mut root = XmlElement::new("TEI", vec![]);
        root.push_child(XmlNode::Text("in ".to_string()));
        root.push_child(XmlNode::Element(place));
        root
    }

    #[test]
    fn text_includes_nested_elements() {
        let root = sample();
        assert_eq!(root.text(), "in Rome");
        assert_eq!(root.find("placeName").unwrap().text(), "Rome");
    }

    #[test]
    fn attr_lookup() {
        let root = sample();
        let place = root.find("placeName").unwrap();
        assert_eq!(place.attr("ref"), Some("tgn/7000874"));
        assert_eq!(place.attr("key"), None);
    }

    #[test]
    fn adjacent_text_is_merged() {
        let mut element = XmlElement::new("p", vec![]);
        element.push_child(XmlNode::Text("a".to_string()));
        element.push_child(XmlNode::Text("b".to_string()));
        assert_eq!(element.children().len(), 1);
    }

    #[test]
    fn descendants_include_self_and_keep_order() {
        let mut root = XmlElement::new("date", vec![("n".to_string(), "0".to_string())]);
        let mut child = XmlElement::new("date", vec![("n".to_string(), "1".to_string())]);
        child.push_child(XmlNode::Element(XmlElement::new(
            "date",
            vec![("n".to_string(), "2".to_string())],
        )));
        root.push_child(XmlNode::Element(child));

        let found: Vec<_> = root
            .descendants("date")
            .iter()
            .map(|e| e.attr("n").unwrap())
            .collect();
        assert_eq!(found, vec!["0", "1", "2"]);
    }
}
