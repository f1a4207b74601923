use std::str::FromStr;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::PlayerError;

/// A parsed XML element, small enough for the player's documents
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Parses a whole document and returns its root element
    pub fn parse(xml: &str) -> Result<Element, PlayerError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        PlayerError::MalformedResponse("unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = stack.last() {
            return Err(PlayerError::MalformedResponse(format!(
                "<{}> is never closed",
                unclosed.name
            )));
        }

        root.ok_or_else(|| PlayerError::MalformedResponse("empty document".to_string()))
    }

    fn from_start(start: &BytesStart) -> Result<Element, PlayerError> {
        let mut attributes = Vec::new();

        for attribute in start.attributes() {
            let attribute =
                attribute.map_err(|e| PlayerError::MalformedResponse(e.to_string()))?;

            attributes.push((
                String::from_utf8_lossy(attribute.key.as_ref()).to_string(),
                attribute.unescape_value()?.to_string(),
            ));
        }

        Ok(Element {
            name: String::from_utf8_lossy(start.name().as_ref()).to_string(),
            attributes,
            ..Default::default()
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The first direct child with this name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The first element with this name, searching depth first from this one
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }

        self.children.iter().find_map(|c| c.find(name))
    }

    /// Every element with this name below this one, in document order
    pub fn find_all<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }

            child.find_all(name, found);
        }
    }

    /// Text of a direct child, if the child exists and has any
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Parses the text of a direct child, if present
    pub fn child_number<T: FromStr>(&self, name: &str) -> Result<Option<T>, PlayerError> {
        self.child_text(name).map(|t| parse_number(name, t)).transpose()
    }

    /// Parses a child holding a time in seconds. Infinite, NaN or negative
    /// times count as missing.
    pub fn child_seconds(&self, name: &str) -> Result<Option<f32>, PlayerError> {
        let seconds: Option<f32> = self.child_number(name)?;
        Ok(seconds.filter(|s| s.is_finite() && *s >= 0.))
    }

    /// Parses an attribute, if present
    pub fn attribute_number<T: FromStr>(&self, key: &str) -> Result<Option<T>, PlayerError> {
        self.attribute(key).map(|t| parse_number(key, t)).transpose()
    }
}

fn parse_number<T: FromStr>(what: &str, text: &str) -> Result<T, PlayerError> {
    text.trim()
        .parse()
        .map_err(|_| PlayerError::MalformedResponse(format!("{} is not a number: {}", what, text)))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::PlayerError;

    use super::Element;

    #[test]
    fn unusable_seconds_are_missing() {
        let root = Element::parse(
            "<item><a>12.5</a><b>inf</b><c>NaN</c><d>-3</d><e>1e39</e></item>",
        )
        .unwrap();

        assert_eq!(root.child_seconds("a").unwrap(), Some(12.5));
        for name in ["b", "c", "d", "e", "missing"] {
            assert_eq!(root.child_seconds(name).unwrap(), None, "{}", name);
        }
    }

    #[test]
    fn parses_nested_elements() {
        let root = Element::parse(
            r#"<?xml version="1.0"?>
            <list><item id="3" kind="a &amp; b"><title>Tom &amp; Jerry</title></item><empty/></list>"#,
        )
        .unwrap();

        assert_eq!(root.name, "list");
        assert_eq!(root.children.len(), 2);

        let item = root.child("item").unwrap();
        assert_eq!(item.attribute("kind"), Some("a & b"));
        assert_eq!(item.attribute_number::<u32>("id").unwrap(), Some(3));
        assert_eq!(item.child_text("title"), Some("Tom & Jerry"));
        assert!(root.child("empty").is_some());
        assert!(root.find("title").is_some());
    }

    #[test]
    fn rejects_broken_documents() {
        for xml in ["", "<status>", "<a></b>", "not xml at all"] {
            assert!(
                matches!(Element::parse(xml), Err(PlayerError::MalformedResponse(_))),
                "accepted {:?}",
                xml
            );
        }
    }

    #[test]
    fn bad_numbers_are_malformed() {
        let root = Element::parse("<status><pitch>high</pitch></status>").unwrap();

        assert!(matches!(
            root.child_number::<i8>("pitch"),
            Err(PlayerError::MalformedResponse(_))
        ));
        assert_eq!(root.child_number::<i8>("tempo").unwrap(), None);
    }
}
