use std::fmt::Display;

use crate::{xml::Element, PlayerError};

/// A song found in one of the player's catalogs
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub year: i16,
    /// Length in seconds
    pub duration: f32,
}

impl CatalogEntry {
    /// Parses the songs of a `search` or `getList` response
    pub fn parse_list(xml: &str) -> Result<Vec<Self>, PlayerError> {
        let root = Element::parse(xml)?;
        let mut items = vec![];

        if root.name == "item" {
            items.push(&root);
        }

        root.find_all("item", &mut items);
        items.into_iter().map(Self::from_element).collect()
    }

    fn from_element(element: &Element) -> Result<Self, PlayerError> {
        let id = element
            .attribute_number("id")?
            .ok_or_else(|| PlayerError::MalformedResponse("song without id".to_string()))?;

        Ok(Self {
            id,
            title: element.child_text("title").unwrap_or_default().to_string(),
            artist: element.child_text("artist").unwrap_or_default().to_string(),
            year: element.child_number("year")?.unwrap_or_default(),
            duration: element.child_seconds("duration")?.unwrap_or_default(),
        })
    }
}

impl Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seconds = self.duration.max(0.) as u32;

        write!(
            f,
            "{} - {} | {} {}:{:02}",
            self.artist,
            self.title,
            self.year,
            seconds / 60,
            seconds % 60
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    OnlineComplete,
    OnlineNews,
    OnlineFavorites,
    OnlineStyle,
    LocalPlaylist,
    LocalDirectory,
    Unknown,
}

impl CatalogKind {
    fn from_attribute(value: &str) -> Self {
        match value {
            "onlineComplete" => Self::OnlineComplete,
            "onlineNews" => Self::OnlineNews,
            "onlineFavorites" => Self::OnlineFavorites,
            "onlineStyle" => Self::OnlineStyle,
            "localPlaylist" => Self::LocalPlaylist,
            "localDirectory" => Self::LocalDirectory,
            _ => Self::Unknown,
        }
    }
}

/// A list of songs the player offers, usable with `getList`
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub id: u32,
    pub kind: CatalogKind,
    pub caption: String,
}

impl Catalog {
    /// Parses a `getCatalogList` response
    pub fn parse_list(xml: &str) -> Result<Vec<Self>, PlayerError> {
        let root = Element::parse(xml)?;
        let mut catalogs = vec![];

        root.find_all("catalog", &mut catalogs);
        catalogs.into_iter().map(Self::from_element).collect()
    }

    fn from_element(element: &Element) -> Result<Self, PlayerError> {
        let id = element
            .attribute_number("id")?
            .ok_or_else(|| PlayerError::MalformedResponse("catalog without id".to_string()))?;

        Ok(Self {
            id,
            kind: element
                .attribute("type")
                .map(CatalogKind::from_attribute)
                .unwrap_or(CatalogKind::Unknown),
            caption: element.text.clone(),
        })
    }
}

impl Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}) {} ({:?})", self.id, self.caption, self.kind)
    }
}

#[cfg(test)]
mod test {
    use super::{Catalog, CatalogEntry, CatalogKind};

    #[test]
    fn parses_search_results() {
        let xml = r#"<list total="2">
            <item id="1234"><title>Waterloo</title><artist>ABBA</artist><year>1974</year><duration>164</duration></item>
            <item id="98"><title>Toxic</title><artist>Britney Spears</artist><year>2003</year><duration>201.3</duration></item>
        </list>"#;

        let entries = CatalogEntry::parse_list(xml).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 1234);
        assert_eq!(entries[0].to_string(), "ABBA - Waterloo | 1974 2:44");
        assert_eq!(entries[1].to_string(), "Britney Spears - Toxic | 2003 3:21");
    }

    #[test]
    fn endless_durations_are_dropped() {
        let xml = r#"<list><item id="3"><title>Live</title><artist>Radio</artist><duration>inf</duration></item></list>"#;

        let entries = CatalogEntry::parse_list(xml).unwrap();
        assert_eq!(entries[0].duration, 0.);
    }

    #[test]
    fn empty_results() {
        assert!(CatalogEntry::parse_list("<list/>").unwrap().is_empty());
    }

    #[test]
    fn parses_catalogs() {
        let xml = r#"<catalogList>
            <catalog id="1" type="onlineComplete">Everything</catalog>
            <catalog id="7" type="localDirectory">My songs</catalog>
            <catalog id="9" type="somethingNew">Mystery</catalog>
        </catalogList>"#;

        let catalogs = Catalog::parse_list(xml).unwrap();

        assert_eq!(catalogs.len(), 3);
        assert_eq!(catalogs[0].kind, CatalogKind::OnlineComplete);
        assert_eq!(catalogs[1].to_string(), "7) My songs (LocalDirectory)");
        assert_eq!(catalogs[2].kind, CatalogKind::Unknown);
    }
}
