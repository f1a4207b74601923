use super::Selectable;

/// A song from the karaoke player's own catalog, identified by its database id
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSong {
    pub catalog_id: u32,
    pub artist: String,
    pub title: String,
    pub duration: Option<f32>,
}

impl CatalogSong {
    pub fn new(catalog_id: u32, artist: &str, title: &str, duration: Option<f32>) -> Self {
        Self {
            catalog_id,
            artist: artist.to_string(),
            title: title.to_string(),
            duration,
        }
    }

    /// Only used in tests.
    #[cfg(test)]
    pub fn mock(catalog_id: u32, artist: &str, title: &str) -> Self {
        Self::new(catalog_id, artist, title, Some(180.))
    }
}

impl Selectable for CatalogSong {
    fn song_id(&self) -> String {
        self.catalog_id.to_string()
    }

    fn title(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    fn duration(&self) -> Option<f32> {
        self.duration
    }

    fn source(&self) -> &'static str {
        "catalog"
    }
}
