use crate::ids::MediaId;
use crate::media_type::MediaType;

/// Full catalog record for a movie or series.
///
/// The client never mutates these; they are fetched from the media
/// directory and embedded into hydrated collections as-is.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaItem {
    pub id: MediaId,
    pub title: String,
    /// Poster image reference (URL or path understood by the image layer)
    pub poster: String,
    pub year: u16,
    pub rating: f32,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub media_type: MediaType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub genres: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

impl MediaItem {
    pub fn is_movie(&self) -> bool {
        self.media_type == MediaType::Movie
    }

    pub fn is_series(&self) -> bool {
        self.media_type == MediaType::Series
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}
