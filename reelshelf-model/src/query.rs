use crate::media::MediaItem;
use crate::media_type::MediaType;

/// Inclusive range used by catalog filters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarRange<T> {
    pub min: T,
    pub max: T,
}

impl<T> ScalarRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> ScalarRange<T> {
    pub fn contains(&self, value: &T) -> bool {
        *value >= self.min && *value <= self.max
    }
}

/// Catalog search and filter parameters.
///
/// An empty query matches everything. The same query is sent to the catalog
/// service for remote search and can be applied locally with
/// [`MediaQuery::matches`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaQuery {
    pub search: Option<String>,
    pub media_type: Option<MediaType>,
    pub genres: Vec<String>,
    pub year_range: Option<ScalarRange<u16>>,
    pub rating_range: Option<ScalarRange<f32>>,
}

impl MediaQuery {
    pub fn is_empty(&self) -> bool {
        self.search_text().is_none()
            && self.media_type.is_none()
            && self.genres.is_empty()
            && self.year_range.is_none()
            && self.rating_range.is_none()
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Apply every filter to a single record.
    ///
    /// Title search is a case-insensitive substring match; genres match when
    /// the record carries any of the selected genres; ranges are inclusive.
    pub fn matches(&self, item: &MediaItem) -> bool {
        let matches_search = match self.search_text() {
            Some(text) => item
                .title
                .to_lowercase()
                .contains(&text.to_lowercase()),
            None => true,
        };

        let matches_genre = self.genres.is_empty()
            || item.genres.iter().any(|genre| self.genres.contains(genre));

        let matches_year = self
            .year_range
            .is_none_or(|range| range.contains(&item.year));

        let matches_rating = self
            .rating_range
            .is_none_or(|range| range.contains(&item.rating));

        let matches_type =
            self.media_type.is_none_or(|kind| kind == item.media_type);

        matches_search
            && matches_genre
            && matches_year
            && matches_rating
            && matches_type
    }
}
