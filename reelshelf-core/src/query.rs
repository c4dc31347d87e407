use reelshelf_model::{MediaItem, MediaQuery, MediaType, ScalarRange};

/// Fluent builder for catalog queries
#[derive(Debug, Clone, Default)]
pub struct MediaQueryBuilder {
    query: MediaQuery,
}

impl MediaQueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            query: MediaQuery::default(),
        }
    }

    // === Filter methods ===

    /// Filter to only show movies
    pub fn movies_only(mut self) -> Self {
        self.query.media_type = Some(MediaType::Movie);
        self
    }

    /// Filter to only show series
    pub fn series_only(mut self) -> Self {
        self.query.media_type = Some(MediaType::Series);
        self
    }

    pub fn media_type(mut self, media_type: Option<MediaType>) -> Self {
        self.query.media_type = media_type;
        self
    }

    /// Filter by genre
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        let genre = genre.into();
        if !self.query.genres.contains(&genre) {
            self.query.genres.push(genre);
        }
        self
    }

    /// Filter by multiple genres
    pub fn genres(mut self, genres: Vec<String>) -> Self {
        self.query.genres = genres;
        self
    }

    /// Filter by release year range (inclusive)
    pub fn year_range(mut self, start: u16, end: u16) -> Self {
        self.query.year_range = Some(ScalarRange::new(start, end));
        self
    }

    /// Filter by rating range (inclusive)
    pub fn rating_range(mut self, min: f32, max: f32) -> Self {
        self.query.rating_range = Some(ScalarRange::new(min, max));
        self
    }

    // === Search methods ===

    /// Add title search
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.query.search = Some(text.into());
        self
    }

    // === Build method ===

    /// Build the final query
    pub fn build(self) -> MediaQuery {
        self.query
    }
}

/// Apply `query` to an already fetched list, keeping the input order.
pub fn filter_media<'a>(
    items: impl IntoIterator<Item = &'a MediaItem>,
    query: &MediaQuery,
) -> Vec<MediaItem> {
    items
        .into_iter()
        .filter(|item| query.matches(item))
        .cloned()
        .collect()
}
