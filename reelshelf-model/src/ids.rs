use crate::error::ModelError;

/// Identifier of a media record in the catalog.
///
/// Opaque to the client: the catalog service assigns it and the client only
/// compares and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        MediaId(id.into())
    }

    pub fn from_string(id: String) -> Result<Self, ModelError> {
        if id.trim().is_empty() {
            return Err(ModelError::EmptyId("media"));
        }
        Ok(MediaId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for MediaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        MediaId(id.to_string())
    }
}

impl From<String> for MediaId {
    fn from(id: String) -> Self {
        MediaId(id)
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user collection. Assigned by the persistence service and
/// never reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        CollectionId(id.into())
    }

    pub fn from_string(id: String) -> Result<Self, ModelError> {
        if id.trim().is_empty() {
            return Err(ModelError::EmptyId("collection"));
        }
        Ok(CollectionId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CollectionId {
    fn from(id: &str) -> Self {
        CollectionId(id.to_string())
    }
}

impl From<String> for CollectionId {
    fn from(id: String) -> Self {
        CollectionId(id)
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_rejects_blank_ids() {
        assert_eq!(
            MediaId::from_string("  ".to_string()),
            Err(ModelError::EmptyId("media"))
        );
        assert_eq!(
            CollectionId::from_string(String::new()),
            Err(ModelError::EmptyId("collection"))
        );
        assert_eq!(
            MediaId::from_string("movie-1".to_string()).unwrap().as_str(),
            "movie-1"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&CollectionId::new("w")).unwrap();
        assert_eq!(json, "\"w\"");
        let id: MediaId = serde_json::from_str("\"movie-1\"").unwrap();
        assert_eq!(id, MediaId::new("movie-1"));
    }
}
