//! REST route templates, relative to the configured API base URL.
//!
//! Templates use axum-style `{param}` placeholders so a test server can
//! mount the same constants the client requests.

pub mod media {
    pub const LIST: &str = "/media";
    pub const ITEM: &str = "/media/{id}";
    pub const BATCH: &str = "/media/batch";
    pub const POPULAR: &str = "/media/popular";
    pub const NEW: &str = "/media/new";
}

pub mod collections {
    pub const LIST: &str = "/collections";
    pub const ITEM: &str = "/collections/{id}";
    pub const ITEMS: &str = "/collections/{id}/items";
    pub const ITEM_ENTRY: &str = "/collections/{id}/items/{media_id}";
    pub const REORDER: &str = "/collections/{id}/items/reorder";
}

pub mod watched {
    pub const LIST: &str = "/user/watched";
    pub const ITEM: &str = "/user/watched/{id}";
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a path parameter (e.g. `"{id}"`) with the percent-encoded value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, &urlencoding::encode(value.as_ref()))
    }

    /// Replace multiple path parameters in order.
    pub fn replace_params(
        route: &str,
        params: &[(&str, &str)],
    ) -> String {
        params.iter().fold(route.to_string(), |path, (param, value)| {
            replace_param(&path, param, value)
        })
    }

    /// Append percent-encoded query parameters to the route.
    pub fn with_query(route: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return route.to_string();
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{route}?{query}")
    }
}
