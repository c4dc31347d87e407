//! Contract implementations backed by [`ApiClient`](crate::ApiClient).

mod collections;
mod media;
mod watched;

pub use media::query_params;
