//! HTTP client for the Reelshelf REST API.
//!
//! [`ApiClient`] implements every service contract from
//! `reelshelf-contracts`, so one client can back both stores:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reelshelf_client::{ApiClient, Config};
//! use reelshelf_core::CollectionStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load();
//! config.validate()?;
//!
//! let client = Arc::new(ApiClient::from_config(&config)?);
//! client.set_token(Some("access-token".into())).await;
//!
//! let store = CollectionStore::new(client.clone(), client);
//! store.refresh().await;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

pub mod api_client;
pub mod config;
pub mod routes;
pub mod services;

pub use api_client::ApiClient;
pub use config::{API_URL_ENV, Config, ConfigError};
pub use services::query_params;
