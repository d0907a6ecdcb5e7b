//! # Assetman
//!
//! A self-hostable asset management backend: assets with depreciation and
//! maintenance schedules, submissions against assets, derived maintenance
//! notifications and the reference data around them. Usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! assetman = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use assetman::auth::JwtService;
//! use assetman::mail::MailQueue;
//! use assetman::server::{AppState, create_router};
//! use assetman::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/assetman.db").unwrap();
//! store.initialize().unwrap();
//!
//! let (mail, _rx) = MailQueue::channel();
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     JwtService::new("change-me"),
//!     mail,
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `assetman` binary. Disable with
//!   `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod files;
pub mod jobs;
pub mod lifecycle;
pub mod mail;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
