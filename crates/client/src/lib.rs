//! Libris Client - Everything between a page and the backend.
//!
//! This crate holds the presentation-independent half of the Libris client:
//!
//! - [`session`] - Credential persistence, identity decoding, login/logout
//! - [`guard`] - Route guards for authenticated and elevated pages
//! - [`gateway`] - Typed wrappers over every backend endpoint
//! - [`controllers`] - Per-page fetch and submission logic
//! - [`resource`] - Idle/loading/ready/failed state for fetched data
//! - [`storage`] - Durable key/value slots (`token`, `theme`)
//!
//! The web frontend and the CLI both build on these pieces; neither talks to
//! the backend directly.
//!
//! # Example
//!
//! ```no_run
//! use libris_client::{ClientConfig, Gateway, MemoryStorage, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let session = Session::new(MemoryStorage::new());
//! session.restore().await;
//!
//! let gateway = Gateway::new(&config)?.for_session(session.handle());
//! let books = gateway.list_ebooks(&Default::default()).await?;
//! println!("{} books", books.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod controllers;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod resource;
pub mod routes;
pub mod session;
pub mod storage;
pub mod theme;

pub use config::{ClientConfig, ConfigError};
pub use error::GatewayError;
pub use gateway::{CatalogQuery, Download, Gateway};
pub use guard::{Access, GuardDecision};
pub use resource::Resource;
pub use routes::Route;
pub use session::{Session, SessionError, SessionHandle, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use theme::Theme;
