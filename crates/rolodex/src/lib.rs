//! `rolodex` - Phonebook and blog list record service
//!
//! This library provides the record types, the stores that keep them and the
//! HTTP API that serves them. Every request runs the same sequence: validate
//! the input, call the store, shape the response, map failures onto status
//! codes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod stats;
pub mod store;
pub mod validate;

pub use api::{router, serve, ApiError, AppState};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Blog, Person, Record, RecordId, Resource};
pub use store::{MemoryStore, RecordStore, SqliteStore};
