//! Transactional document store for the order services.
//!
//! A narrow contract over some multi-document transactional store:
//! begin/commit/abort sessions, single-document insert, and subset-match
//! queries, parameterized by document type. [`InMemoryStore`] backs tests
//! and local runs; [`PostgresStore`] keeps documents in a JSONB table.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemorySession, InMemoryStore};
pub use postgres::{PostgresSession, PostgresStore};
pub use store::{Document, DocumentStore, Filter, Session};
