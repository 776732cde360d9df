//! Search indexing and query services for a collaborative project hub.
//!
//! The hub stores heterogeneous documents (projects, their components,
//! registrations, user profiles, and free-form metadata records) in an
//! external search backend. This crate is the layer between the web
//! application and that backend: it translates the informal textual query
//! grammar into structured backend queries, keeps the index in step with
//! document lifecycle events, reconciles per-type result counts, and shapes
//! raw hits into a privacy-safe response.
//!
//! The backend itself is an external collaborator reached over HTTP through
//! [`search::ElasticClient`]. The client is constructed once at process start
//! and injected into each service; if the backend is unreachable at startup
//! the client degrades to a logged no-op so the rest of the application keeps
//! working without search.

pub mod config;
pub mod error;
pub mod models;
pub mod search;

pub use config::Config;
pub use error::{AppError, Result};
