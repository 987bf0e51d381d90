//! HTTP adapters for the discussion backend.
//!
//! - [`HttpStreamingTransport`] — `text/event-stream` operations
//! - [`HttpBulkTransport`] — request/response fallback replayed as events
//! - [`HttpParticipantDirectory`] — participant discovery and prompt store

mod bulk;
mod client;
mod directory;
mod error;
pub mod sse;
mod streaming;
pub mod wire;

#[cfg(test)]
mod test_server;

pub use bulk::HttpBulkTransport;
pub use client::HttpBackend;
pub use directory::HttpParticipantDirectory;
pub use error::HttpError;
pub use streaming::HttpStreamingTransport;
