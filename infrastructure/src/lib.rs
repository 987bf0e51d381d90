//! Infrastructure layer for ai-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBackendConfig, FileConfig, FileDiscussionConfig,
    FileLoggingConfig, FileOutputConfig, FileRegistryConfig, TransportMode,
};
pub use http::{
    HttpBackend, HttpBulkTransport, HttpError, HttpParticipantDirectory, HttpStreamingTransport,
};
pub use logging::JsonlConversationLogger;
pub use store::JsonFileParticipantStore;
