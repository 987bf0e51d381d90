//! Discussion domain.
//!
//! - [`event::StreamEvent`] — one event of a streaming operation
//! - [`reconciler::StreamReconciler`] — per-participant buffers for one operation
//! - [`transcript::Transcript`] — the append-only log of finalized messages

pub mod event;
pub mod reconciler;
pub mod transcript;
