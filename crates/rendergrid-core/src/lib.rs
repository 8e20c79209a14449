//! rendergrid-core: Core types for the rendergrid batch scheduler
//!
//! This crate provides the fundamental types used throughout rendergrid:
//! - Render job model and plan expansion
//! - Configuration types
//! - Error handling
//! - GPU identifiers and memory snapshots

pub mod config;
pub mod error;
pub mod gpu;
pub mod job;

pub use config::*;
pub use error::*;
pub use gpu::*;
pub use job::*;
