//! rendergrid-runtime: render process launcher
//!
//! This crate starts external render subprocesses and hands back awaitable
//! handles:
//! - `RenderRuntime` / `RenderHandle` trait seam for the scheduler
//! - Process-based implementation using `tokio::process`

pub mod process;
pub mod traits;

pub use process::{ProcessRuntime, ProcessRuntimeConfig};
pub use traits::{ExitReport, RenderHandle, RenderRuntime};
