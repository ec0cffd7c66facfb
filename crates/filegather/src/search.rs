//! Search execution.
//!
//! This module provides:
//! - The synchronous traversal engine
//! - A handle that runs the engine on a background thread

mod engine;
mod handle;


pub use engine::SearchEngine;
pub use handle::SearchHandle;
