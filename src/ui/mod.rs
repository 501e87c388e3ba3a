//! ui
//!
//! Everything the user sees.
//!
//! # Modules
//!
//! - [`output`] - Result writing and failure reporting
//!
//! # Design
//!
//! Results go to stdout and diagnostics to stderr, both through this
//! module. Debug logging is separate and handled by `tracing`.

pub mod output;
