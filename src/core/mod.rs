//! core
//!
//! Small domain types shared by every layer.
//!
//! # Modules
//!
//! - [`boolean`] - Coercion of loose boolean literals
//! - [`source`] - Classification of source descriptors
//! - [`types`] - Output formats, encodings and the output spec
//! - [`config`] - Configuration schema and loading

pub mod boolean;
pub mod config;
pub mod source;
pub mod types;
