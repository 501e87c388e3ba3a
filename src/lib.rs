//! jsonld-cli - A command-line front end for JSON-LD processing
//!
//! `jsonld` reads JSON-LD documents from files, URLs or standard input,
//! runs one processing operation (format, compact, expand, flatten, frame,
//! normalize) and writes the result to standard output.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing, command dispatch and handlers
//! - [`core`] - Boolean coercion, source classification, output types, config
//! - [`input`] - Resolving source descriptors to parsed documents
//! - [`request`] - Assembling a processing request from command inputs
//! - [`processor`] - The JSON-LD processor seam and the bundled engine
//! - [`ui`] - Result serialization and failure reporting
//!
//! # Guarantees
//!
//! 1. Nothing is written to standard output once a command fails
//! 2. The processor is never called unless every source resolved
//! 3. A failed invocation exits with status 1 and an `ERROR:` diagnostic

pub mod cli;
pub mod core;
pub mod input;
pub mod processor;
pub mod request;
pub mod ui;
