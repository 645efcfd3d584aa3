// src/core/mod.rs

// The `core` module holds everything that does not depend on how the
// program is driven: the record model, the security.txt parser and the
// scanning machinery. The binary wires it to stdin and stdout.

/// Knobs of the HTTP client used for probing.
pub mod config;

/// Error types for every stage, from a single bad line to a fatal pool error.
pub mod errors;

/// The parsed security.txt record and the field identifiers it is keyed by.
pub mod models;

/// Candidate probing, redirect policy and the worker pool.
pub mod scanner;

/// Envelope decoding, line parsing and record building.
pub mod securitytxt;
