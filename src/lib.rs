// src/lib.rs

//! Discovers, parses and validates RFC 9116 `security.txt` files for a
//! stream of domains.

pub mod app;
pub mod core;
