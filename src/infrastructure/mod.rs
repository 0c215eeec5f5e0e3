//! Infrastructure concerns: configuration and process bootstrap.

pub mod config;
