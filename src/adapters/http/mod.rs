//! HTTP adapters exposing the service over REST.

pub mod issues_http;

pub use issues_http::{IssuesHttpConfig, IssuesHttpServer};
