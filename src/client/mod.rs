//! HTTP Client module for loghub.
//!
//! This module provides the HTTP client for communicating with a running
//! loghub controller.

pub mod api;

pub use api::LoghubClient;
