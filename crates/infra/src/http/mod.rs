//! HTTP client facade

pub mod client;

pub use client::{decode_json, ApiRequest, HttpClient, HttpClientBuilder, RequestBody};
