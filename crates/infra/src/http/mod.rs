//! HTTP plumbing shared by the provider adapters and OAuth flows

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
