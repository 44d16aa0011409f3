//! Command-line client for the Career Evaluator HTTP API.

pub mod api_client;
