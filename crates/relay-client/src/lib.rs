//! # relay-client
//!
//! HTTP implementation of the `ChatApi` port defined in `relay-core`.

mod http_api;

pub use http_api::HttpChatApi;
