//! LLM integration layer.
//!
//! - [`types`] -- provider-agnostic messages, requests and responses.
//! - [`client`] -- HTTP client for the Anthropic and OpenAI APIs.

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmClientConfig, LlmProvider};
pub use types::{ChatRequest, LlmResponse, Message, Role, Usage};
