//! AI-assisted content generation backed by Gemini, with mock fallbacks

pub mod extract;
pub mod gemini;
pub mod mocks;
pub mod prompts;
pub mod service;
pub mod types;

pub use gemini::{GeminiClient, TextGenerator};
pub use service::ContentService;
