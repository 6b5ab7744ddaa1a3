//! wordbank-oracles — AI grading, writing assistant and dictionary clients.
//!
//! Chat backends ([`AnthropicChat`], [`OpenAiChat`]) sit behind the
//! [`ChatModel`] trait and are selected by model alias through a
//! [`ModelRouter`]. The oracle traits from `wordbank-core` are implemented
//! on top of them.

pub mod anthropic;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod dictionary;
pub mod grading;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicChat;
pub use assistant::AiAssistant;
pub use chat::{ChatModel, ChatRequest, ChatResponse, ModelRoute, ModelRouter};
pub use config::{load_config, load_config_from, WordbankConfig};
pub use dictionary::FreeDictionaryClient;
pub use grading::AiGrader;
pub use mock::MockChatModel;
pub use openai::OpenAiChat;
