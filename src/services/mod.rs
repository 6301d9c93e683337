pub mod ai;
pub mod database;
pub mod openai; // OpenAI-compatible chat completions

pub use ai::AiBackend;
pub use database::Database;
pub use openai::OpenAiClient;
