// Infra implementations of the moderation ports: the hosted moderations
// API client and the decision log stores.

pub mod in_memory_log_store;
pub mod openai_oracle;
pub mod sqlite_log_store;

pub use in_memory_log_store::InMemoryModerationLogStore;
pub use openai_oracle::OpenAiModerationClient;
pub use sqlite_log_store::SqliteModerationLogStore;
