pub mod llm;
pub mod store;

pub use llm::OpenAiGenerationAdapter;
pub use store::SqliteLedgerAdapter;
