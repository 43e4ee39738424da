pub mod domain;
pub mod error;
pub mod format;
pub mod policy;
pub mod ports;
pub mod sql;
pub mod translator;

pub use domain::{QueryOutput, SqlValue, TransactionRecord, TranslationResult};
pub use error::TranslateError;
pub use format::{format_answer, FormatError};
pub use policy::{QueryPolicy, DUE_SOON_HORIZON_DAYS, POLICY_VERSION};
pub use ports::{
    BackendError, BackendResult, GenerationBackend, LedgerStore, StoreError, StoreResult,
};
pub use translator::Translator;
