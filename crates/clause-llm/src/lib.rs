//! Pluggable LLM oracle interface for the clause analysis engine.
//!
//! The orchestrator (4.L) consults an [`LlmOracle`] only after the full
//! strategy waterfall (4.I) has run; [`NoopOracle`] is the default when no
//! real integration is configured, and [`MockOracle`] is provided for
//! deterministic test exercising.

pub mod error;
pub mod mock;
pub mod oracle;

pub use error::{LlmError, LlmResult};
pub use mock::MockOracle;
pub use oracle::{LlmOracle, LlmVerdict, NoopOracle};
