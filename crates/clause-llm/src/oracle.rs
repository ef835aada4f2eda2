//! Pluggable LLM oracle interface.
//!
//! The engine treats an LLM as an optional, last-resort collaborator (§1):
//! it is never required to reach a verdict, and a failing or absent oracle
//! must never fail the job. Any concrete integration (a hosted API, a local
//! model server) lives behind this trait, outside this workspace's
//! Non-goals around network stacks.

use clause_core::{AdviceCode, Confidence};

use crate::error::LlmResult;

/// One verdict returned by an oracle for a single clause.
#[derive(Debug, Clone)]
pub struct LlmVerdict {
    pub advice_code: AdviceCode,
    pub confidence: Confidence,
    pub reason: String,
}

/// A last-resort classifier an orchestrator phase may consult when nothing
/// else in the waterfall (4.I) produced a verdict.
///
/// `Ok(None)` means the oracle had no opinion (not an error); callers treat
/// that exactly like `Err` for control flow — fall through to the next
/// strategy — but it is reported differently in logs.
pub trait LlmOracle: Send + Sync {
    fn classify(&self, clause_text: &str, context_hint: &str) -> LlmResult<Option<LlmVerdict>>;

    /// Human-readable identity for logging/diagnostics (§5).
    fn name(&self) -> &str;
}

/// Always declines. The default oracle when none is configured, so the
/// orchestrator's last-resort step is a no-op rather than a special case.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOracle;

impl LlmOracle for NoopOracle {
    fn classify(&self, _clause_text: &str, _context_hint: &str) -> LlmResult<Option<LlmVerdict>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_oracle_never_opines() {
        let oracle = NoopOracle;
        let verdict = oracle.classify("tekst", "context").unwrap();
        assert!(verdict.is_none());
    }
}
