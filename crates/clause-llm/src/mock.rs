//! Deterministic mock oracle, for exercising the orchestrator's last-resort
//! step in tests without a real model integration.

use clause_core::{AdviceCode, Confidence};

use crate::error::LlmResult;
use crate::oracle::{LlmOracle, LlmVerdict};

/// Returns a fixed verdict whenever `clause_text` contains `trigger`,
/// otherwise declines. Useful for asserting that the orchestrator only
/// reaches the LLM step when the waterfall (4.I) exhausted itself.
pub struct MockOracle {
    trigger: String,
    verdict: LlmVerdict,
}

impl MockOracle {
    pub fn new(trigger: impl Into<String>, advice_code: AdviceCode, confidence: Confidence, reason: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            verdict: LlmVerdict { advice_code, confidence, reason: reason.into() },
        }
    }
}

impl LlmOracle for MockOracle {
    fn classify(&self, clause_text: &str, _context_hint: &str) -> LlmResult<Option<LlmVerdict>> {
        if clause_text.contains(self.trigger.as_str()) {
            Ok(Some(self.verdict.clone()))
        } else {
            Ok(None)
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opines_only_on_the_trigger_phrase() {
        let oracle = MockOracle::new("molest", AdviceCode::ManualCheck, Confidence::Medium, "molest clausule");
        assert!(oracle.classify("bevat molest uitsluiting", "").unwrap().is_some());
        assert!(oracle.classify("heel andere tekst", "").unwrap().is_none());
    }
}
