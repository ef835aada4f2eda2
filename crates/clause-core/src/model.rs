//! Data model shared across the clause analysis engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the input spreadsheet.
///
/// Immutable except for `cluster_id`, which is assigned once clustering
/// (component H) has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    pub id: String,
    pub raw_text: String,
    pub normalised_text: String,
    pub source_policy_number: Option<String>,
    pub cluster_id: Option<String>,
}

impl Clause {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>, normalised_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            normalised_text: normalised_text.into(),
            source_policy_number: None,
            cluster_id: None,
        }
    }

    pub fn with_policy_number(mut self, policy_number: impl Into<String>) -> Self {
        self.source_policy_number = Some(policy_number.into());
        self
    }

    /// `NVT` is the reserved cluster id for clauses too short to cluster (§4.H step 1).
    pub const NVT_CLUSTER_ID: &'static str = "NVT";

    pub fn is_not_applicable(&self) -> bool {
        self.cluster_id.as_deref() == Some(Self::NVT_CLUSTER_ID)
    }
}

/// A group of similar clauses produced by the clustering engine (component H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub leader_id: String,
    pub leader_text: String,
    pub leader_raw_text: String,
    pub name: String,
    pub member_ids: BTreeSet<String>,
}

impl Cluster {
    pub fn new(id: impl Into<String>, leader_id: impl Into<String>, leader_text: impl Into<String>, leader_raw_text: impl Into<String>, name: impl Into<String>) -> Self {
        let leader_id = leader_id.into();
        let mut member_ids = BTreeSet::new();
        member_ids.insert(leader_id.clone());
        Self {
            id: id.into(),
            leader_id,
            leader_text: leader_text.into(),
            leader_raw_text: leader_raw_text.into(),
            name: name.into(),
            member_ids,
        }
    }

    pub fn add_member(&mut self, clause_id: impl Into<String>) {
        self.member_ids.insert(clause_id.into());
    }

    pub fn frequency(&self) -> usize {
        self.member_ids.len()
    }

    /// Invariant (§3, §8): the leader is always a member of its own cluster.
    pub fn is_consistent(&self) -> bool {
        self.member_ids.contains(&self.leader_id)
    }
}

/// One article of the policy conditions document (external input, §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub raw_text: String,
    pub normalised_text: String,
}

/// A pre-approved clause text identified by a short code (external input, §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardClause {
    pub code: String,
    pub text: String,
    pub normalised_text: String,
    pub category: String,
}

impl StandardClause {
    /// Invariant (§3): `len(text) >= 10`.
    pub fn is_valid(&self) -> bool {
        self.text.len() >= 10
    }
}

/// Closed enumeration of verdicts (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdviceCode {
    Delete,
    Split,
    SplitCheck,
    Standardise,
    KeepAsClause,
    ManualCheck,
    FrequencyInfo,
    ConsistencyCheck,
    Unique,
    Clean,
    FillIn,
    DeleteExpired,
    Empty,
    Unreadable,
    /// A custom user instruction action (§4.I.0.5), carrying the free-form
    /// action text the user supplied (rendered with a "📋 " prefix downstream).
    Custom(String),
}

impl AdviceCode {
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        use std::borrow::Cow;
        match self {
            AdviceCode::Delete => Cow::Borrowed("DELETE"),
            AdviceCode::Split => Cow::Borrowed("SPLIT"),
            AdviceCode::SplitCheck => Cow::Borrowed("SPLIT_CHECK"),
            AdviceCode::Standardise => Cow::Borrowed("STANDARDISE"),
            AdviceCode::KeepAsClause => Cow::Borrowed("KEEP_AS_CLAUSE"),
            AdviceCode::ManualCheck => Cow::Borrowed("MANUAL_CHECK"),
            AdviceCode::FrequencyInfo => Cow::Borrowed("FREQUENCY_INFO"),
            AdviceCode::ConsistencyCheck => Cow::Borrowed("CONSISTENCY_CHECK"),
            AdviceCode::Unique => Cow::Borrowed("UNIQUE"),
            AdviceCode::Clean => Cow::Borrowed("CLEAN"),
            AdviceCode::FillIn => Cow::Borrowed("FILL_IN"),
            AdviceCode::DeleteExpired => Cow::Borrowed("DELETE_EXPIRED"),
            AdviceCode::Empty => Cow::Borrowed("EMPTY"),
            AdviceCode::Unreadable => Cow::Borrowed("UNREADABLE"),
            AdviceCode::Custom(action) => Cow::Owned(format!("\u{1F4CB} {action}")),
        }
    }
}

impl std::fmt::Display for AdviceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence level attached to an [`Advice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        };
        write!(f, "{s}")
    }
}

/// The engine's verdict for one cluster (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub cluster_id: String,
    pub code: AdviceCode,
    pub reason: String,
    pub confidence: Confidence,
    pub reference: String,
    pub category: String,
}

impl Advice {
    pub fn new(cluster_id: impl Into<String>, code: AdviceCode, reason: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            code,
            reason: reason.into(),
            confidence,
            reference: "-".to_string(),
            category: "UNKNOWN".to_string(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// A row from a prior-run export, used by the reference matcher (component J).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceClause {
    pub normalised_text: String,
    pub policy_number: Option<String>,
    pub frequency: usize,
    pub advice_code: String,
    pub cluster_name: String,
    pub matched: bool,
    /// Free-form `Status` column from the prior-run export (§6), e.g. "Ja"
    /// or "Afgerond" — consulted by the orchestrator's `action_status`
    /// output field, nowhere else.
    pub status: Option<String>,
}

impl ReferenceClause {
    pub fn new(normalised_text: impl Into<String>, advice_code: impl Into<String>, frequency: usize) -> Self {
        Self {
            normalised_text: normalised_text.into(),
            policy_number: None,
            frequency,
            advice_code: advice_code.into(),
            cluster_name: String::new(),
            matched: false,
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_invariant_holds_on_construction() {
        let cluster = Cluster::new("CL-0001", "row_1", "tekst", "Tekst", "Onbekend");
        assert!(cluster.is_consistent());
        assert_eq!(cluster.frequency(), 1);
    }

    #[test]
    fn cluster_frequency_tracks_members() {
        let mut cluster = Cluster::new("CL-0001", "row_1", "tekst", "Tekst", "Onbekend");
        cluster.add_member("row_2");
        cluster.add_member("row_2");
        assert_eq!(cluster.frequency(), 2);
    }

    #[test]
    fn advice_code_custom_renders_with_emoji_prefix() {
        let code = AdviceCode::Custom("Verwijderen - mag weg".to_string());
        assert_eq!(code.to_string(), "\u{1F4CB} Verwijderen - mag weg");
    }

    #[test]
    fn standard_clause_validity() {
        let sc = StandardClause {
            code: "9NX3".into(),
            text: "kort".into(),
            normalised_text: "kort".into(),
            category: "ADMIN".into(),
        };
        assert!(!sc.is_valid());
    }
}
