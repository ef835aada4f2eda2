//! Reference-export matching for the clause analysis engine (4.J).

mod columns;
mod comparison;
mod ingest;
mod matcher;

pub use columns::{resolve_column, CanonicalColumn};
pub use comparison::{combined_frequency, compute_status, should_standardize_from_reference, ComparisonStatus};
pub use ingest::{parse_reference_table, ReferenceIngestError};
pub use matcher::{MatchResult, MatchTier, ReferenceMatcher, ReferenceStatistics, DEFAULT_MIN_FUZZY_SCORE};
