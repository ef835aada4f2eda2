//! Five-step strategy waterfall (4.I): admin/hygiene, custom instructions,
//! clause library, policy-conditions match, fallback. First match wins.

pub mod admin;
pub mod conditions;
pub mod context;
pub mod custom;
pub mod fallback;
pub mod library;
pub mod pipeline;

pub use admin::AdminHygieneStrategy;
pub use conditions::ConditionsMatchStrategy;
pub use context::AnalysisContext;
pub use custom::{CustomInstruction, CustomInstructionService, CustomInstructionStrategy, CustomMatch, CustomMatchKind};
pub use fallback::FallbackStrategy;
pub use library::ClauseLibraryStrategy;
pub use pipeline::{Strategy, StrategyPipeline};

/// Builds the standard five-step waterfall in its fixed order (4.I).
pub fn default_pipeline() -> StrategyPipeline {
    StrategyPipeline::new(vec![
        Box::new(AdminHygieneStrategy),
        Box::new(CustomInstructionStrategy),
        Box::new(ClauseLibraryStrategy),
        Box::new(ConditionsMatchStrategy),
        Box::new(FallbackStrategy),
    ])
}
