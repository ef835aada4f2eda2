//! Custom user instruction parsing and matching (4.I.0.5, §6).
//!
//! Grounded in
//! `original_source/hienfeld/services/custom_instructions_service.py`, but
//! follows `spec.md`'s simpler, authoritative matching order: substring
//! first, fuzzy and semantic only as fallbacks, rather than the original's
//! hybrid-first chain.

use clause_core::{Advice, AdviceCode, Cluster, Confidence};
use clause_similarity::HybridSimilarityService;

use crate::context::AnalysisContext;
use crate::pipeline::Strategy;

/// One parsed `search → action` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomInstruction {
    pub search_text: String,
    pub action: String,
}

/// Result of matching input text against the loaded instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomMatchKind {
    /// Exact (case-insensitive) substring containment.
    Contains,
    /// Cleared the fuzzy or semantic threshold without a literal substring hit.
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct CustomMatch<'a> {
    pub instruction: &'a CustomInstruction,
    pub kind: CustomMatchKind,
    pub score: f64,
}

const DEFAULT_FUZZY_THRESHOLD: f64 = 0.75;
const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.70;

/// Parses and matches the free-form custom-instruction blob (§6).
///
/// Empty when no instructions were supplied; the strategy built on top of
/// this then simply never fires (`can_handle` gates on
/// [`CustomInstructionService::is_empty`]).
pub struct CustomInstructionService {
    instructions: Vec<CustomInstruction>,
    fuzzy_threshold: f64,
    semantic_threshold: f64,
}

impl CustomInstructionService {
    pub fn new(raw_text: &str) -> Self {
        Self::with_thresholds(raw_text, DEFAULT_FUZZY_THRESHOLD, DEFAULT_SEMANTIC_THRESHOLD)
    }

    pub fn with_thresholds(raw_text: &str, fuzzy_threshold: f64, semantic_threshold: f64) -> Self {
        Self {
            instructions: parse_instructions(raw_text),
            fuzzy_threshold,
            semantic_threshold,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn instructions(&self) -> &[CustomInstruction] {
        &self.instructions
    }

    /// Finds the best matching instruction for `input_text` (§4.I.0.5):
    /// case-insensitive substring containment first (primary), then the
    /// best-scoring fuzzy/semantic candidate above threshold.
    pub fn find_match(&self, input_text: &str, similarity: &HybridSimilarityService) -> Option<CustomMatch<'_>> {
        if self.instructions.is_empty() {
            return None;
        }
        let input_lower = input_text.to_lowercase();

        for instruction in &self.instructions {
            if input_lower.contains(&instruction.search_text.to_lowercase()) {
                return Some(CustomMatch { instruction, kind: CustomMatchKind::Contains, score: 1.0 });
            }
        }

        let mut best: Option<CustomMatch<'_>> = None;
        for instruction in &self.instructions {
            let score = similarity.similarity(&input_lower, &instruction.search_text.to_lowercase());
            let threshold = if similarity.config().enable_embeddings {
                self.semantic_threshold
            } else {
                self.fuzzy_threshold
            };
            if score >= threshold && best.as_ref().map_or(true, |m| score > m.score) {
                best = Some(CustomMatch { instruction, kind: CustomMatchKind::Fuzzy, score });
            }
        }
        best
    }
}

/// Parses the custom-instruction blob (§6): either TSV `search\taction`
/// lines, or blank-line-separated blocks whose action line starts with
/// `→`, `->` or `>` and whose remaining lines concatenate into the search
/// text.
fn parse_instructions(raw_text: &str) -> Vec<CustomInstruction> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut instructions = Vec::new();
    for block in split_blocks(trimmed) {
        if let Some(instruction) = parse_block(&block) {
            instructions.push(instruction);
        }
    }
    instructions
}

fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

fn parse_block(block: &str) -> Option<CustomInstruction> {
    // TSV shorthand: a single line with a literal tab separates search/action.
    if !block.contains('\n') {
        if let Some((search, action)) = block.split_once('\t') {
            let search = search.trim();
            let action = action.trim();
            if !search.is_empty() && !action.is_empty() {
                return Some(CustomInstruction { search_text: search.to_string(), action: action.to_string() });
            }
        }
    }

    let mut search_lines = Vec::new();
    let mut action: Option<String> = None;
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(a) = strip_action_marker(line) {
            action = Some(a.to_string());
        } else if let Some((search, a)) = line.split_once('\t') {
            search_lines.push(search.trim().to_string());
            action = Some(a.trim().to_string());
        } else {
            search_lines.push(line.to_string());
        }
    }

    let action = action?;
    if search_lines.is_empty() || action.is_empty() {
        return None;
    }
    Some(CustomInstruction { search_text: search_lines.join(" "), action })
}

fn strip_action_marker(line: &str) -> Option<&str> {
    for marker in ["\u{2192}", "->", ">"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    None
}

/// Step 0.5 of the waterfall (order 0.5): only runs when the user supplied
/// a non-empty instruction block.
pub struct CustomInstructionStrategy;

impl Strategy for CustomInstructionStrategy {
    fn order(&self) -> f64 {
        0.5
    }

    fn name(&self) -> &str {
        "custom_instructions"
    }

    fn can_handle(&self, _cluster: &Cluster, ctx: &AnalysisContext) -> bool {
        !ctx.custom_instructions.is_empty()
    }

    fn analyse(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice> {
        let result = ctx.custom_instructions.find_match(&cluster.leader_raw_text, ctx.similarity)?;
        let confidence = match result.kind {
            CustomMatchKind::Contains => Confidence::High,
            CustomMatchKind::Fuzzy => Confidence::Medium,
        };
        let reason = format!("matched custom instruction: '{}'", result.instruction.search_text);
        Some(
            Advice::new(cluster.id.clone(), AdviceCode::Custom(result.instruction.action.clone()), reason, confidence)
                .with_category("CUSTOM"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_core::SemanticConfig;

    #[test]
    fn empty_blob_yields_no_instructions() {
        let service = CustomInstructionService::new("   \n  ");
        assert!(service.is_empty());
    }

    #[test]
    fn parses_tsv_line() {
        let service = CustomInstructionService::new("sanctieclausule\tVerwijderen - mag weg");
        assert_eq!(service.len(), 1);
        assert_eq!(service.instructions()[0].action, "Verwijderen - mag weg");
    }

    #[test]
    fn parses_multiline_block_with_arrow() {
        let blob = "meeverzekerde ondernemingen\n\u{2192} Vullen in partijenkaart";
        let service = CustomInstructionService::new(blob);
        assert_eq!(service.len(), 1);
        assert_eq!(service.instructions()[0].search_text, "meeverzekerde ondernemingen");
        assert_eq!(service.instructions()[0].action, "Vullen in partijenkaart");
    }

    #[test]
    fn parses_ascii_arrow_variants() {
        let blob = "sanctieclausule of embargo bepalingen\n-> Verwijderen - mag weg\n\nandere tekst\n> Ook verwijderen";
        let service = CustomInstructionService::new(blob);
        assert_eq!(service.len(), 2);
    }

    #[test]
    fn substring_match_wins_over_fuzzy() {
        let service = CustomInstructionService::new("sanctieclausule\tVerwijderen - mag weg");
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        let result = service.find_match("Bepaling omtrent sanctieclausule EU 2023", &similarity).unwrap();
        assert_eq!(result.kind, CustomMatchKind::Contains);
        assert_eq!(result.instruction.action, "Verwijderen - mag weg");
    }

    #[test]
    fn no_match_below_threshold() {
        let service = CustomInstructionService::new("heel specifieke zin over iets\tActie");
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        assert!(service.find_match("volledig andere inhoud", &similarity).is_none());
    }
}
