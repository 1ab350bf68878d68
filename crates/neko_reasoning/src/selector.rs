// ============================================================================
// Candidate selection
// ============================================================================
//
// Filter templates to the detected intent (plus wildcards), score each one,
// then draw uniformly from the best few so replies stay varied.

use neko_core::{ContentStore, ConversationState, Intent, IntentMatch, Template};
use rand::seq::SliceRandom;
use rand::Rng;

/// Base utility for a template written for exactly this intent.
pub const EXACT_MATCH_SCORE: i32 = 50;
/// Base utility for a wildcard template.
pub const WILDCARD_MATCH_SCORE: i32 = 10;
/// Subtracted when the template was the previous turn's pick.
pub const REPEAT_PENALTY: i32 = 15;
/// How many top-ranked candidates the final draw considers.
pub const TOP_TIER: usize = 3;

/// A template that survived filtering, with its utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    pub template: &'a Template,
    pub score: i32,
}

/// Templates applicable to `intent`: exact matches and wildcards, in
/// content order.
pub fn get_candidates<'a>(content: &'a ContentStore, intent: &Intent) -> Vec<&'a Template> {
    content
        .templates()
        .iter()
        .filter(|t| t.intent.matches(intent).is_some())
        .collect()
}

/// Utility of `template` for this turn, or `None` when it must not be
/// selected (intent mismatch or mood outside its conditions).
pub fn compute_utility(
    template: &Template,
    intent: &Intent,
    state: &ConversationState,
) -> Option<i32> {
    let mut score = match template.intent.matches(intent)? {
        IntentMatch::Exact => EXACT_MATCH_SCORE,
        IntentMatch::Wildcard => WILDCARD_MATCH_SCORE,
    };

    if !template.conditions.allows(state.mood) {
        return None;
    }

    if state.last_template_id.as_deref() == Some(template.id.as_str()) {
        score -= REPEAT_PENALTY;
    }

    Some(score)
}

/// Score every candidate, drop the inapplicable ones, and sort by utility,
/// best first. Equal scores keep content order.
pub fn rank<'a>(
    candidates: &[&'a Template],
    intent: &Intent,
    state: &ConversationState,
) -> Vec<ScoredCandidate<'a>> {
    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .filter_map(|&template| {
            compute_utility(template, intent, state).map(|score| ScoredCandidate { template, score })
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Draw uniformly from the top `TOP_TIER` ranked candidates.
/// `None` when nothing survives filtering.
pub fn choose_best<'a, R: Rng + ?Sized>(
    candidates: &[&'a Template],
    intent: &Intent,
    state: &ConversationState,
    rng: &mut R,
) -> Option<&'a Template> {
    let ranked = rank(candidates, intent, state);
    let tier = &ranked[..ranked.len().min(TOP_TIER)];
    let picked = tier.choose(rng)?;
    tracing::debug!(
        "Selector: picked '{}' (score {}) from {} of {} ranked",
        picked.template.id,
        picked.score,
        tier.len(),
        ranked.len()
    );
    Some(picked.template)
}

// ============================================================================
// Tests
// ============================================================================
