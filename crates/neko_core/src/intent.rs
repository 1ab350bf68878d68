//! Keyword-overlap intent classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Label produced when no keyword matched.
pub const UNKNOWN_INTENT: &str = "unknown";

/// Template intent label that applies to every detected intent.
pub const WILDCARD_INTENT: &str = "any";

/// A coarse category of user meaning (greeting, sadness, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(String);

impl Intent {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_INTENT.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_INTENT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One intent and the tokens that trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: BTreeSet<String>,
}

impl IntentRule {
    pub fn new(intent: &str, keywords: &[&str]) -> Self {
        Self {
            intent: Intent::new(intent),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Number of tokens found in this rule's keyword set.
    /// Repeated tokens count every time they appear.
    pub fn score(&self, tokens: &[String]) -> usize {
        tokens
            .iter()
            .filter(|t| self.keywords.contains(t.as_str()))
            .count()
    }
}

/// Ordered intent table. Declaration order is the tie-break: when two intents
/// reach the same best score, the one declared first wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTable {
    rules: Vec<IntentRule>,
}

impl IntentTable {
    /// Build a table, lowercasing every keyword so lookups against
    /// normalized tokens are exact.
    pub fn new(rules: Vec<IntentRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| IntentRule {
                intent: rule.intent,
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    /// The intents the responder ships with.
    pub fn builtin() -> Self {
        Self::new(vec![
            IntentRule::new("greeting", &["hi", "hello", "hey"]),
            IntentRule::new("sadness", &["sad", "tired", "down", "bad"]),
            IntentRule::new("happiness", &["happy", "good", "great"]),
            IntentRule::new("sleep", &["sleep", "bed", "night"]),
            IntentRule::new("name_call", &["hanekawa"]),
        ])
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn contains(&self, label: &str) -> bool {
        self.rules.iter().any(|r| r.intent.as_str() == label)
    }

    /// Pick the intent with the strictly highest keyword overlap.
    /// Returns `unknown` when nothing matched.
    pub fn classify(&self, tokens: &[String]) -> Intent {
        let mut best: Option<(&Intent, usize)> = None;
        for rule in &self.rules {
            let score = rule.score(tokens);
            if score == 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((&rule.intent, score));
            }
        }

        match best {
            Some((intent, score)) => {
                tracing::trace!("IntentTable: '{}' scored {}", intent, score);
                intent.clone()
            }
            None => Intent::unknown(),
        }
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::builtin()
    }
}
