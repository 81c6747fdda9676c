//! Method name canonicalization.
//!
//! The harness prints implementation names such as `generate_opt_ext` or
//! `gsl_ran_cauchy(rng, 1)`. Rules strip those decorations in priority order
//! until the name is stable: `generate_` first, then the library tags.

use serde::{Deserialize, Serialize};

/// Remove every occurrence of `pattern`; lower priority runs first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonRule {
    pub pattern: String,
    pub priority: u32,
}

impl CanonRule {
    pub fn new(pattern: &str, priority: u32) -> Self {
        Self {
            pattern: pattern.to_string(),
            priority,
        }
    }
}

/// Substring marking a row measured through the established library.
pub const BASELINE_MARKER: &str = "gsl_ran";

/// Id that baseline rows are relabeled to in the rate table.
pub const BASELINE_ID: &str = "gsl";

#[derive(Debug, Clone)]
pub struct Canonicalizer {
    rules: Vec<CanonRule>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

pub fn default_rules() -> Vec<CanonRule> {
    vec![
        CanonRule::new("generate_", 0),
        CanonRule::new("rng, ", 10),
        CanonRule::new("gsl_ran_", 20),
        CanonRule::new("gsl_cdf_", 20),
    ]
}

impl Canonicalizer {
    pub fn new(mut rules: Vec<CanonRule>) -> Self {
        rules.retain(|r| !r.pattern.is_empty());
        // Stable sort keeps declaration order among equal priorities.
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    pub fn rules(&self) -> &[CanonRule] {
        &self.rules
    }

    pub fn canonicalize(&self, raw: &str) -> String {
        let mut name = raw.to_string();
        loop {
            let mut next = name.clone();
            for rule in &self.rules {
                next = next.replace(rule.pattern.as_str(), "");
            }
            if next == name {
                return name;
            }
            name = next;
        }
    }

    /// Whether the raw (uncanonicalized) name denotes the library baseline.
    pub fn is_baseline(raw: &str) -> bool {
        raw.contains(BASELINE_MARKER)
    }
}
