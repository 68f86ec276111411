//! Keyword-driven pattern matcher.
//!
//! Maps a free-text process description onto at most one
//! [`WorkflowPattern`].  Matching is an ordered list of `(predicate,
//! pattern)` rules evaluated once over the lower-cased text; the first rule
//! whose predicate holds wins.  There is no scoring and no combination of
//! several matches.
//!
//! Rule order (webhook rules before schedule rules):
//!
//! 1. trigger + conditional keywords → `conditional_notification`
//! 2. trigger keywords → `webhook_to_action`
//! 3. scheduling keywords → `scheduled_data_sync`
//! 4. API + multi-destination keywords → `api_to_multiple_destinations`

use tracing::debug;

use crate::patterns::{
    API_TO_MULTIPLE_DESTINATIONS, CONDITIONAL_NOTIFICATION, PatternSet, SCHEDULED_DATA_SYNC,
    WEBHOOK_TO_ACTION, WorkflowPattern,
};

// ---------------------------------------------------------------------------
// Keyword sets
// ---------------------------------------------------------------------------

/// Words signalling that the workflow is started by an incoming request.
pub const TRIGGER_KEYWORDS: &[&str] = &["webhook", "получать", "принимать"];

/// Words signalling conditional branching.
pub const CONDITIONAL_KEYWORDS: &[&str] = &["если", "условие", "когда"];

/// Words signalling a scheduled workflow.
pub const SCHEDULE_KEYWORDS: &[&str] = &["каждый", "периодически", "регулярно", "час"];

/// Words signalling an API or data source.
pub const API_KEYWORDS: &[&str] = &["api", "данные"];

/// Words signalling several output destinations.
pub const MULTI_DESTINATION_KEYWORDS: &[&str] = &["несколько", "разные"];

/// Literal substring test of any keyword against already lower-cased text.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single matcher rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Short rule name, used in logs and tests.
    pub name: &'static str,
    /// Predicate over the lower-cased description.
    pub predicate: fn(&str) -> bool,
    /// Pattern returned when the predicate holds.
    pub pattern_id: &'static str,
}

fn is_conditional_webhook(text: &str) -> bool {
    contains_any(text, TRIGGER_KEYWORDS) && contains_any(text, CONDITIONAL_KEYWORDS)
}

fn is_webhook(text: &str) -> bool {
    contains_any(text, TRIGGER_KEYWORDS)
}

fn is_scheduled(text: &str) -> bool {
    contains_any(text, SCHEDULE_KEYWORDS)
}

fn is_fan_out(text: &str) -> bool {
    contains_any(text, API_KEYWORDS) && contains_any(text, MULTI_DESTINATION_KEYWORDS)
}

/// The built-in rules in evaluation order.
pub fn builtin_rules() -> Vec<PatternRule> {
    vec![
        PatternRule {
            name: "conditional_webhook",
            predicate: is_conditional_webhook,
            pattern_id: CONDITIONAL_NOTIFICATION,
        },
        PatternRule {
            name: "webhook",
            predicate: is_webhook,
            pattern_id: WEBHOOK_TO_ACTION,
        },
        PatternRule {
            name: "scheduled",
            predicate: is_scheduled,
            pattern_id: SCHEDULED_DATA_SYNC,
        },
        PatternRule {
            name: "fan_out",
            predicate: is_fan_out,
            pattern_id: API_TO_MULTIPLE_DESTINATIONS,
        },
    ]
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Ordered rule list over a pattern set.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rules: Vec<PatternRule>,
    patterns: PatternSet,
}

impl PatternMatcher {
    /// Built-in rules over the built-in patterns.
    pub fn builtin() -> Self {
        Self::new(builtin_rules(), PatternSet::builtin())
    }

    /// Custom rules.  Rules pointing at a pattern missing from `patterns`
    /// never produce a suggestion.
    pub fn new(rules: Vec<PatternRule>, patterns: PatternSet) -> Self {
        Self { rules, patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// The first rule whose predicate holds for `description`.
    pub fn matching_rule(&self, description: &str) -> Option<&PatternRule> {
        let lower = description.to_lowercase();
        self.rules.iter().find(|rule| (rule.predicate)(&lower))
    }

    /// Suggest a workflow pattern for `description`, if any rule matches.
    pub fn suggest(&self, description: &str) -> Option<&WorkflowPattern> {
        let rule = self.matching_rule(description)?;
        let pattern = self.patterns.get(rule.pattern_id);
        debug!(
            rule = rule.name,
            pattern = rule.pattern_id,
            found = pattern.is_some(),
            "pattern rule matched"
        );
        pattern
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn suggested(text: &str) -> Option<String> {
        PatternMatcher::builtin().suggest(text).map(|p| p.id.clone())
    }

    #[test]
    fn webhook_with_slack_is_plain_webhook() {
        assert_eq!(
            suggested("При получении webhook отправить уведомление в Slack").as_deref(),
            Some(WEBHOOK_TO_ACTION)
        );
    }

    #[test]
    fn webhook_with_condition_is_conditional() {
        assert_eq!(
            suggested("Принимать webhook и если сумма больше 100, писать в Slack").as_deref(),
            Some(CONDITIONAL_NOTIFICATION)
        );
    }

    #[test]
    fn hourly_api_to_sheets_is_scheduled_sync() {
        assert_eq!(
            suggested("Каждый час получить курс из API и сохранить в Google Sheets").as_deref(),
            Some(SCHEDULED_DATA_SYNC)
        );
    }

    #[test]
    fn api_to_several_places_is_fan_out() {
        assert_eq!(
            suggested("Забрать данные из API и отправить в несколько систем").as_deref(),
            Some(API_TO_MULTIPLE_DESTINATIONS)
        );
    }

    #[test]
    fn webhook_rule_wins_over_schedule() {
        // Both trigger and scheduling keywords present: webhook is checked first.
        assert_eq!(
            suggested("webhook, который регулярно шлёт отчёт").as_deref(),
            Some(WEBHOOK_TO_ACTION)
        );
    }

    #[test]
    fn unrelated_text_matches_nothing() {
        assert_eq!(suggested("make me a sandwich"), None);
        assert_eq!(suggested(""), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(suggested("WEBHOOK to Slack").as_deref(), Some(WEBHOOK_TO_ACTION));
    }

    #[test]
    fn suggestion_is_deterministic() {
        let matcher = PatternMatcher::builtin();
        let text = "Каждый час синхронизировать данные";
        let first = matcher.suggest(text).map(|p| p.id.clone());
        for _ in 0..10 {
            assert_eq!(matcher.suggest(text).map(|p| p.id.clone()), first);
        }
    }

    #[test]
    fn rule_for_missing_pattern_yields_none() {
        let rules = vec![PatternRule {
            name: "always",
            predicate: |_| true,
            pattern_id: "missing",
        }];
        let matcher = PatternMatcher::new(rules, PatternSet::builtin());
        assert!(matcher.matching_rule("anything").is_some());
        assert!(matcher.suggest("anything").is_none());
    }
}
