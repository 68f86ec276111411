//! Lightweight keyword analysis of process descriptions.
//!
//! Produces prompt context (which node categories a description seems to
//! need) and a basic sanity check on the description itself.

use serde::Serialize;

use crate::matcher::contains_any;

/// Minimum number of non-whitespace-trimmed characters in a description.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Coarse capability a description appears to require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredCategory {
    Webhook,
    Schedule,
    Http,
    Google,
    Communication,
    Processing,
}

impl RequiredCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Schedule => "schedule",
            Self::Http => "http",
            Self::Google => "google",
            Self::Communication => "communication",
            Self::Processing => "processing",
        }
    }
}

const CATEGORY_KEYWORDS: &[(RequiredCategory, &[&str])] = &[
    (
        RequiredCategory::Webhook,
        &["webhook", "получать", "принимать", "запрос"],
    ),
    (
        RequiredCategory::Schedule,
        &["каждый", "периодически", "час", "день", "расписание"],
    ),
    (RequiredCategory::Http, &["api", "запрос", "данные", "получить"]),
    (
        RequiredCategory::Google,
        &["google", "sheets", "таблица", "gmail", "email"],
    ),
    (
        RequiredCategory::Communication,
        &["slack", "уведомление", "сообщение"],
    ),
    (
        RequiredCategory::Processing,
        &["обработать", "изменить", "добавить", "условие"],
    ),
];

/// Categories of nodes the description mentions, in a fixed order.
pub fn required_categories(description: &str) -> Vec<RequiredCategory> {
    let lower = description.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(category, _)| *category)
        .collect()
}

const ACTION_KEYWORDS: &[&str] = &[
    "получать",
    "отправлять",
    "создавать",
    "обрабатывать",
    "когда",
    "если",
];

/// Outcome of [`check_description`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionCheck {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Sanity-check a process description before generation.
///
/// Descriptions shorter than [`MIN_DESCRIPTION_CHARS`] are rejected.  Longer
/// ones are accepted; when no action keyword is present the check carries
/// suggestions for a more useful description.
pub fn check_description(description: &str) -> DescriptionCheck {
    let trimmed = description.trim();
    if trimmed.chars().count() < MIN_DESCRIPTION_CHARS {
        return DescriptionCheck {
            valid: false,
            message: format!(
                "description is too short, at least {MIN_DESCRIPTION_CHARS} characters are required"
            ),
            suggestions: Vec::new(),
        };
    }

    if !contains_any(&trimmed.to_lowercase(), ACTION_KEYWORDS) {
        return DescriptionCheck {
            valid: true,
            message: "description accepted, but more detail about the actions would help".into(),
            suggestions: vec![
                "name the trigger (when the process starts)".into(),
                "describe the actions (what has to happen)".into(),
                "state the destination (where the data goes)".into(),
            ],
        };
    }

    DescriptionCheck {
        valid: true,
        message: "description is suitable for workflow generation".into(),
        suggestions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_for_scheduled_sheets_sync() {
        let categories =
            required_categories("Каждый час получать данные из API и сохранять в Google Sheets");
        assert_eq!(
            categories,
            vec![
                RequiredCategory::Webhook,
                RequiredCategory::Schedule,
                RequiredCategory::Http,
                RequiredCategory::Google,
            ]
        );
    }

    #[test]
    fn categories_empty_for_unrelated_text() {
        assert!(required_categories("hello there").is_empty());
    }

    #[test]
    fn short_description_is_invalid() {
        let check = check_description("  webhook ");
        assert!(!check.valid);
    }

    #[test]
    fn description_without_actions_gets_suggestions() {
        let check = check_description("Slack and Google Sheets integration");
        assert!(check.valid);
        assert_eq!(check.suggestions.len(), 3);
    }

    #[test]
    fn description_with_actions_is_clean() {
        let check = check_description("Когда приходит заказ, отправлять его в Slack");
        assert!(check.valid);
        assert!(check.suggestions.is_empty());
    }
}
