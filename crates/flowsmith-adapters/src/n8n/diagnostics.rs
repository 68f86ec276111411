//! Connection diagnostics report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// Outcome of a single diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

/// Aggregated result of `N8nClient::test_connection`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub timestamp: DateTime<Utc>,
    pub base_url: String,
    /// Active auth scheme name, if any.
    pub auth_scheme: Option<String>,
    pub checks: Vec<CheckResult>,
}

impl ConnectionReport {
    pub fn new(base_url: &str, auth_scheme: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now(),
            base_url: base_url.to_owned(),
            auth_scheme: auth_scheme.map(str::to_owned),
            checks: Vec::new(),
        }
    }

    /// Record a check from the result of the operation it ran.
    pub fn record(&mut self, name: &str, outcome: Result<String>) {
        let (status, detail) = match outcome {
            Ok(detail) => (CheckStatus::Passed, detail),
            Err(e) => (CheckStatus::Failed, e.to_string()),
        };
        self.checks.push(CheckResult {
            name: name.to_owned(),
            status,
            detail,
        });
    }

    pub fn skip(&mut self, name: &str, reason: &str) {
        self.checks.push(CheckResult {
            name: name.to_owned(),
            status: CheckStatus::Skipped,
            detail: reason.to_owned(),
        });
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// `true` when no check failed.
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;

    #[test]
    fn failed_check_makes_report_unhealthy() {
        let mut report = ConnectionReport::new("http://localhost:5678", None);
        report.record("basic_connection", Ok("reachable".into()));
        report.skip("workflows_access", "not authenticated");
        assert!(report.is_healthy());

        report.record(
            "authentication",
            Err(RemoteError::NotAuthenticated {
                operation: "check_authentication",
            }),
        );
        assert!(!report.is_healthy());
        assert_eq!(report.check("authentication").unwrap().status, CheckStatus::Failed);
        assert_eq!(report.check("workflows_access").unwrap().status, CheckStatus::Skipped);
    }
}
