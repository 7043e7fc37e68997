//! Adversarial configuration audit: a defender submits configs, an attacker
//! reports vulnerabilities, and a judge decides when to stop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Iterations allowed before an audit is rejected.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// The battleground shared by the audit roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditState {
    #[serde(default)]
    pub proposed_config: String,
    #[serde(default)]
    pub vulnerabilities: Vec<String>,
    #[serde(default)]
    pub iteration: u32,
}

/// What a config submission did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub iteration: u32,
    pub cleared_vulnerabilities: usize,
    pub comment: String,
}

impl fmt::Display for SubmitReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config updated (Iteration {}). Previous vulnerabilities cleared: {}. Comment: {}",
            self.iteration, self.cleared_vulnerabilities, self.comment
        )
    }
}

impl AuditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose or update the configuration.
    ///
    /// Starts a new iteration and clears the previous findings, since the
    /// submission is meant to fix them.
    #[must_use]
    pub fn submit_config(
        mut self,
        config: impl Into<String>,
        comment: impl Into<String>,
    ) -> (Self, SubmitReceipt) {
        self.proposed_config = config.into();
        self.iteration += 1;
        let cleared = self.vulnerabilities.len();
        self.vulnerabilities.clear();

        let receipt = SubmitReceipt {
            iteration: self.iteration,
            cleared_vulnerabilities: cleared,
            comment: comment.into(),
        };
        (self, receipt)
    }

    /// Log a flaw found in the current config as `[SEVERITY] description`.
    #[must_use]
    pub fn report_vulnerability(mut self, severity: Severity, description: &str) -> Self {
        let entry = format!("[{}] {}", severity.to_string().to_uppercase(), description);
        info!(iteration = self.iteration, entry = %entry, "Vulnerability logged");
        self.vulnerabilities.push(entry);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    Approved,
    Rejected,
}

/// The judge's final verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub final_config: String,
    pub resolved_issues: Vec<String>,
    pub approval_status: ApprovalStatus,
    pub total_iterations: u32,
}

impl SecurityReport {
    /// Decide whether the audit is finished.
    ///
    /// Approved once a non-empty config has no open findings; rejected once
    /// `max_iterations` submissions have been made without that; `None` while
    /// another round is still allowed. `resolved_issues` carries the findings
    /// cleared along the way.
    pub fn evaluate(state: &AuditState, resolved_issues: &[String], max_iterations: u32) -> Option<Self> {
        let approval_status = if !state.proposed_config.trim().is_empty()
            && state.vulnerabilities.is_empty()
        {
            ApprovalStatus::Approved
        } else if state.iteration >= max_iterations {
            ApprovalStatus::Rejected
        } else {
            return None;
        };

        Some(Self {
            final_config: state.proposed_config.clone(),
            resolved_issues: resolved_issues.to_vec(),
            approval_status,
            total_iterations: state.iteration,
        })
    }
}
