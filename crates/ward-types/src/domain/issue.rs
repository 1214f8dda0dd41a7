use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of quality and security issue kinds (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueType {
    // Quality
    InfiniteLoop,
    TaskDrift,
    Inefficiency,
    Incompleteness,
    ToolMisuse,
    // Security
    DataExfiltration,
    PromptInjection,
    UnauthorizedAccess,
    SuspiciousBehavior,
    CredentialLeak,
    SecurityBypass,
    MissingConfig,
}

impl IssueType {
    /// Hard-security kinds that, at severity >= 8, force `FAILED` at
    /// session finalization (spec §4.3 step 4).
    pub fn is_hard_security(self) -> bool {
        matches!(
            self,
            IssueType::SecurityBypass | IssueType::PromptInjection | IssueType::DataExfiltration
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub issue_id: String,
    pub timestamp: DateTime<Utc>,
    pub issue_type: IssueType,
    /// 1 (minor) through 10 (severe).
    pub severity: u8,
    pub description: String,
    #[serde(default)]
    pub affected_step_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub auto_resolved: bool,
}

impl QualityIssue {
    pub fn new(
        issue_id: impl Into<String>,
        issue_type: IssueType,
        severity: u8,
        description: impl Into<String>,
    ) -> Self {
        Self {
            issue_id: issue_id.into(),
            timestamp: Utc::now(),
            issue_type,
            severity: severity.clamp(1, 10),
            description: description.into(),
            affected_step_ids: Vec::new(),
            recommendation: None,
            auto_resolved: false,
        }
    }

    pub fn with_step(mut self, step_id: impl Into<String>) -> Self {
        self.affected_step_ids.push(step_id.into());
        self
    }

    pub fn is_loop_signal(&self) -> bool {
        self.issue_type == IssueType::InfiniteLoop && self.severity >= 8
    }

    pub fn is_hard_security_failure(&self) -> bool {
        self.issue_type.is_hard_security() && self.severity >= 8
    }
}
