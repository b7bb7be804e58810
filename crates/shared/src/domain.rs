use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    Pending,
    ReachedOut,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 2] = [LeadStatus::Pending, LeadStatus::ReachedOut];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Pending => "PENDING",
            LeadStatus::ReachedOut => "REACHED_OUT",
        }
    }

    /// Follow-up only moves forward; re-asserting the current status is allowed.
    pub fn can_transition_to(self, next: LeadStatus) -> bool {
        !matches!((self, next), (LeadStatus::ReachedOut, LeadStatus::Pending))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisaCategory {
    #[serde(rename = "O1")]
    O1,
    #[serde(rename = "EB2A")]
    Eb2a,
    #[serde(rename = "EB2-NIW")]
    Eb2Niw,
    #[serde(rename = "I don't know")]
    Unsure,
}

impl VisaCategory {
    pub const ALL: [VisaCategory; 4] = [
        VisaCategory::O1,
        VisaCategory::Eb2a,
        VisaCategory::Eb2Niw,
        VisaCategory::Unsure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisaCategory::O1 => "O1",
            VisaCategory::Eb2a => "EB2A",
            VisaCategory::Eb2Niw => "EB2-NIW",
            VisaCategory::Unsure => "I don't know",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|visa| visa.as_str() == raw)
    }
}

impl fmt::Display for VisaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored lead. `email` is the natural key used for status updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub linkedin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub visas: Vec<VisaCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    pub message: String,
    pub status: LeadStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Candidate record for a create. Required fields stay optional here so a
/// missing field surfaces as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visas: Option<Vec<VisaCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
