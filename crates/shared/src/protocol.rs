use serde::{Deserialize, Serialize};

use crate::domain::Lead;

pub const LEAD_SUBMITTED_MESSAGE: &str = "Lead submitted successfully";
pub const LEAD_STATUS_UPDATED_MESSAGE: &str = "Lead status updated";

pub fn leads_route() -> &'static str {
    "/leads"
}

/// Body of `PATCH /leads`. Both fields are checked by the handler so an
/// absent one is reported as a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLeadStatusRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadEnvelope {
    pub message: String,
    pub lead: Lead,
}

impl LeadEnvelope {
    pub fn submitted(lead: Lead) -> Self {
        Self {
            message: LEAD_SUBMITTED_MESSAGE.to_string(),
            lead,
        }
    }

    pub fn status_updated(lead: Lead) -> Self {
        Self {
            message: LEAD_STATUS_UPDATED_MESSAGE.to_string(),
            lead,
        }
    }
}
