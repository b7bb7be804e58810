use std::sync::Arc;

use chrono::Utc;
use shared::domain::{Lead, LeadStatus, NewLead};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("missing required field `{field}`")]
    Validation { field: &'static str },
    #[error("no lead found for email {email}")]
    NotFound { email: String },
    #[error("lead status cannot move from {from} to {to}")]
    InvalidTransition { from: LeadStatus, to: LeadStatus },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// In-memory, insertion-ordered lead collection.
///
/// Cloning shares the same underlying sequence. Writers hold the lock for the
/// whole check-then-mutate step, so each operation is atomic with respect to
/// concurrent requests.
#[derive(Clone, Default)]
pub struct LeadStore {
    leads: Arc<RwLock<Vec<Lead>>>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, candidate: NewLead) -> StoreResult<Lead> {
        let first_name = required("firstName", candidate.first_name)?;
        let last_name = required("lastName", candidate.last_name)?;
        let email = required("email", candidate.email)?;
        let linkedin = required("linkedin", candidate.linkedin)?;
        let message = required("message", candidate.message)?;

        let lead = Lead {
            first_name,
            last_name,
            email,
            linkedin,
            country: candidate.country,
            visas: candidate.visas.unwrap_or_default(),
            resume: candidate.resume,
            message,
            status: LeadStatus::Pending,
            submitted_at: Utc::now(),
        };

        let mut leads = self.leads.write().await;
        leads.push(lead.clone());
        debug!(total = leads.len(), "lead stored");
        Ok(lead)
    }

    pub async fn list(&self) -> Vec<Lead> {
        self.leads.read().await.clone()
    }

    /// Sets the status of the first lead (in insertion order) whose email
    /// matches exactly.
    pub async fn update_status(&self, email: &str, status: LeadStatus) -> StoreResult<Lead> {
        if email.trim().is_empty() {
            return Err(StoreError::Validation { field: "email" });
        }

        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|lead| lead.email == email)
            .ok_or_else(|| StoreError::NotFound {
                email: email.to_string(),
            })?;
        if !lead.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: lead.status,
                to: status,
            });
        }
        lead.status = status;
        Ok(lead.clone())
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leads.read().await.is_empty()
    }
}

fn required(field: &'static str, value: Option<String>) -> StoreResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StoreError::Validation { field }),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
