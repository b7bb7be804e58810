//! HTTP client for the lead intake JSON API.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Lead, LeadStatus, NewLead},
    error::{ApiError, ApiException},
    protocol::{leads_route, LeadEnvelope, UpdateLeadStatusRequest},
};
use tracing::debug;
use url::Url;

pub struct LeadsClient {
    http: Client,
    leads_url: Url,
}

impl LeadsClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let trimmed = server_url.trim();
        let base = if trimmed.ends_with('/') {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("{trimmed}/"))
        }
        .with_context(|| format!("invalid server url '{server_url}'"))?;
        // Relative join keeps any path prefix on the server url.
        let leads_url = base
            .join(leads_route().trim_start_matches('/'))
            .context("failed to build leads url")?;
        Ok(Self {
            http: Client::new(),
            leads_url,
        })
    }

    pub async fn create_lead(&self, candidate: &NewLead) -> Result<LeadEnvelope> {
        let response = self
            .http
            .post(self.leads_url.clone())
            .json(candidate)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_leads(&self) -> Result<Vec<Lead>> {
        let response = self.http.get(self.leads_url.clone()).send().await?;
        decode(response).await
    }

    pub async fn update_status(&self, email: &str, status: LeadStatus) -> Result<LeadEnvelope> {
        let request = UpdateLeadStatusRequest {
            email: Some(email.to_string()),
            status: Some(status.as_str().to_string()),
        };
        let response = self
            .http
            .patch(self.leads_url.clone())
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }
}

/// Non-2xx responses carry an `ApiError` body; it is surfaced as an
/// `ApiException` so callers can downcast and inspect the code.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    debug!(%status, "lead api request rejected");
    let body = response.bytes().await?;
    match serde_json::from_slice::<ApiError>(&body) {
        Ok(error) => Err(ApiException::from(error).into()),
        Err(_) => Err(anyhow!("server returned {status}")),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
