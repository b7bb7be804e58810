use std::sync::Arc;

use integrations::{ObjectStorage, UploadRequest};
use shared::{
    domain::{Lead, LeadStatus, NewLead},
    error::{ApiError, ErrorCode},
    form::{self, FieldError, FormData, FormSchema, RESUME_CONTENT_TYPE},
    protocol::UpdateLeadStatusRequest,
};
use storage::{LeadStore, StoreError};
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_MAX_RESUME_BYTES: usize = 8 * 1024 * 1024;
const MAX_FILENAME_BYTES: usize = 180;

#[derive(Clone)]
pub struct ApiContext {
    pub store: LeadStore,
    pub uploads: Arc<dyn ObjectStorage>,
    pub form: Arc<FormSchema>,
    pub max_resume_bytes: usize,
}

impl ApiContext {
    pub fn new(store: LeadStore, uploads: Arc<dyn ObjectStorage>) -> Self {
        Self {
            store,
            uploads,
            form: Arc::new(form::lead_form_schema()),
            max_resume_bytes: DEFAULT_MAX_RESUME_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Why a form submission did not produce a lead. `field_errors` is empty
/// for failures that are not attributable to a single input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRejection {
    pub error: ApiError,
    pub field_errors: Vec<FieldError>,
}

impl FormRejection {
    fn fields(field_errors: Vec<FieldError>) -> Self {
        Self {
            error: ApiError::new(
                ErrorCode::Validation,
                "Please correct the highlighted fields.",
            ),
            field_errors,
        }
    }
}

impl From<ApiError> for FormRejection {
    fn from(error: ApiError) -> Self {
        Self {
            error,
            field_errors: Vec::new(),
        }
    }
}

pub async fn create_lead(ctx: &ApiContext, candidate: NewLead) -> Result<Lead, ApiError> {
    let lead = ctx.store.create(candidate).await.map_err(store_error)?;
    info!(status = %lead.status, "lead submitted");
    Ok(lead)
}

pub async fn list_leads(ctx: &ApiContext) -> Vec<Lead> {
    ctx.store.list().await
}

pub async fn update_lead_status(
    ctx: &ApiContext,
    request: UpdateLeadStatusRequest,
) -> Result<Lead, ApiError> {
    let email = request
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| missing_field("email"))?;
    let raw_status = request
        .status
        .filter(|status| !status.trim().is_empty())
        .ok_or_else(|| missing_field("status"))?;
    let status = LeadStatus::parse(raw_status.trim()).ok_or_else(|| {
        ApiError::new(
            ErrorCode::Validation,
            format!("unknown lead status `{raw_status}`"),
        )
    })?;

    let lead = ctx
        .store
        .update_status(&email, status)
        .await
        .map_err(store_error)?;
    info!(%email, status = %lead.status, "lead status updated");
    Ok(lead)
}

/// Validates the form against its schema, uploads the resume if one was
/// attached, then stores the lead.
pub async fn submit_lead_form(
    ctx: &ApiContext,
    mut data: FormData,
    resume: Option<ResumeUpload>,
) -> Result<Lead, FormRejection> {
    let mut field_errors = ctx.form.validate(&data);
    if let Some(upload) = resume.as_ref() {
        if let Err(message) = check_resume(upload, ctx.max_resume_bytes) {
            field_errors.push(FieldError {
                field: form::RESUME,
                message,
            });
        }
    }
    if !field_errors.is_empty() {
        return Err(FormRejection::fields(field_errors));
    }

    if let Some(upload) = resume {
        let reference = upload_resume(ctx, upload).await?;
        data.insert(form::RESUME, reference);
    }

    Ok(create_lead(ctx, data.to_new_lead()).await?)
}

pub fn resume_object_key(file_name: &str) -> String {
    format!("resumes/{}-{}", Uuid::new_v4(), file_name.trim())
}

async fn upload_resume(ctx: &ApiContext, upload: ResumeUpload) -> Result<String, ApiError> {
    let key = resume_object_key(&upload.file_name);
    ctx.uploads
        .upload(UploadRequest {
            key: key.clone(),
            content_type: upload.content_type,
            bytes: upload.bytes,
        })
        .await
        .map_err(|err| {
            error!(%key, error = %err, "resume upload failed");
            ApiError::internal()
        })
}

fn check_resume(upload: &ResumeUpload, max_bytes: usize) -> Result<(), String> {
    let name = upload.file_name.trim();
    if name.is_empty() {
        return Err("file name is required".to_string());
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err("file name is too long".to_string());
    }
    if name.contains('/') || name.contains('\\') {
        return Err("file name must not contain path separators".to_string());
    }
    if upload.bytes.is_empty() {
        return Err("file cannot be empty".to_string());
    }
    if upload.bytes.len() > max_bytes {
        return Err(format!("file exceeds {max_bytes} bytes"));
    }
    match upload.content_type.as_deref() {
        Some(content_type) if content_type != RESUME_CONTENT_TYPE => {
            Err("file must be a PDF document".to_string())
        }
        _ => Ok(()),
    }
}

fn missing_field(field: &str) -> ApiError {
    ApiError::new(
        ErrorCode::Validation,
        format!("missing required field `{field}`"),
    )
}

fn store_error(err: StoreError) -> ApiError {
    let code = match err {
        StoreError::Validation { .. } => ErrorCode::Validation,
        StoreError::NotFound { .. } => ErrorCode::NotFound,
        StoreError::InvalidTransition { .. } => ErrorCode::Conflict,
    };
    ApiError::new(code, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
