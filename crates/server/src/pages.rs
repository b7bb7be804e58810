use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, rejection::FormRejection, Multipart, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use integrations::{SessionError, StaffSession};
use serde::Deserialize;
use server_api::{list_leads, submit_lead_form, update_lead_status, ResumeUpload};
use shared::{
    domain::LeadStatus,
    error::{ErrorCode, GENERIC_INTERNAL_MESSAGE},
    form::{self, FormData},
    protocol::UpdateLeadStatusRequest,
};
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    render::{self, Notice},
    status_for,
};

pub(crate) const SESSION_COOKIE: &str = "lead_session";
pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const CONSOLE_PATH: &str = "/leads-list";

const SUBMITTED_NOTICE: &str = "Lead submitted successfully!";
const SUBMISSION_FAILED_NOTICE: &str = "Submission failed. Please try again.";
const INVALID_LOGIN: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReachOutForm {
    email: String,
}

pub(crate) async fn form_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render::form_page(
        &state.api.form,
        &FormData::new(),
        &[],
        None,
    ))
}

pub(crate) async fn submit_form(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Html<String> {
    let schema = &state.api.form;
    let (data, resume) = match read_submission(multipart).await {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, "malformed form submission");
            let notice = Notice::error(SUBMISSION_FAILED_NOTICE);
            return Html(render::form_page(schema, &FormData::new(), &[], Some(&notice)));
        }
    };

    match submit_lead_form(&state.api, data.clone(), resume).await {
        Ok(_) => {
            let notice = Notice::success(SUBMITTED_NOTICE);
            Html(render::form_page(schema, &FormData::new(), &[], Some(&notice)))
        }
        Err(rejection) => {
            let notice = if rejection.field_errors.is_empty() {
                Notice::error(SUBMISSION_FAILED_NOTICE)
            } else {
                Notice::error(rejection.error.message)
            };
            Html(render::form_page(
                schema,
                &data,
                &rejection.field_errors,
                Some(&notice),
            ))
        }
    }
}

/// Splits the multipart body into text fields and the optional resume file.
/// An empty file part (no file chosen) counts as no resume.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(FormData, Option<ResumeUpload>), MultipartError> {
    let mut data = FormData::new();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == form::RESUME {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            resume = Some(ResumeUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            data.insert(name, value);
        }
    }

    Ok((data, resume))
}

pub(crate) async fn login_page() -> Html<String> {
    Html(render::login_page(None))
}

pub(crate) async fn login(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(error = %rejection, "malformed sign-in form");
            return Html(render::login_page(Some(INVALID_LOGIN))).into_response();
        }
    };
    match state.sessions.sign_in(&form.username, &form.password).await {
        Ok(token) => {
            info!(username = %form.username, "staff signed in");
            (
                [(header::SET_COOKIE, session_cookie(&token))],
                Redirect::to(CONSOLE_PATH),
            )
                .into_response()
        }
        Err(SessionError::InvalidCredentials) => {
            Html(render::login_page(Some(INVALID_LOGIN))).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to issue staff session");
            (
                status_for(ErrorCode::Internal),
                Html(render::login_page(Some(GENERIC_INTERNAL_MESSAGE))),
            )
                .into_response()
        }
    }
}

pub(crate) async fn logout() -> Response {
    (
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
        )],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

pub(crate) async fn console_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    let leads = list_leads(&state.api).await;
    Html(render::console_page(&session, &leads, None)).into_response()
}

pub(crate) async fn mark_reached_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ReachOutForm>,
) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let request = UpdateLeadStatusRequest {
        email: Some(form.email),
        status: Some(LeadStatus::ReachedOut.as_str().to_string()),
    };
    match update_lead_status(&state.api, request).await {
        Ok(_) => Redirect::to(CONSOLE_PATH).into_response(),
        Err(err) => {
            let leads = list_leads(&state.api).await;
            let notice = Notice::error(err.message);
            (
                status_for(err.code),
                Html(render::console_page(&session, &leads, Some(&notice))),
            )
                .into_response()
        }
    }
}

async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<StaffSession> {
    let token = session_token(headers)?;
    state.sessions.get_session(&token).await
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}
