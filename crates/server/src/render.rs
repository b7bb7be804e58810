//! Server-rendered HTML for the public form, the login page and the staff
//! console.

use std::fmt::Write as _;

use integrations::StaffSession;
use shared::{
    domain::{Lead, LeadStatus},
    form::{FieldError, FieldKind, FieldSpec, FormData, FormSchema, UiHint},
};
use url::Url;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;background:#f9f9f9;margin:0;color:#1c1c1c}\
main{max-width:640px;margin:0 auto;padding:32px 20px}\
main.wide{max-width:1100px}\
section{background:#fff;border-radius:10px;box-shadow:0 4px 10px rgba(0,0,0,.1);padding:24px;margin-bottom:20px}\
label{display:block;font-weight:600;margin:12px 0 4px}\
input[type=text],input[type=email],input[type=password],select,textarea{width:100%;padding:10px;border:1px solid #ccc;border-radius:6px;box-sizing:border-box}\
.choice{font-weight:400;display:flex;gap:8px;align-items:center}\
.field-error{color:#c62828;margin:4px 0 0;font-size:.9rem}\
.notice{padding:12px;border-radius:6px}\
.notice.success{background:#e8f5e9;color:#1b5e20}\
.notice.error{background:#ffebee;color:#b71c1c}\
button{padding:10px 16px;color:#fff;background:#0052cc;border:none;border-radius:6px;cursor:pointer}\
table{width:100%;border-collapse:collapse;background:#fff}\
th,td{border:1px solid #ddd;padding:10px;text-align:left}\
th{background:#f5f5f5}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) kind: NoticeKind,
    pub(crate) text: String,
}

impl Notice {
    pub(crate) fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    fn to_html(&self) -> String {
        let class = match self.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        format!(
            "<p class=\"notice {class}\" role=\"status\">{}</p>",
            escape(&self.text)
        )
    }
}

pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, main_class: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
         <title>{}</title><style>{STYLE}</style></head>\
         <body><main class=\"{main_class}\">{body}</main></body></html>",
        escape(title)
    )
}

/// Renders every section and field of `schema`. Values in `data` are echoed
/// back so a rejected submission keeps what the visitor typed.
pub(crate) fn form_page(
    schema: &FormSchema,
    data: &FormData,
    errors: &[FieldError],
    notice: Option<&Notice>,
) -> String {
    let mut body = String::from("<h1>Get An Assessment Of Your Immigration Case</h1>");
    body.push_str(
        "<form method=\"post\" action=\"/submit\" enctype=\"multipart/form-data\" novalidate>",
    );

    for section in &schema.sections {
        body.push_str("<section>");
        let _ = write!(body, "<h2>{}</h2>", escape(section.title));
        if let Some(description) = section.description {
            let _ = write!(body, "<p>{}</p>", escape(description));
        }
        for field in &section.fields {
            let error = errors.iter().find(|error| error.field == field.name);
            body.push_str(&render_field(field, data, error));
        }
        body.push_str("</section>");
    }

    body.push_str("<button type=\"submit\">Submit</button></form>");
    if let Some(notice) = notice {
        body.push_str(&notice.to_html());
    }
    body.push_str("<p><a href=\"/leads-list\">Sign In</a> To View Leads List</p>");
    layout("Lead intake", "", &body)
}

fn render_field(field: &FieldSpec, data: &FormData, error: Option<&FieldError>) -> String {
    let name = escape(field.name);
    let title = escape(field.title);
    let required = if field.rules.required { " required" } else { "" };
    let maxlength = field
        .rules
        .max_length
        .map(|max| format!(" maxlength=\"{max}\""))
        .unwrap_or_default();
    let value = escape(data.first(field.name).unwrap_or_default());

    let control = match field.ui {
        UiHint::Input => {
            let input_type = match field.kind {
                FieldKind::Email => "email",
                _ => "text",
            };
            format!(
                "<label for=\"{name}\">{title}</label>\
                 <input type=\"{input_type}\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{required}{maxlength}>"
            )
        }
        UiHint::Dropdown => {
            let multiple = matches!(field.kind, FieldKind::Choices { .. });
            let mut options = String::from("<option value=\"\"></option>");
            for option in options_of(field.kind) {
                let selected = if data.contains(field.name, option) {
                    " selected"
                } else {
                    ""
                };
                let option = escape(option);
                let _ = write!(
                    options,
                    "<option value=\"{option}\"{selected}>{option}</option>"
                );
            }
            format!(
                "<label for=\"{name}\">{title}</label>\
                 <select id=\"{name}\" name=\"{name}\"{}{required}>{options}</select>",
                if multiple { " multiple" } else { "" }
            )
        }
        UiHint::Checkboxes => {
            let input_type = match field.kind {
                FieldKind::Choice { .. } => "radio",
                _ => "checkbox",
            };
            let mut choices = format!("<fieldset><legend>{title}</legend>");
            for option in options_of(field.kind) {
                let checked = if data.contains(field.name, option) {
                    " checked"
                } else {
                    ""
                };
                let option = escape(option);
                let _ = write!(
                    choices,
                    "<label class=\"choice\"><input type=\"{input_type}\" name=\"{name}\" \
                     value=\"{option}\"{checked}>{option}</label>"
                );
            }
            choices.push_str("</fieldset>");
            choices
        }
        UiHint::TextArea { rows } => format!(
            "<label for=\"{name}\">{title}</label>\
             <textarea id=\"{name}\" name=\"{name}\" rows=\"{rows}\"{required}{maxlength}>{value}</textarea>"
        ),
        UiHint::FilePicker => {
            let accept = match field.kind {
                FieldKind::File { accept } => format!(" accept=\"{}\"", escape(accept)),
                _ => String::new(),
            };
            format!(
                "<label for=\"{name}\">{title}</label>\
                 <input type=\"file\" id=\"{name}\" name=\"{name}\"{accept}>"
            )
        }
    };

    match error {
        Some(error) => format!(
            "{control}<p class=\"field-error\">{title} {}</p>",
            escape(&error.message)
        ),
        None => control,
    }
}

fn options_of(kind: FieldKind) -> &'static [&'static str] {
    match kind {
        FieldKind::Choice { options } | FieldKind::Choices { options } => options,
        _ => &[],
    }
}

pub(crate) fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<section><h2>Login</h2>");
    if let Some(error) = error {
        body.push_str(&Notice::error(error).to_html());
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\
         <label for=\"username\">Username</label>\
         <input type=\"text\" id=\"username\" name=\"username\" required>\
         <label for=\"password\">Password</label>\
         <input type=\"password\" id=\"password\" name=\"password\" required>\
         <p><button type=\"submit\">Login</button></p></form></section>",
    );
    layout("Login", "", &body)
}

pub(crate) fn console_page(
    session: &StaffSession,
    leads: &[Lead],
    notice: Option<&Notice>,
) -> String {
    let mut body = format!(
        "<h1>Leads</h1><div>Signed in as {}. \
         <form method=\"post\" action=\"/logout\" style=\"display:inline\">\
         <button type=\"submit\">Sign out</button></form></div>",
        escape(&session.username)
    );
    if let Some(notice) = notice {
        body.push_str(&notice.to_html());
    }

    body.push_str(
        "<table><thead><tr><th>Name</th><th>Email</th><th>LinkedIn</th><th>Country</th>\
         <th>Visas</th><th>Resume</th><th>Submitted</th><th>Status</th><th>Action</th>\
         </tr></thead><tbody>",
    );
    if leads.is_empty() {
        body.push_str("<tr><td colspan=\"9\">No leads yet.</td></tr>");
    }
    for lead in leads {
        body.push_str(&lead_row(lead));
    }
    body.push_str("</tbody></table>");
    layout("Leads List", "wide", &body)
}

fn lead_row(lead: &Lead) -> String {
    let visas = lead
        .visas
        .iter()
        .map(|visa| visa.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let resume = lead
        .resume
        .as_deref()
        .map(|url| external_link(url, "Resume"))
        .unwrap_or_default();
    let action = if lead.status == LeadStatus::Pending {
        format!(
            "<form method=\"post\" action=\"/leads-list/reached-out\">\
             <input type=\"hidden\" name=\"email\" value=\"{}\">\
             <button type=\"submit\">Mark as Reached Out</button></form>",
            escape(&lead.email)
        )
    } else {
        String::new()
    };

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td>\
         <td>{}</td><td>{}</td><td>{resume}</td>\
         <td>{}</td><td>{}</td><td>{action}</td></tr>",
        escape(&lead.full_name()),
        escape(&lead.email),
        external_link(&lead.linkedin, "Profile"),
        escape(lead.country.as_deref().unwrap_or_default()),
        escape(&visas),
        lead.submitted_at.format("%Y-%m-%d %H:%M UTC"),
        lead.status,
    )
}

/// Anchor for submitted URLs. Anything that is not plain http(s) is shown as
/// text so a stored value can never become a script link.
fn external_link(raw: &str, label: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>",
            escape(url.as_str())
        ),
        _ => escape(raw),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
