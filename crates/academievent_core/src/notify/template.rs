//! Email content for schedule notifications.

use crate::model::event::{format_date, format_time, Event};
use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const BRAND_NAME: &str = "AcademiEvent";
const SUPPORT_ADDRESS: &str = "support@academievent.com";

/// Fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    /// Inner body fragment, before envelope wrapping.
    pub body_html: String,
    pub recipient_name: Option<String>,
}

impl EmailMessage {
    /// Body wrapped in the branded envelope.
    pub fn rendered_html(&self) -> String {
        wrap_html(self.recipient_name.as_deref(), &self.body_html)
    }

    /// Plain-text fallback derived from the body fragment.
    pub fn plain_text(&self) -> String {
        let spaced = self.body_html.replace("<br>", "\n");
        let stripped = HTML_TAG_RE.replace_all(&spaced, "");
        stripped
            .lines()
            .map(|line| WHITESPACE_RE.replace_all(line.trim(), " ").into_owned())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds the confirmation sent after a successful registration commit.
pub fn registration_confirmation(
    to: &str,
    recipient_name: Option<&str>,
    event: &Event,
) -> EmailMessage {
    let title = escape_html(&event.title);
    let location = if event.location.trim().is_empty() {
        "TBA".to_string()
    } else {
        escape_html(&event.location)
    };
    EmailMessage {
        to: to.to_string(),
        subject: format!("Registration Confirmed: {}", event.title),
        body_html: format!(
            "You have successfully registered for <strong>{title}</strong>.<br>Date: {}<br>Time: {}<br>Location: {location}",
            format_date(event.date),
            format_time(event.time),
        ),
        recipient_name: recipient_name.map(str::to_string),
    }
}

/// Wraps a body fragment with greeting and signature.
pub fn wrap_html(recipient_name: Option<&str>, body_html: &str) -> String {
    let greeting = recipient_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("<p>Hi {},</p>", escape_html(name)))
        .unwrap_or_default();
    format!(
        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h1>{BRAND_NAME}</h1>\
         <div>{greeting}{body_html}</div>\
         <div><p>Best regards,<br><strong>{BRAND_NAME} Team</strong></p>\
         <p>Need help? Contact us at <a href=\"mailto:{SUPPORT_ADDRESS}\">{SUPPORT_ADDRESS}</a></p></div>\
         </div>"
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
