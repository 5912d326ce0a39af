//! Contact form intake: validation, rate limiting, and inquiry emails.
//!
//! This is the transport-agnostic half of the site's contact endpoint. The
//! hosting server hands [`ContactService::handle`] the raw request body and
//! the `X-Forwarded-For` header, and turns the returned [`ContactResponse`]
//! into an HTTP response. Delivery goes through the [`MailTransport`] trait,
//! so SMTP (or anything else) stays outside this crate.
//!
//! ## Request flow
//!
//! ```text
//! rate limit ──limited──▶ 429 {error}, Retry-After
//!     │
//! parse JSON ──invalid──▶ 400 {error}
//!     │
//! validate ───invalid───▶ 422 {error: {fieldErrors, formErrors}}
//!     │
//! honeypot ───filled────▶ 200 {success, skipped}
//!     │
//! send ──────────────────▶ 200 {success, delivered}
//! ```
//!
//! A failed send is logged and reported as `delivered: false`; the visitor
//! still sees a success so they are not tempted to resubmit.

use crate::config::ContactConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Client key used when no forwarded address is available.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Above this many tracked clients, expired windows are swept on each check.
const PRUNE_THRESHOLD: usize = 1024;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("static regex")
});

// ---------------------------------------------------------------------------
// Request and validation
// ---------------------------------------------------------------------------

/// A contact form submission.
///
/// Required fields default to empty so that a missing field is reported by
/// [`validate`](Self::validate) alongside every other problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub budget: Option<String>,
    /// Honeypot: hidden from people, filled in by bots.
    #[serde(default)]
    pub website: Option<String>,
}

/// Field name → messages, in field order.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

impl ContactRequest {
    /// Check every field, collecting all problems.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        check_length(&mut errors, "name", &self.name, 2, 200);
        if !is_valid_email(&self.email) {
            errors.entry("email").or_default().push("Invalid email".to_string());
        }
        check_length(&mut errors, "message", &self.message, 20, 2000);
        if let Some(phone) = &self.phone {
            check_length(&mut errors, "phone", phone, 0, 40);
        }
        check_length(&mut errors, "projectType", &self.project_type, 2, 120);
        if let Some(budget) = &self.budget {
            check_length(&mut errors, "budget", budget, 0, 120);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// True when the honeypot field carries anything at all, whitespace included.
    pub fn is_spam(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.is_empty())
    }
}

fn check_length(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        errors
            .entry(field)
            .or_default()
            .push(format!("Must contain at least {min} character(s)"));
    } else if len > max {
        errors
            .entry(field)
            .or_default()
            .push(format!("Must contain at most {max} character(s)"));
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    EMAIL.is_match(email) && !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}

/// Rate-limit key: the first `X-Forwarded-For` entry, or [`ANONYMOUS_CLIENT`].
pub fn client_key(forwarded_for: Option<&str>) -> String {
    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset: Instant,
}

/// Fixed-window request counter per client key.
///
/// The first request from a key opens a window of `window` length; up to
/// `max` requests are allowed inside it. Once `reset` has passed, the next
/// request opens a fresh window.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ContactConfig) -> Self {
        Self::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Count a request from `key` at `now`.
    pub fn check(&self, key: &str, now: Instant) -> RateDecision {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if entries.len() > PRUNE_THRESHOLD {
            entries.retain(|_, w| w.reset >= now);
        }

        match entries.get_mut(key) {
            Some(window) if window.reset >= now => {
                if window.count >= self.max {
                    let remaining = window.reset.saturating_duration_since(now);
                    let retry_after_secs = remaining.as_secs_f64().ceil() as u64;
                    return RateDecision::Limited {
                        retry_after_secs: retry_after_secs.max(1),
                    };
                }
                window.count += 1;
                RateDecision::Allowed
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset: now + self.window,
                    },
                );
                RateDecision::Allowed
            }
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// A composed inquiry, ready for a [`MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

/// Delivery seam implemented by the hosting server.
pub trait MailTransport {
    fn send(&self, email: &InquiryEmail) -> Result<(), ContactError>;
}

/// Build the plain-text inquiry email for a validated request.
pub fn compose_email(request: &ContactRequest, config: &ContactConfig) -> InquiryEmail {
    let mut lines = vec![
        format!("Name: {}", request.name),
        format!("Email: {}", request.email),
    ];
    if let Some(phone) = non_blank(&request.phone) {
        lines.push(format!("Phone: {phone}"));
    }
    lines.push(format!("Project Type: {}", request.project_type));
    if let Some(budget) = non_blank(&request.budget) {
        lines.push(format!("Budget: {budget}"));
    }
    lines.push(String::new());
    lines.push("Message:".to_string());
    lines.push(request.message.clone());

    InquiryEmail {
        from: config.from.clone(),
        to: config.to.clone(),
        reply_to: request.email.clone(),
        subject: format!("{} \u{2014} {}", config.subject, request.project_type),
        text: lines.join("\n"),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Submission handling
// ---------------------------------------------------------------------------

/// Status code, optional `Retry-After` seconds, and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactResponse {
    pub status: u16,
    pub retry_after_secs: Option<u64>,
    pub body: serde_json::Value,
}

impl ContactResponse {
    fn new(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            retry_after_secs: None,
            body,
        }
    }
}

/// Rate limiter, envelope settings and transport for one serving process.
pub struct ContactService<T: MailTransport> {
    config: ContactConfig,
    limiter: RateLimiter,
    transport: T,
}

impl<T: MailTransport> ContactService<T> {
    pub fn new(config: ContactConfig, transport: T) -> Self {
        Self {
            limiter: RateLimiter::from_config(&config),
            config,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Process one submission received at `now`.
    pub fn handle(&self, forwarded_for: Option<&str>, body: &str, now: Instant) -> ContactResponse {
        let key = client_key(forwarded_for);
        if let RateDecision::Limited { retry_after_secs } = self.limiter.check(&key, now) {
            warn!(client = %key, retry_after_secs, "contact submission rate limited");
            return ContactResponse {
                status: 429,
                retry_after_secs: Some(retry_after_secs),
                body: json!({ "error": "Too many requests. Please try again soon." }),
            };
        }

        let value: serde_json::Value = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(v) if v.is_object() => v,
            _ => return ContactResponse::new(400, json!({ "error": "Invalid request body" })),
        };

        let request: ContactRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(err) => {
                return ContactResponse::new(
                    422,
                    json!({ "error": { "formErrors": [err.to_string()], "fieldErrors": {} } }),
                );
            }
        };

        if let Err(field_errors) = request.validate() {
            return ContactResponse::new(
                422,
                json!({ "error": { "formErrors": [], "fieldErrors": field_errors } }),
            );
        }

        if request.is_spam() {
            info!(client = %key, "honeypot filled, submission dropped");
            return ContactResponse::new(200, json!({ "success": true, "skipped": true }));
        }

        let email = compose_email(&request, &self.config);
        let delivered = match self.transport.send(&email) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to send contact email");
                false
            }
        };
        ContactResponse::new(200, json!({ "success": true, "delivered": delivered }))
    }
}
