//! Best-effort mapping from provider failures to [`AdapterErrorKind`]
//!
//! Neither provider exposes a structured failure contract that covers every
//! case, so classification is an ordered table of `(predicate, kind)` rules
//! evaluated top to bottom. Message rules come first because the same status
//! code carries different meanings (`OpenAI` reports exhausted quota as 429,
//! ElevenLabs reports abuse blocks as 401). Anything unmatched is `Unknown`.
//!
//! Swapping this for structured status codes only requires replacing [`RULES`].

use crate::error::{AdapterError, AdapterErrorKind};

/// What is known about a failed call
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a> {
    /// HTTP status, if a response was received
    pub status: Option<u16>,
    /// Raw provider or client error text
    pub message: &'a str,
    /// The request failed before a response arrived (connect, timeout)
    pub transport: bool,
}

/// Predicate over a signal and its lowercased message
type Predicate = fn(&Signal<'_>, &str) -> bool;

const ABUSE_PATTERNS: &[&str] = &["detected_unusual_activity", "unusual activity", "abuse"];

const QUOTA_PATTERNS: &[&str] = &[
    "quota_exceeded",
    "insufficient_quota",
    "exceeded your current quota",
    "quota",
    "free tier",
    "free_tier",
    "billing_hard_limit",
];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "too many requests",
    "too_many_concurrent_requests",
    "system_busy",
];

const AUTH_PATTERNS: &[&str] = &[
    "invalid_api_key",
    "invalid api key",
    "incorrect api key",
    "unauthorized",
    "unauthenticated",
    "missing_permissions",
];

/// Free-tier exhaustion, treated as disqualifying regardless of kind
const FREE_TIER_PATTERNS: &[&str] = &["free tier", "free_tier", "free plan", "detected_unusual_activity"];

fn contains_any(message: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| message.contains(p))
}

fn abuse_message(_: &Signal<'_>, message: &str) -> bool {
    contains_any(message, ABUSE_PATTERNS)
}

fn quota_message(_: &Signal<'_>, message: &str) -> bool {
    contains_any(message, QUOTA_PATTERNS)
}

fn rate_limit_message(_: &Signal<'_>, message: &str) -> bool {
    contains_any(message, RATE_LIMIT_PATTERNS)
}

fn auth_message(_: &Signal<'_>, message: &str) -> bool {
    contains_any(message, AUTH_PATTERNS)
}

fn status_401(signal: &Signal<'_>, _: &str) -> bool {
    signal.status == Some(401)
}

fn status_403(signal: &Signal<'_>, _: &str) -> bool {
    signal.status == Some(403)
}

fn status_429(signal: &Signal<'_>, _: &str) -> bool {
    signal.status == Some(429)
}

fn status_5xx(signal: &Signal<'_>, _: &str) -> bool {
    signal.status.is_some_and(|s| (500..600).contains(&s))
}

fn transport_failure(signal: &Signal<'_>, _: &str) -> bool {
    signal.transport
}

/// Classification rules, first match wins
pub const RULES: &[(Predicate, AdapterErrorKind)] = &[
    (abuse_message, AdapterErrorKind::QuotaOrAbuseBlocked),
    (quota_message, AdapterErrorKind::QuotaOrAbuseBlocked),
    (rate_limit_message, AdapterErrorKind::RateLimited),
    (auth_message, AdapterErrorKind::Unauthorized),
    (status_401, AdapterErrorKind::Unauthorized),
    (status_403, AdapterErrorKind::QuotaOrAbuseBlocked),
    (status_429, AdapterErrorKind::RateLimited),
    (status_5xx, AdapterErrorKind::TransientServerError),
    (transport_failure, AdapterErrorKind::TransientServerError),
];

/// Classify a failed call
pub fn classify(signal: &Signal<'_>) -> AdapterErrorKind {
    let lowered = signal.message.to_lowercase();

    RULES
        .iter()
        .find(|(predicate, _)| predicate(signal, &lowered))
        .map_or(AdapterErrorKind::Unknown, |(_, kind)| *kind)
}

/// Whether a failure means the provider is unusable for future requests
pub fn is_disqualifying(error: &AdapterError) -> bool {
    matches!(
        error.kind,
        AdapterErrorKind::Unauthorized | AdapterErrorKind::QuotaOrAbuseBlocked
    ) || contains_any(&error.message.to_lowercase(), FREE_TIER_PATTERNS)
}
