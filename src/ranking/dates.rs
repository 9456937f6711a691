//! Effective-date resolution for recency scoring.
//!
//! A document may carry several candidate timestamps. The first one that
//! parses, in the order last-updated, online, issue, becomes the effective
//! date. Timestamps more than [`FUTURE_HORIZON_DAYS`] ahead of "now" are
//! clamped to "now" (periodicals date issues months ahead). Nothing here
//! fails; unusable input resolves to an unknown date.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::ranking::core::config::FUTURE_HORIZON_DAYS;
use crate::ranking::core::document::DateCandidates;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Which candidate field supplied the effective date.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Provider "last updated" timestamp.
    LastUpdated,
    /// Online publication date.
    Online,
    /// Issue publication date.
    Issue,
}

impl DateField {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastUpdated => "last_updated",
            Self::Online => "online",
            Self::Issue => "issue",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of date resolution for one document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDate {
    /// Effective timestamp after clamping, if any candidate was usable.
    pub effective: Option<DateTime<Utc>>,
    /// Field the timestamp came from.
    pub field: Option<DateField>,
    /// Whether the timestamp was beyond the horizon and clamped to "now".
    pub clamped: bool,
}

impl ResolvedDate {
    /// No usable timestamp.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            effective: None,
            field: None,
            clamped: false,
        }
    }

    /// Whether no timestamp could be resolved.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.effective.is_none()
    }

    /// Age in fractional days at `now`. Dates ahead of `now` have age zero.
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<f64> {
        self.effective.map(|effective| age_days(effective, now))
    }
}

#[allow(clippy::cast_precision_loss)] // Millisecond ages fit comfortably in f64 precision
fn age_days(effective: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(effective).num_milliseconds().max(0);
    millis as f64 / MILLIS_PER_DAY
}

/// Parse a provider timestamp.
///
/// Accepts RFC 3339, offsets without a colon, naive date-times (taken as UTC)
/// and bare `YYYY-MM-DD` dates (midnight UTC). Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Clamp a timestamp lying more than the horizon ahead of `now` to `now`.
///
/// Returns the (possibly clamped) timestamp and whether clamping happened.
/// Dates at or within the horizon, and all past dates, pass through.
#[must_use]
pub fn clamp_future(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> (DateTime<Utc>, bool) {
    let Some(horizon) = TimeDelta::try_days(FUTURE_HORIZON_DAYS)
        .and_then(|delta| now.checked_add_signed(delta))
    else {
        return (timestamp, false);
    };

    if timestamp > horizon {
        (now, true)
    } else {
        (timestamp, false)
    }
}

/// Resolve the effective date of a document's candidate timestamps.
#[must_use]
pub fn resolve_effective_date(candidates: &DateCandidates, now: DateTime<Utc>) -> ResolvedDate {
    let ordered = [
        (DateField::LastUpdated, candidates.last_updated.as_deref()),
        (DateField::Online, candidates.online.as_deref()),
        (DateField::Issue, candidates.issue.as_deref()),
    ];

    let Some((field, timestamp)) = ordered
        .into_iter()
        .find_map(|(field, raw)| raw.and_then(parse_timestamp).map(|ts| (field, ts)))
    else {
        return ResolvedDate::unknown();
    };

    let (effective, clamped) = clamp_future(timestamp, now);
    if clamped {
        tracing::debug!(
            field = field.as_str(),
            original = %timestamp,
            clamped_to = %effective,
            "clamped far-future date"
        );
    }

    ResolvedDate {
        effective: Some(effective),
        field: Some(field),
        clamped,
    }
}
