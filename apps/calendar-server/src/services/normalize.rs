//! Validation and normalization of posted event fields.

use chrono::{DateTime, Duration, NaiveTime, SubsecRound, Utc};
use entities::{event_tags, NewEvent};
use serde::Deserialize;

use crate::config::ServerConfig;

const SECONDS_PER_DAY: i64 = 86_400;

/// Raw form fields of an event creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventForm {
    pub guid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub external_url: Option<String>,
    /// Epoch seconds
    pub date: Option<String>,
    /// Epoch seconds
    pub start: Option<String>,
    /// Epoch seconds
    pub end: Option<String>,
    pub all_day: Option<String>,
}

/// Limits applied while normalizing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeRules {
    pub max_title_length: usize,
    pub minimum_event_seconds: i64,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for NormalizeRules {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_title_length: config.max_title_length,
            minimum_event_seconds: config.minimum_event_seconds,
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationReason {
    #[error("not supplied")]
    Missing,
    #[error("longer than {max} characters")]
    TooLong { max: usize },
    #[error("not an absolute URL")]
    InvalidUrl,
    #[error("not a timestamp")]
    InvalidTimestamp,
    #[error("not a boolean")]
    InvalidBoolean,
    #[error("before start")]
    EndBeforeStart,
    #[error("shorter than {min} seconds")]
    TooShort { min: i64 },
    #[error("spans a whole day or more; post it as an all-day event")]
    SpansFullDay,
}

/// A rejected event field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}

/// Validates `form` and resolves its dates into a [`NewEvent`].
///
/// `now` anchors events posted without any date. The guid is not examined.
pub fn normalize(
    form: &EventForm,
    now: DateTime<Utc>,
    rules: &NormalizeRules,
) -> Result<NewEvent, ValidationError> {
    let title = cleaned(form.title.as_deref())
        .ok_or_else(|| ValidationError::new("title", ValidationReason::Missing))?;
    if title.chars().count() > rules.max_title_length {
        return Err(ValidationError::new(
            "title",
            ValidationReason::TooLong {
                max: rules.max_title_length,
            },
        ));
    }

    let external_url = cleaned(form.external_url.as_deref());
    if let Some(url) = &external_url {
        if !is_absolute_url(url) {
            return Err(ValidationError::new("external_url", ValidationReason::InvalidUrl));
        }
    }

    let description = cleaned(form.description.as_deref());

    let all_day = match cleaned(form.all_day.as_deref()) {
        Some(value) => Some(
            parse_bool(&value)
                .ok_or_else(|| ValidationError::new("all_day", ValidationReason::InvalidBoolean))?,
        ),
        None => None,
    };
    let date = parse_timestamp("date", form.date.as_deref())?;
    let start = parse_timestamp("start", form.start.as_deref())?;
    let end = parse_timestamp("end", form.end.as_deref())?;

    let minimum = Duration::seconds(rules.minimum_event_seconds);
    let (start, end, all_day) = match (start.or(date), end) {
        (Some(anchor), Some(end)) => {
            if all_day.unwrap_or(false) {
                (midnight(anchor), midnight(end), true)
            } else {
                (anchor, end, false)
            }
        }
        (Some(anchor), None) => {
            if all_day.unwrap_or_else(|| is_midnight(anchor)) {
                let day = midnight(anchor);
                (day, day, true)
            } else {
                let field = if start.is_some() { "start" } else { "date" };
                let end = anchor.checked_add_signed(minimum).ok_or_else(|| {
                    ValidationError::new(field, ValidationReason::InvalidTimestamp)
                })?;
                (anchor, end, false)
            }
        }
        (None, Some(_)) => {
            return Err(ValidationError::new("start", ValidationReason::Missing));
        }
        (None, None) => {
            let now = now.trunc_subsecs(0);
            if all_day == Some(false) {
                (now, now + minimum, false)
            } else {
                let day = midnight(now);
                (day, day, true)
            }
        }
    };

    if end < start {
        return Err(ValidationError::new("end", ValidationReason::EndBeforeStart));
    }
    if !all_day {
        let span = (end - start).num_seconds();
        if span < rules.minimum_event_seconds {
            return Err(ValidationError::new(
                "end",
                ValidationReason::TooShort {
                    min: rules.minimum_event_seconds,
                },
            ));
        }
        if span >= SECONDS_PER_DAY {
            return Err(ValidationError::new("end", ValidationReason::SpansFullDay));
        }
    }

    let tags = event_tags(&title, description.as_deref());
    Ok(NewEvent {
        title,
        description,
        external_url,
        start,
        end,
        all_day,
        tags,
    })
}

/// Parses an epoch-seconds timestamp, integer or decimal, truncated to whole
/// seconds. Blank values count as absent.
pub fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(value) = cleaned(value) else {
        return Ok(None);
    };
    let invalid = || ValidationError::new(field, ValidationReason::InvalidTimestamp);

    let seconds: f64 = value.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() {
        return Err(invalid());
    }
    DateTime::from_timestamp(seconds.trunc() as i64, 0)
        .map(Some)
        .ok_or_else(invalid)
}

/// Start of the UTC day containing `instant`.
pub fn midnight(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn is_midnight(instant: DateTime<Utc>) -> bool {
    instant.time() == NaiveTime::MIN
}

fn cleaned(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| url.host_str().is_some_and(|host| !host.is_empty()))
        .unwrap_or(false)
}
