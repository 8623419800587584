//! Individual field rules and their messages.

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::attachments::decode_payload;
use crate::domain::ports::ColumnRef;

/// One declarative check applied to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Present and not blank.
    Required,
    /// A JSON string.
    String,
    /// A number or numeric string.
    Numeric,
    /// An integer or integer string.
    Integer,
    /// An email address.
    Email,
    /// A JSON array.
    Array,
    /// A base64 payload, optionally behind a `data:` URI header.
    Base64,
    /// Lower bound on length, value, or item count.
    Min(u32),
    /// Upper bound on length, value, or item count.
    Max(u32),
    /// A `d/m/Y` date that re-formats to the same text.
    DateDmy,
    /// One of a fixed set of strings.
    In(&'static [&'static str]),
    /// Some stored row holds the value.
    Exists(ColumnRef),
    /// No stored row other than `except_id` holds the value.
    Unique {
        /// Column to search.
        column: ColumnRef,
        /// Row allowed to hold the value already.
        except_id: Option<i64>,
    },
}

/// How a field's size is measured by `min`/`max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SizeKind {
    Characters,
    Value,
    Items,
}

/// Whether a value counts as absent for rule evaluation.
pub(super) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

pub(super) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub(super) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|n| n.fract() == 0.0 && n.abs() < 9.0e15)
                .map(|n| n as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Text form of a scalar for lookups.
pub(super) fn as_lookup_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

fn is_dmy_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
        .map(|date| date.format("%d/%m/%Y").to_string() == text)
        .unwrap_or(false)
}

fn size_of(value: &Value, kind: SizeKind) -> Option<f64> {
    match (kind, value) {
        (SizeKind::Items, Value::Array(items)) => Some(items.len() as f64),
        (SizeKind::Value, other) => as_number(other),
        (_, Value::String(text)) => Some(text.chars().count() as f64),
        (_, Value::Array(items)) => Some(items.len() as f64),
        (_, other) => as_number(other),
    }
}

impl Rule {
    /// Evaluate a rule that needs no stored data. Returns `None` for
    /// `Exists`/`Unique`, which the validator resolves through a lookup.
    pub(super) fn check_local(&self, value: &Value, size: SizeKind) -> Option<bool> {
        let passes = match self {
            Self::Required => !is_blank(Some(value)),
            Self::String => value.is_string(),
            Self::Numeric => as_number(value).is_some(),
            Self::Integer => as_integer(value).is_some(),
            Self::Email => value.as_str().is_some_and(is_email),
            Self::Array => value.is_array(),
            Self::Base64 => value.as_str().is_some_and(|text| decode_payload(text).is_ok()),
            Self::Min(min) => size_of(value, size).is_some_and(|n| n >= f64::from(*min)),
            Self::Max(max) => size_of(value, size).is_some_and(|n| n <= f64::from(*max)),
            Self::DateDmy => value.as_str().is_some_and(is_dmy_date),
            Self::In(allowed) => value
                .as_str()
                .is_some_and(|text| allowed.contains(&text)),
            Self::Exists(_) | Self::Unique { .. } => return None,
        };
        Some(passes)
    }

    /// Message reported when this rule fails for `attribute`.
    pub(super) fn message(&self, attribute: &str, size: SizeKind) -> String {
        match self {
            Self::Required => format!("The {attribute} field is required."),
            Self::String => format!("The {attribute} must be a string."),
            Self::Numeric => format!("The {attribute} must be a number."),
            Self::Integer => format!("The {attribute} must be an integer."),
            Self::Email => format!("The {attribute} must be a valid email address."),
            Self::Array => format!("The {attribute} must be an array."),
            Self::Base64 => format!("The {attribute} must be a valid base64 payload."),
            Self::Min(min) => match size {
                SizeKind::Characters => {
                    format!("The {attribute} must be at least {min} characters.")
                }
                SizeKind::Value => format!("The {attribute} must be at least {min}."),
                SizeKind::Items => format!("The {attribute} must have at least {min} items."),
            },
            Self::Max(max) => match size {
                SizeKind::Characters => {
                    format!("The {attribute} must not be greater than {max} characters.")
                }
                SizeKind::Value => format!("The {attribute} must not be greater than {max}."),
                SizeKind::Items => {
                    format!("The {attribute} must not have more than {max} items.")
                }
            },
            Self::DateDmy => format!("The {attribute} does not match the format d/m/Y."),
            Self::In(_) | Self::Exists(_) => format!("The selected {attribute} is invalid."),
            Self::Unique { .. } => format!("The {attribute} has already been taken."),
        }
    }
}

/// Size measure for a field, from its other rules.
pub(super) fn size_kind(rules: &[Rule]) -> SizeKind {
    if rules
        .iter()
        .any(|rule| matches!(rule, Rule::Numeric | Rule::Integer))
    {
        SizeKind::Value
    } else if rules.iter().any(|rule| matches!(rule, Rule::Array)) {
        SizeKind::Items
    } else {
        SizeKind::Characters
    }
}
