//! String formats
//!
//! A format is checked during validation; the cast step then relies on the
//! check having passed, so a cast never fails on a validated value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").unwrap());

static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])T([01]\d|2[0-3]):[0-5]\d:[0-5]\d(\.\d+)?(Z|[+-]([01]\d|2[0-3]):[0-5]\d)$",
    )
    .unwrap()
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d(\.\d+)?(Z|[+-]([01]\d|2[0-3]):[0-5]\d)?$")
        .unwrap()
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

static BOOLEAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(true|false|0|1)$").unwrap());

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap());

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static INTEGER_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(,-?[0-9]+)*$").unwrap());

/// Named string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Date,
    DateTime,
    Time,
    Email,
    Boolean,
    Integer,
    Number,
    Symbol,
    Uuid,
    Ipv4,
    Ipv6,
    IntegerList,
    Binary,
}

impl StringFormat {
    pub const ALL: [StringFormat; 13] = [
        StringFormat::Date,
        StringFormat::DateTime,
        StringFormat::Time,
        StringFormat::Email,
        StringFormat::Boolean,
        StringFormat::Integer,
        StringFormat::Number,
        StringFormat::Symbol,
        StringFormat::Uuid,
        StringFormat::Ipv4,
        StringFormat::Ipv6,
        StringFormat::IntegerList,
        StringFormat::Binary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StringFormat::Date => "date",
            StringFormat::DateTime => "date-time",
            StringFormat::Time => "time",
            StringFormat::Email => "email",
            StringFormat::Boolean => "boolean",
            StringFormat::Integer => "integer",
            StringFormat::Number => "number",
            StringFormat::Symbol => "symbol",
            StringFormat::Uuid => "uuid",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::IntegerList => "integer-list",
            StringFormat::Binary => "binary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }

    pub fn matches(self, s: &str) -> bool {
        match self {
            StringFormat::Date => DATE_RE.is_match(s),
            StringFormat::DateTime => DATE_TIME_RE.is_match(s),
            StringFormat::Time => TIME_RE.is_match(s),
            StringFormat::Email => EMAIL_RE.is_match(s),
            StringFormat::Boolean => BOOLEAN_RE.is_match(s),
            StringFormat::Integer => INTEGER_RE.is_match(s) && s.parse::<i64>().is_ok(),
            StringFormat::Number => NUMBER_RE.is_match(s) && parse_number(s).is_some(),
            StringFormat::Symbol => !s.is_empty(),
            StringFormat::Uuid => UUID_RE.is_match(s),
            StringFormat::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            StringFormat::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            StringFormat::IntegerList => {
                INTEGER_LIST_RE.is_match(s) && s.split(',').all(|n| n.parse::<i64>().is_ok())
            }
            StringFormat::Binary => true,
        }
    }

    /// Convert a string that already passed [`matches`](Self::matches)
    pub fn cast(self, s: &str) -> Value {
        let fallback = || Value::String(s.to_string());
        match self {
            StringFormat::Integer => s.parse::<i64>().map(Value::from).unwrap_or_else(|_| fallback()),
            StringFormat::Number => parse_number(s).unwrap_or_else(fallback),
            StringFormat::Boolean => Value::Bool(matches!(s, "true" | "1")),
            StringFormat::IntegerList => s
                .split(',')
                .map(|n| n.parse::<i64>().map(Value::from).ok())
                .collect::<Option<Vec<_>>>()
                .map_or_else(fallback, Value::Array),
            _ => fallback(),
        }
    }
}

/// Integral strings become integers, everything else a float
pub(crate) fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    let f = s.parse::<f64>().ok()?;
    serde_json::Number::from_f64(f).map(Value::Number)
}
