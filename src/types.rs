//! Column type model: the ordered semantic-type table with matchers and converters.
//!
//! A [`TypeTable`] is an explicit, immutable, ordered list of [`TypeSpec`]s walked
//! during inference (most specific first, [`ColumnType::Text`] as the terminating
//! fallback). The same table supplies the converters used by the batch loader, so
//! "matched during sampling" and "convertible during load" agree by construction.
//! Callers pass the table in; nothing here is process-global, and tests can
//! substitute alternate tables.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Canonical textual grammar for [`ColumnType::Date`] literals.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical textual grammar for [`ColumnType::Time`] literals.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Canonical textual grammar for [`ColumnType::DateTime`] literals
/// (fractional seconds optional).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Semantic column types, ordered most- to least-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Case-insensitive `true`/`false`.
    Boolean,
    /// 64-bit signed integer.
    Integer,
    /// Arbitrary-precision decimal.
    Floating,
    /// Calendar date (`%Y-%m-%d`).
    Date,
    /// Wall-clock time (`%H:%M:%S`).
    Time,
    /// Date plus time (`%Y-%m-%d %H:%M:%S`, optional fraction).
    DateTime,
    /// Universal fallback; matches anything.
    Text,
}

impl ColumnType {
    /// SQL type used for this column in the destination table.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "bigint",
            Self::Floating => "numeric",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "timestamp",
            Self::Text => "text",
        }
    }
}

/// A single named, typed column in an inferred schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name, taken verbatim from the header.
    pub name: String,
    /// Semantic type assigned by inference.
    pub column_type: ColumnType,
}

impl ColumnInfo {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A typed runtime value produced by a converter.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing/empty cell, loaded as SQL NULL.
    Null,
    Bool(bool),
    Int(i64),
    Decimal(BigDecimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_int(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_decimal(self) -> Option<BigDecimal> {
        match self {
            Self::Decimal(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_time(self) -> Option<NaiveTime> {
        match self {
            Self::Time(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_timestamp(self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Renders the value back in its canonical literal form ([`CellValue::Null`] is the
/// empty literal).
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Time(v) => write!(f, "{}", v.format(TIME_FORMAT)),
            Self::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// One entry in a [`TypeTable`]: a semantic type plus its matcher and converter.
///
/// For every type except `Text` the matcher is exactly "the converter succeeds";
/// `Text`'s matcher always succeeds.
#[derive(Clone, Copy)]
pub struct TypeSpec {
    pub column_type: ColumnType,
    matcher: fn(&str) -> bool,
    converter: fn(&str) -> Result<CellValue, String>,
}

impl TypeSpec {
    pub fn new(
        column_type: ColumnType,
        matcher: fn(&str) -> bool,
        converter: fn(&str) -> Result<CellValue, String>,
    ) -> Self {
        Self {
            column_type,
            matcher,
            converter,
        }
    }

    /// Does this literal satisfy the type's syntax?
    pub fn matches(&self, literal: &str) -> bool {
        (self.matcher)(literal)
    }

    /// Parse a validated literal into its runtime value.
    pub fn convert(&self, literal: &str) -> Result<CellValue, String> {
        (self.converter)(literal)
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSpec")
            .field("column_type", &self.column_type)
            .finish()
    }
}

/// Immutable, ordered matcher/converter table walked during inference.
#[derive(Debug, Clone)]
pub struct TypeTable {
    specs: Vec<TypeSpec>,
}

impl TypeTable {
    /// Create a table from an ordered spec list.
    ///
    /// The last entry acts as the inference fallback and should match every
    /// literal (the default table ends with `Text`).
    ///
    /// # Panics
    ///
    /// Panics if `specs` is empty.
    pub fn new(specs: Vec<TypeSpec>) -> Self {
        assert!(!specs.is_empty(), "type table must have at least one spec");
        Self { specs }
    }

    /// Specs in precedence order.
    pub fn specs(&self) -> &[TypeSpec] {
        &self.specs
    }

    /// The terminating fallback spec (last entry).
    pub fn fallback(&self) -> &TypeSpec {
        self.specs.last().expect("type table is non-empty")
    }

    /// Look up the spec for an assigned column type.
    pub fn spec_for(&self, column_type: ColumnType) -> Option<&TypeSpec> {
        self.specs.iter().find(|s| s.column_type == column_type)
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new(vec![
            TypeSpec::new(ColumnType::Boolean, matches_boolean, convert_boolean),
            TypeSpec::new(ColumnType::Integer, matches_integer, convert_integer),
            TypeSpec::new(ColumnType::Floating, matches_floating, convert_floating),
            TypeSpec::new(ColumnType::Date, matches_date, convert_date),
            TypeSpec::new(ColumnType::Time, matches_time, convert_time),
            TypeSpec::new(ColumnType::DateTime, matches_datetime, convert_datetime),
            TypeSpec::new(ColumnType::Text, matches_text, convert_text),
        ])
    }
}

fn convert_boolean(v: &str) -> Result<CellValue, String> {
    if v.eq_ignore_ascii_case("true") {
        Ok(CellValue::Bool(true))
    } else if v.eq_ignore_ascii_case("false") {
        Ok(CellValue::Bool(false))
    } else {
        Err("expected boolean literal (true/false)".to_string())
    }
}

fn matches_boolean(v: &str) -> bool {
    convert_boolean(v).is_ok()
}

fn convert_integer(v: &str) -> Result<CellValue, String> {
    v.parse::<i64>().map(CellValue::Int).map_err(|e| e.to_string())
}

fn matches_integer(v: &str) -> bool {
    convert_integer(v).is_ok()
}

fn convert_floating(v: &str) -> Result<CellValue, String> {
    BigDecimal::from_str(v)
        .map(CellValue::Decimal)
        .map_err(|e| e.to_string())
}

fn matches_floating(v: &str) -> bool {
    convert_floating(v).is_ok()
}

fn convert_date(v: &str) -> Result<CellValue, String> {
    NaiveDate::parse_from_str(v, DATE_FORMAT)
        .map(CellValue::Date)
        .map_err(|e| e.to_string())
}

fn matches_date(v: &str) -> bool {
    convert_date(v).is_ok()
}

fn convert_time(v: &str) -> Result<CellValue, String> {
    NaiveTime::parse_from_str(v, TIME_FORMAT)
        .map(CellValue::Time)
        .map_err(|e| e.to_string())
}

fn matches_time(v: &str) -> bool {
    convert_time(v).is_ok()
}

fn convert_datetime(v: &str) -> Result<CellValue, String> {
    NaiveDateTime::parse_from_str(v, TIMESTAMP_FORMAT)
        .map(CellValue::Timestamp)
        .map_err(|e| e.to_string())
}

fn matches_datetime(v: &str) -> bool {
    convert_datetime(v).is_ok()
}

fn convert_text(v: &str) -> Result<CellValue, String> {
    Ok(CellValue::Text(v.to_owned()))
}

fn matches_text(_v: &str) -> bool {
    true
}
