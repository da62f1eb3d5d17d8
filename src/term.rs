//! Terms: the values stored in tuple columns.
//!
//! A [`Term`] is a variable, a constant of one of the supported data types,
//! or a constructed term `f(t1, ..., tn)`. Terms carry a total order that is
//! shared by sorting, deduplication and equality; [`Term::compare_value`]
//! layers the partial, value-based comparison used by join conditions and
//! comparison built-ins on top of it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use base64::Engine as _;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Numeric data types, ordered from least to most accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumericKind {
    /// 16 bit signed integer
    Short,
    /// 32 bit signed integer
    Integer,
    /// 64 bit signed integer
    Long,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Decimal, carried at double precision
    Decimal,
}

impl NumericKind {
    /// The more accurate of two kinds; arithmetic results take this kind.
    #[must_use]
    pub fn most_accurate(self, other: Self) -> Self {
        self.max(other)
    }

    /// Whether values of this kind are whole numbers.
    #[must_use]
    pub fn is_integral(self) -> bool {
        matches!(self, Self::Short | Self::Integer | Self::Long)
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a term, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    /// A variable
    Variable,
    /// A number of the given kind
    Numeric(NumericKind),
    /// A boolean
    Boolean,
    /// A string
    String,
    /// An IRI
    Iri,
    /// A qualified name
    QName,
    /// A calendar date
    Date,
    /// A time of day
    Time,
    /// A date and time
    DateTime,
    /// A duration
    Duration,
    /// Hex encoded binary data
    HexBinary,
    /// Base64 encoded binary data
    Base64Binary,
    /// A constructed term
    Constructed,
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Variable => "variable",
            Self::Numeric(kind) => return kind.fmt(f),
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Iri => "iri",
            Self::QName => "qname",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::HexBinary => "hexbinary",
            Self::Base64Binary => "base64binary",
            Self::Constructed => "constructed",
        };
        f.write_str(name)
    }
}

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// A span of time split into a calendar part and an exact part.
///
/// Years and months cannot be converted to seconds without a reference
/// date, so they are kept apart: `months` carries years and months,
/// `seconds` carries days, hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    months: i32,
    seconds: i64,
}

impl Duration {
    /// Builds a duration from its components. Components may be negative.
    #[must_use]
    pub fn new(years: i32, months: i32, days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            months: years * 12 + months,
            seconds: days * SECONDS_PER_DAY
                + hours * SECONDS_PER_HOUR
                + minutes * SECONDS_PER_MINUTE
                + seconds,
        }
    }

    /// Builds a duration from a total month count and a total second count.
    #[must_use]
    pub fn from_parts(months: i32, seconds: i64) -> Self {
        Self { months, seconds }
    }

    /// Total calendar months, including whole years.
    #[must_use]
    pub fn total_months(&self) -> i32 {
        self.months
    }

    /// Total exact seconds, including days, hours and minutes.
    #[must_use]
    pub fn total_seconds(&self) -> i64 {
        self.seconds
    }

    /// Whole years.
    #[must_use]
    pub fn years(&self) -> i32 {
        self.months / 12
    }

    /// Months beyond the whole years.
    #[must_use]
    pub fn months(&self) -> i32 {
        self.months % 12
    }

    /// Whole days.
    #[must_use]
    pub fn days(&self) -> i64 {
        self.seconds / SECONDS_PER_DAY
    }

    /// Hours beyond the whole days.
    #[must_use]
    pub fn hours(&self) -> i64 {
        self.seconds % SECONDS_PER_DAY / SECONDS_PER_HOUR
    }

    /// Minutes beyond the whole hours.
    #[must_use]
    pub fn minutes(&self) -> i64 {
        self.seconds % SECONDS_PER_HOUR / SECONDS_PER_MINUTE
    }

    /// Seconds beyond the whole minutes.
    #[must_use]
    pub fn seconds(&self) -> i64 {
        self.seconds % SECONDS_PER_MINUTE
    }

    /// Component-wise sum, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_add(other.months)?,
            seconds: self.seconds.checked_add(other.seconds)?,
        })
    }

    /// Component-wise difference, `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_sub(other.months)?,
            seconds: self.seconds.checked_sub(other.seconds)?,
        })
    }

    /// The same span pointing the other way, `None` on overflow.
    #[must_use]
    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_neg()?,
            seconds: self.seconds.checked_neg()?,
        })
    }

    fn is_negative(&self) -> bool {
        self.months < 0 || (self.months == 0 && self.seconds < 0)
    }
}

impl fmt::Display for Duration {
    /// ISO 8601 form, e.g. `P1Y2M3DT4H5M6S`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let months = self.months.unsigned_abs();
        let seconds = self.seconds.unsigned_abs();
        f.write_str("P")?;
        if months >= 12 {
            write!(f, "{}Y", months / 12)?;
        }
        if months % 12 != 0 {
            write!(f, "{}M", months % 12)?;
        }
        let (days, rest) = (seconds / 86_400, seconds % 86_400);
        if days != 0 {
            write!(f, "{days}D")?;
        }
        if rest != 0 {
            f.write_str("T")?;
            let (h, m, s) = (rest / 3_600, rest % 3_600 / 60, rest % 60);
            if h != 0 {
                write!(f, "{h}H")?;
            }
            if m != 0 {
                write!(f, "{m}M")?;
            }
            if s != 0 {
                write!(f, "{s}S")?;
            }
        }
        if months == 0 && seconds == 0 {
            f.write_str("T0S")?;
        }
        Ok(())
    }
}

/// A term stored in a tuple column.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Term {
    /// A named variable
    Variable(String),
    /// 16 bit integer constant
    Short(i16),
    /// 32 bit integer constant
    Integer(i32),
    /// 64 bit integer constant
    Long(i64),
    /// Single precision constant
    Float(f32),
    /// Double precision constant
    Double(f64),
    /// Decimal constant
    Decimal(f64),
    /// Boolean constant
    Boolean(bool),
    /// String constant
    String(String),
    /// IRI constant
    Iri(String),
    /// Qualified name `prefix:local`
    QName {
        /// Namespace prefix
        prefix: String,
        /// Local part
        local: String,
    },
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time
    DateTime(NaiveDateTime),
    /// Duration
    Duration(Duration),
    /// Binary data written in hex
    HexBinary(Vec<u8>),
    /// Binary data written in base64
    Base64Binary(Vec<u8>),
    /// Constructed term `functor(args...)`
    Constructed {
        /// Function symbol
        functor: String,
        /// Arguments
        args: Vec<Term>,
    },
}

/// Numeric payload of a term, widened for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Integral(i64),
    Real(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Self::Integral(v) => v as f64,
            Self::Real(v) => v,
        }
    }

    // Exact: an integer is never rounded to compare it with a real, so
    // value equality stays transitive above 2^53.
    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integral(a), Self::Integral(b)) => Some(a.cmp(&b)),
            (Self::Integral(a), Self::Real(b)) => integral_against_real(a, b),
            (Self::Real(a), Self::Integral(b)) => {
                integral_against_real(b, a).map(Ordering::reverse)
            }
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(&b),
        }
    }

    // Total version of `compare`; NaN falls back to the f64 total order.
    fn total_cmp(self, other: Self) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.as_f64().total_cmp(&other.as_f64()))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral_against_real(int: i64, real: f64) -> Option<Ordering> {
    // 2^63; every real at or above it exceeds every i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if real.is_nan() {
        return None;
    }
    if real >= LIMIT {
        return Some(Ordering::Less);
    }
    if real < -LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = real.trunc();
    let fraction = real - whole;
    let beyond = if fraction > 0.0 {
        Ordering::Less
    } else if fraction < 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    };
    // In range, so the cast is exact.
    Some(int.cmp(&(whole as i64)).then(beyond))
}

impl Term {
    /// A variable with the given name.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// A string constant.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// An IRI constant.
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri(value.into())
    }

    /// A qualified name.
    pub fn qname(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self::QName {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// A constructed term.
    pub fn constructed(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Self::Constructed {
            functor: functor.into(),
            args,
        }
    }

    /// A date constant, `None` when the date does not exist.
    #[must_use]
    pub fn date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::Date)
    }

    /// A time constant, `None` when out of range.
    #[must_use]
    pub fn time(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(Self::Time)
    }

    /// A date-time constant, `None` when out of range.
    #[must_use]
    pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Self::DateTime)
    }

    /// Parses hex text into a binary constant.
    pub fn hex_binary(text: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(text).map(Self::HexBinary)
    }

    /// Parses standard base64 text into a binary constant.
    pub fn base64_binary(text: &str) -> Result<Self, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD
            .decode(text)
            .map(Self::Base64Binary)
    }

    /// The kind of this term.
    #[must_use]
    pub fn kind(&self) -> TermKind {
        match self {
            Self::Variable(_) => TermKind::Variable,
            Self::Short(_) => TermKind::Numeric(NumericKind::Short),
            Self::Integer(_) => TermKind::Numeric(NumericKind::Integer),
            Self::Long(_) => TermKind::Numeric(NumericKind::Long),
            Self::Float(_) => TermKind::Numeric(NumericKind::Float),
            Self::Double(_) => TermKind::Numeric(NumericKind::Double),
            Self::Decimal(_) => TermKind::Numeric(NumericKind::Decimal),
            Self::Boolean(_) => TermKind::Boolean,
            Self::String(_) => TermKind::String,
            Self::Iri(_) => TermKind::Iri,
            Self::QName { .. } => TermKind::QName,
            Self::Date(_) => TermKind::Date,
            Self::Time(_) => TermKind::Time,
            Self::DateTime(_) => TermKind::DateTime,
            Self::Duration(_) => TermKind::Duration,
            Self::HexBinary(_) => TermKind::HexBinary,
            Self::Base64Binary(_) => TermKind::Base64Binary,
            Self::Constructed { .. } => TermKind::Constructed,
        }
    }

    /// The numeric kind, if this term is a number.
    #[must_use]
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self.kind() {
            TermKind::Numeric(kind) => Some(kind),
            _ => None,
        }
    }

    pub(crate) fn number(&self) -> Option<Number> {
        match *self {
            Self::Short(v) => Some(Number::Integral(i64::from(v))),
            Self::Integer(v) => Some(Number::Integral(i64::from(v))),
            Self::Long(v) => Some(Number::Integral(v)),
            Self::Float(v) => Some(Number::Real(f64::from(v))),
            Self::Double(v) | Self::Decimal(v) => Some(Number::Real(v)),
            _ => None,
        }
    }

    /// Whether this term is a variable.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// The variable name, if this term is a variable.
    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the term contains no variables.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Variable(_) => false,
            Self::Constructed { args, .. } => args.iter().all(Term::is_ground),
            _ => true,
        }
    }

    /// Adds the variables of this term to `out`, in order of first appearance.
    pub fn collect_variables(&self, out: &mut IndexSet<String>) {
        match self {
            Self::Variable(name) => {
                out.insert(name.clone());
            }
            Self::Constructed { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
            _ => {}
        }
    }

    /// The distinct variables of this term, in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        self.collect_variables(&mut out);
        out
    }

    /// Value-based comparison.
    ///
    /// Numbers compare by value across numeric kinds; every other pair
    /// compares only within its own kind. Returns `None` for variables and
    /// for pairs of kinds with no common order.
    #[must_use]
    pub fn compare_value(&self, other: &Term) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.number(), other.number()) {
            return a.compare(b);
        }
        if self.is_variable() || other.is_variable() || self.class_rank() != other.class_rank() {
            return None;
        }
        Some(self.cmp(other))
    }

    /// Value-based equality: `1` and `1.0` are equal, `'a'` and `1` are not.
    #[must_use]
    pub fn value_eq(&self, other: &Term) -> bool {
        self.compare_value(other) == Some(Ordering::Equal)
    }

    fn class_rank(&self) -> u8 {
        match self {
            Self::Variable(_) => 0,
            Self::Short(_)
            | Self::Integer(_)
            | Self::Long(_)
            | Self::Float(_)
            | Self::Double(_)
            | Self::Decimal(_) => 1,
            Self::Boolean(_) => 2,
            Self::String(_) => 3,
            Self::Iri(_) => 4,
            Self::QName { .. } => 5,
            Self::Date(_) => 6,
            Self::Time(_) => 7,
            Self::DateTime(_) => 8,
            Self::Duration(_) => 9,
            Self::HexBinary(_) => 10,
            Self::Base64Binary(_) => 11,
            Self::Constructed { .. } => 12,
        }
    }

    // Numbers first compare by exact value, then by kind, then by bits
    // within the kind, so value-equal numbers form one contiguous run.
    fn cmp_numeric(&self, other: &Term) -> Ordering {
        let (Some(a), Some(b)) = (self.number(), other.number()) else {
            return Ordering::Equal;
        };
        a.total_cmp(b)
            .then_with(|| self.numeric_kind().cmp(&other.numeric_kind()))
            .then_with(|| match (a, b) {
                (Number::Integral(x), Number::Integral(y)) => x.cmp(&y),
                (Number::Real(x), Number::Real(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            })
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.class_rank().cmp(&other.class_rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Self::Variable(a), Self::Variable(b))
            | (Self::String(a), Self::String(b))
            | (Self::Iri(a), Self::Iri(b)) => a.cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (
                Self::QName {
                    prefix: p1,
                    local: l1,
                },
                Self::QName {
                    prefix: p2,
                    local: l2,
                },
            ) => p1.cmp(p2).then_with(|| l1.cmp(l2)),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Duration(a), Self::Duration(b)) => a.cmp(b),
            (Self::HexBinary(a), Self::HexBinary(b))
            | (Self::Base64Binary(a), Self::Base64Binary(b)) => a.cmp(b),
            (
                Self::Constructed {
                    functor: f1,
                    args: a1,
                },
                Self::Constructed {
                    functor: f2,
                    args: a2,
                },
            ) => f1
                .cmp(f2)
                .then_with(|| a1.len().cmp(&a2.len()))
                .then_with(|| a1.cmp(a2)),
            _ => self.cmp_numeric(other),
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Variable(v) | Self::String(v) | Self::Iri(v) => v.hash(state),
            Self::Short(v) => v.hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Double(v) | Self::Decimal(v) => v.to_bits().hash(state),
            Self::Boolean(v) => v.hash(state),
            Self::QName { prefix, local } => {
                prefix.hash(state);
                local.hash(state);
            }
            Self::Date(v) => v.hash(state),
            Self::Time(v) => v.hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::Duration(v) => v.hash(state),
            Self::HexBinary(v) | Self::Base64Binary(v) => v.hash(state),
            Self::Constructed { functor, args } => {
                functor.hash(state);
                args.hash(state);
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "?{name}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Double(v) | Self::Decimal(v) => write!(f, "{v:?}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "'{v}'"),
            Self::Iri(v) => write!(f, "<{v}>"),
            Self::QName { prefix, local } => write!(f, "{prefix}:{local}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
            Self::Duration(v) => write!(f, "{v}"),
            Self::HexBinary(v) => f.write_str(&hex::encode_upper(v)),
            Self::Base64Binary(v) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(v))
            }
            Self::Constructed { functor, args } => {
                write!(f, "{functor}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<i16> for Term {
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for Term {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Duration> for Term {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_sort_before_constants() {
        let mut terms = vec![
            Term::string("a"),
            Term::Integer(3),
            Term::var("X"),
            Term::Boolean(false),
        ];
        terms.sort();
        assert_eq!(terms[0], Term::var("X"), "Variables should come first");
        assert_eq!(terms[1], Term::Integer(3), "Numbers should follow variables");
    }

    #[test]
    fn test_numbers_order_by_value_across_kinds() {
        let mut terms = vec![
            Term::Double(2.5),
            Term::Integer(3),
            Term::Short(-1),
            Term::Long(2),
        ];
        terms.sort();
        assert_eq!(
            terms,
            vec![
                Term::Short(-1),
                Term::Long(2),
                Term::Double(2.5),
                Term::Integer(3),
            ]
        );
    }

    #[test]
    fn test_structural_equality_distinguishes_kinds() {
        assert_ne!(Term::Integer(1), Term::Double(1.0));
        assert!(Term::Integer(1).value_eq(&Term::Double(1.0)));
        assert!(Term::Integer(1) < Term::Double(1.0), "Ties order by accuracy");
    }

    #[test]
    fn test_compare_value_rejects_mixed_kinds() {
        assert_eq!(Term::string("a").compare_value(&Term::Integer(1)), None);
        assert_eq!(Term::var("X").compare_value(&Term::var("X")), None);
        assert_eq!(
            Term::string("a").compare_value(&Term::string("b")),
            Some(Ordering::Less)
        );
        assert_eq!(
            Term::Float(2.0).compare_value(&Term::Long(1)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_large_longs_keep_exact_order() {
        let a = Term::Long(i64::MAX - 1);
        let b = Term::Long(i64::MAX);
        assert!(a < b, "Exact comparison should break f64 ties");
        assert_eq!(a.compare_value(&b), Some(Ordering::Less));
    }

    #[test]
    fn test_longs_and_doubles_compare_exactly() {
        let two_53 = 9_007_199_254_740_992_i64;
        let above = Term::Long(two_53 + 1);
        let real = Term::Double(9_007_199_254_740_992.0);
        assert_eq!(above.compare_value(&real), Some(Ordering::Greater));
        assert_eq!(real.compare_value(&above), Some(Ordering::Less));
        assert!(Term::Long(two_53).value_eq(&real));

        let mut terms = vec![above.clone(), real.clone(), Term::Long(two_53)];
        terms.sort();
        assert_eq!(terms, vec![Term::Long(two_53), real, above]);

        assert_eq!(
            Term::Long(i64::MAX).compare_value(&Term::Double(9.223_372_036_854_775_808e18)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Term::Integer(-2).compare_value(&Term::Double(-1.5)),
            Some(Ordering::Less)
        );
        assert_eq!(Term::Integer(1).compare_value(&Term::Double(f64::NAN)), None);
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        use std::collections::HashSet;

        let set: HashSet<Term> = [
            Term::Double(1.5),
            Term::Double(1.5),
            Term::Integer(1),
            Term::Long(1),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_groundness_and_variables() {
        let t = Term::constructed(
            "f",
            vec![Term::var("X"), Term::constructed("g", vec![Term::var("Y"), Term::var("X")])],
        );
        assert!(!t.is_ground());
        let vars: Vec<String> = t.variables().into_iter().collect();
        assert_eq!(vars, vec!["X".to_string(), "Y".to_string()]);
        assert!(Term::constructed("f", vec![Term::Integer(1)]).is_ground());
    }

    #[test]
    fn test_display_forms() {
        let t = Term::constructed("f", vec![Term::var("X"), Term::string("a"), Term::Integer(3)]);
        assert_eq!(t.to_string(), "f(?X, 'a', 3)");
        assert_eq!(Term::Double(2.0).to_string(), "2.0");
        assert_eq!(Term::date(2005, 2, 28).map(|d| d.to_string()), Some("2005-02-28".to_string()));
        assert_eq!(Term::qname("foaf", "name").to_string(), "foaf:name");
    }

    #[test]
    fn test_binary_terms_parse_and_print() {
        let hex = Term::hex_binary("0fb7").expect("valid hex");
        assert_eq!(hex, Term::HexBinary(vec![0x0f, 0xb7]));
        assert_eq!(hex.to_string(), "0FB7");

        let b64 = Term::base64_binary("aGVsbG8=").expect("valid base64");
        assert_eq!(b64, Term::Base64Binary(b"hello".to_vec()));
        assert_eq!(b64.to_string(), "aGVsbG8=");

        assert!(Term::hex_binary("xyz").is_err());
    }

    #[test]
    fn test_duration_components() {
        let d = Duration::new(1, 14, 3, 4, 5, 6);
        assert_eq!(d.years(), 2);
        assert_eq!(d.months(), 2);
        assert_eq!(d.days(), 3);
        assert_eq!(d.hours(), 4);
        assert_eq!(d.minutes(), 5);
        assert_eq!(d.seconds(), 6);
        assert_eq!(d.to_string(), "P2Y2M3DT4H5M6S");
        assert_eq!(Duration::new(0, 0, 1, 0, 0, 0), Duration::new(0, 0, 0, 24, 0, 0));
        assert_eq!(Duration::default().to_string(), "PT0S");
        let neg = Duration::new(0, 0, 0, -1, 0, 0);
        assert_eq!(neg.to_string(), "-PT1H");
    }
}
