//! Typed arithmetic over terms.
//!
//! Numbers of different kinds are promoted to the more accurate kind before
//! the operation, so `Integer + Float` yields a `Float` and `Integer /
//! Integer` is integer division. Integral results that do not fit the
//! promoted kind are an overflow error.
//!
//! Temporal terms follow calendar rules: durations shift dates by months
//! first, clamping to the last day of the month, then by whole days (the
//! part of a duration shorter than a day does not move a date); times of day
//! wrap at midnight; the difference of two dates, times or date-times is a
//! duration.

use std::cmp::Ordering;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::{EvalError, Result};
use crate::term::{Duration, Number, NumericKind, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }
}

/// `a + b`.
///
/// # Errors
///
/// [`EvalError::TypeMismatch`] for operands without a sum,
/// [`EvalError::NumericOverflow`] when the result is out of range.
pub fn add(a: &Term, b: &Term) -> Result<Term> {
    if let Some(result) = numeric(Op::Add, a, b) {
        return result;
    }
    let op = Op::Add;
    match (a, b) {
        (Term::Date(d), Term::Duration(p)) | (Term::Duration(p), Term::Date(d)) => {
            shift_date(*d, *p, op).map(Term::Date)
        }
        (Term::Time(t), Term::Duration(p)) | (Term::Duration(p), Term::Time(t)) => {
            shift_time(*t, *p, op).map(Term::Time)
        }
        (Term::DateTime(dt), Term::Duration(p)) | (Term::Duration(p), Term::DateTime(dt)) => {
            shift_datetime(*dt, *p, op).map(Term::DateTime)
        }
        (Term::Duration(x), Term::Duration(y)) => x
            .checked_add(*y)
            .map(Term::Duration)
            .ok_or_else(|| EvalError::overflow(op.name())),
        _ => Err(mismatch(op, a, b)),
    }
}

/// `a - b`.
///
/// # Errors
///
/// [`EvalError::TypeMismatch`] for operands without a difference,
/// [`EvalError::NumericOverflow`] when the result is out of range.
pub fn subtract(a: &Term, b: &Term) -> Result<Term> {
    if let Some(result) = numeric(Op::Subtract, a, b) {
        return result;
    }
    let op = Op::Subtract;
    match (a, b) {
        (Term::Date(d), Term::Duration(p)) => shift_date(*d, negated(*p, op)?, op).map(Term::Date),
        (Term::Time(t), Term::Duration(p)) => shift_time(*t, negated(*p, op)?, op).map(Term::Time),
        (Term::DateTime(dt), Term::Duration(p)) => {
            shift_datetime(*dt, negated(*p, op)?, op).map(Term::DateTime)
        }
        (Term::Date(x), Term::Date(y)) => x
            .signed_duration_since(*y)
            .num_days()
            .checked_mul(86_400)
            .map(|s| Term::Duration(Duration::from_parts(0, s)))
            .ok_or_else(|| EvalError::overflow(op.name())),
        (Term::Time(x), Term::Time(y)) => Ok(Term::Duration(Duration::from_parts(
            0,
            x.signed_duration_since(*y).num_seconds(),
        ))),
        (Term::DateTime(x), Term::DateTime(y)) => Ok(Term::Duration(Duration::from_parts(
            0,
            x.signed_duration_since(*y).num_seconds(),
        ))),
        (Term::Duration(x), Term::Duration(y)) => x
            .checked_sub(*y)
            .map(Term::Duration)
            .ok_or_else(|| EvalError::overflow(op.name())),
        _ => Err(mismatch(op, a, b)),
    }
}

/// `a * b`, defined for numbers only.
///
/// # Errors
///
/// [`EvalError::TypeMismatch`] for non-numeric operands,
/// [`EvalError::NumericOverflow`] when the result is out of range.
pub fn multiply(a: &Term, b: &Term) -> Result<Term> {
    numeric(Op::Multiply, a, b).unwrap_or_else(|| Err(mismatch(Op::Multiply, a, b)))
}

/// `a / b`, defined for numbers only. Integral operands divide with
/// truncation.
///
/// # Errors
///
/// [`EvalError::DivisionByZero`] for a zero divisor,
/// [`EvalError::TypeMismatch`] for non-numeric operands,
/// [`EvalError::NumericOverflow`] when the result is out of range.
pub fn divide(a: &Term, b: &Term) -> Result<Term> {
    numeric(Op::Divide, a, b).unwrap_or_else(|| Err(mismatch(Op::Divide, a, b)))
}

/// Whether two numbers hold the same value, whatever their kinds.
/// Non-numeric operands are never numerically equal.
#[must_use]
pub fn numbers_equal(a: &Term, b: &Term) -> bool {
    a.numeric_kind().is_some() && b.numeric_kind().is_some() && a.value_eq(b)
}

/// Equality used by the built-ins: numbers by value, everything else
/// structurally.
#[must_use]
pub fn equal(a: &Term, b: &Term) -> bool {
    numbers_equal(a, b) || a == b
}

/// Value ordering used by the built-ins; `None` for incomparable operands.
#[must_use]
pub fn compare(a: &Term, b: &Term) -> Option<Ordering> {
    a.compare_value(b)
}

fn mismatch(op: Op, a: &Term, b: &Term) -> EvalError {
    EvalError::TypeMismatch {
        operation: op.name(),
        left: a.kind(),
        right: b.kind(),
    }
}

// `None` when either operand is not a number.
fn numeric(op: Op, a: &Term, b: &Term) -> Option<Result<Term>> {
    let kind = a.numeric_kind()?.most_accurate(b.numeric_kind()?);
    let (x, y) = (a.number()?, b.number()?);
    if op == Op::Divide && y.as_f64() == 0.0 {
        return Some(Err(EvalError::DivisionByZero));
    }
    Some(if kind.is_integral() {
        integral(op, kind, x, y)
    } else {
        Ok(real(op, kind, x.as_f64(), y.as_f64()))
    })
}

fn integral(op: Op, kind: NumericKind, x: Number, y: Number) -> Result<Term> {
    let (Number::Integral(x), Number::Integral(y)) = (x, y) else {
        return Err(EvalError::overflow(op.name()));
    };
    let value = match op {
        Op::Add => x.checked_add(y),
        Op::Subtract => x.checked_sub(y),
        Op::Multiply => x.checked_mul(y),
        Op::Divide => x.checked_div(y),
    }
    .ok_or_else(|| EvalError::overflow(op.name()))?;
    let narrowed = match kind {
        NumericKind::Short => i16::try_from(value).ok().map(Term::Short),
        NumericKind::Integer => i32::try_from(value).ok().map(Term::Integer),
        _ => Some(Term::Long(value)),
    };
    narrowed.ok_or_else(|| EvalError::overflow(op.name()))
}

#[allow(clippy::cast_possible_truncation)]
fn real(op: Op, kind: NumericKind, x: f64, y: f64) -> Term {
    let value = match op {
        Op::Add => x + y,
        Op::Subtract => x - y,
        Op::Multiply => x * y,
        Op::Divide => x / y,
    };
    match kind {
        NumericKind::Float => Term::Float(value as f32),
        NumericKind::Decimal => Term::Decimal(value),
        _ => Term::Double(value),
    }
}

fn negated(duration: Duration, op: Op) -> Result<Duration> {
    duration
        .checked_neg()
        .ok_or_else(|| EvalError::overflow(op.name()))
}

fn months(count: i32) -> Months {
    Months::new(count.unsigned_abs())
}

fn shift_date(date: NaiveDate, by: Duration, op: Op) -> Result<NaiveDate> {
    let m = by.total_months();
    let moved = if m >= 0 {
        date.checked_add_months(months(m))
    } else {
        date.checked_sub_months(months(m))
    };
    moved
        .and_then(|d| d.checked_add_signed(TimeDelta::try_days(by.total_seconds() / 86_400)?))
        .ok_or_else(|| EvalError::overflow(op.name()))
}

fn shift_datetime(datetime: NaiveDateTime, by: Duration, op: Op) -> Result<NaiveDateTime> {
    let m = by.total_months();
    let moved = if m >= 0 {
        datetime.checked_add_months(months(m))
    } else {
        datetime.checked_sub_months(months(m))
    };
    moved
        .and_then(|dt| dt.checked_add_signed(TimeDelta::try_seconds(by.total_seconds())?))
        .ok_or_else(|| EvalError::overflow(op.name()))
}

// Months have no meaning for a time of day and are ignored.
fn shift_time(time: NaiveTime, by: Duration, op: Op) -> Result<NaiveTime> {
    let delta = TimeDelta::try_seconds(by.total_seconds().rem_euclid(86_400))
        .ok_or_else(|| EvalError::overflow(op.name()))?;
    Ok(time.overflowing_add_signed(delta).0)
}
