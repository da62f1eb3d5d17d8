//! Error type shared by every operator and built-in.

use thiserror::Error;

use crate::term::TermKind;

/// Result alias used throughout the crate.
pub type Result<T, E = EvalError> = std::result::Result<T, E>;

/// Failures raised while evaluating relational operators and built-ins.
///
/// "No result" outcomes (a join that matches nothing, a comparison that is
/// false, a built-in with no solution) are never errors; they surface as
/// empty relations or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// An operator was invoked with arguments that violate its contract.
    #[error("{operation}: {reason}")]
    Precondition {
        /// Operator that rejected its input
        operation: &'static str,
        /// Human readable description of the violation
        reason: String,
    },

    /// A built-in was asked to resolve more unknown positions than it can.
    #[error("built-in {predicate} cannot resolve {unknowns} unknown position(s), at most {supported}")]
    UnsupportedUnknowns {
        /// Name of the built-in predicate
        predicate: &'static str,
        /// Number of positions left unbound after binding
        unknowns: usize,
        /// Number of positions the predicate can compute
        supported: usize,
    },

    /// An algebraic operation is not defined for the operand kinds.
    #[error("{operation} is not defined between {left} and {right}")]
    TypeMismatch {
        /// Operation that was attempted
        operation: &'static str,
        /// Kind of the left operand
        left: TermKind,
        /// Kind of the right operand
        right: TermKind,
    },

    /// Result does not fit the target numeric or calendar range.
    #[error("{operation} overflowed")]
    NumericOverflow {
        /// Operation that overflowed
        operation: &'static str,
    },

    /// Division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// No built-in is registered under the given name and arity.
    #[error("no built-in {name}/{arity} is registered")]
    UnknownBuiltin {
        /// Requested predicate name
        name: String,
        /// Requested arity
        arity: usize,
    },
}

impl EvalError {
    pub(crate) fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(operation: &'static str) -> Self {
        Self::NumericOverflow { operation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::NumericKind;

    #[test]
    fn test_messages_name_the_operation() {
        let err = EvalError::precondition("project", "index array has 3 entries, relation arity is 2");
        assert_eq!(
            err.to_string(),
            "project: index array has 3 entries, relation arity is 2"
        );

        let err = EvalError::TypeMismatch {
            operation: "add",
            left: TermKind::String,
            right: TermKind::Numeric(NumericKind::Integer),
        };
        assert_eq!(err.to_string(), "add is not defined between string and integer");
    }

    #[test]
    fn test_unknown_builtin_message() {
        let err = EvalError::UnknownBuiltin {
            name: "POWER".to_string(),
            arity: 3,
        };
        assert_eq!(err.to_string(), "no built-in POWER/3 is registered");
    }
}
