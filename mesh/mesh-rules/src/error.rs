//! Error types for rule definition and parsing.

use thiserror::Error;

/// Errors detected while validating a rule definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// A rule needs at least the two base points.
    #[error("rule '{0}' has fewer than two template points")]
    TooFewPoints(String),

    /// The first template line must span template points 1 and 2.
    #[error("rule '{0}' does not map its base line onto template points 1-2")]
    BadBaseLine(String),

    /// A template index referenced something out of range.
    #[error("rule '{name}' references out-of-range template index {index}")]
    IndexOutOfRange {
        /// Name of the offending rule.
        name: String,
        /// The out-of-range index, 0-based.
        index: usize,
    },

    /// Elements must be triangles or quads.
    #[error("rule '{name}' has an element with {corners} corners")]
    BadElementArity {
        /// Name of the offending rule.
        name: String,
        /// Number of corners found.
        corners: usize,
    },

    /// A tolerance radius must be positive.
    #[error("rule '{0}' has a non-positive point tolerance")]
    BadTolerance(String),

    /// Free zones must be convex, counter-clockwise, and non-degenerate.
    #[error("rule '{0}' has a degenerate or non-convex free zone")]
    BadFreeZone(String),

    /// The relaxed free zone must have the same vertex count as the strict
    /// one so the two can be interpolated.
    #[error("rule '{0}' free zone and its limit differ in vertex count")]
    FreeZoneMismatch(String),

    /// One tolerance radius is required per template point.
    #[error("rule '{0}' tolerance list does not match its template points")]
    ToleranceCountMismatch(String),
}

/// Errors from the rule text format parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleParseError {
    /// A structural problem at a specific line.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based source line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The parsed rule failed validation.
    #[error("rule ending at line {line}: {source}")]
    InvalidRule {
        /// 1-based line number of the `endrule` keyword.
        line: usize,
        /// The underlying validation failure.
        source: RuleError,
    },

    /// Input ended in the middle of a rule.
    #[error("unexpected end of input inside rule '{0}'")]
    UnexpectedEof(String),
}

/// Result alias for rule construction.
pub type RuleResult<T> = std::result::Result<T, RuleError>;
