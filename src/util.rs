//! Defines the `Error` type for the bayesnet library

use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, BayesError>;

#[derive(Debug, Error)]
pub enum BayesError {

    /// A network definition (or an evidence string) that does not follow the expected format.
    /// `line` is 1-based, or 0 when the input has no line structure.
    #[error("Malformed definition at line {line}: {reason}")]
    MalformedDefinition { line: usize, reason: String },

    /// An assignment is missing a value for the named `Variable`
    #[error("Missing a value for variable '{0}'")]
    MissingEvidence(String),

    /// No row of a conditional table matches the parent values of an assignment
    #[error("Variable '{variable}' has no distribution for the condition '{key}'")]
    UnknownCondition { variable: String, key: String },

    /// The query variable is also present in the evidence, with another value
    #[error("Query {variable}={query} conflicts with evidence {variable}={evidence}")]
    ConflictingQuery { variable: String, query: String, evidence: String },

    /// The network source could not be read
    #[error("Unable to read network from {}", path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A name that does not belong to the network
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    /// A value outside of the variable's domain
    #[error("'{value}' is not in the domain of variable '{variable}'")]
    UnknownValue { variable: String, value: String },

    /// A variable was declared twice
    #[error("Variable '{0}' was declared more than once")]
    DuplicateVariable(String),

    /// A conditional table names a parent that is not part of the network
    #[error("Variable '{variable}' is conditioned on '{parent}', which is not in the network")]
    MissingParent { variable: String, parent: String },

    /// The rows of a conditional table do not condition on the same parents
    #[error("Rows of variable '{0}' condition on different sets of parents")]
    InconsistentParents(String),

    /// A distribution that is not a valid probability distribution
    #[error("Invalid distribution for variable '{variable}': {reason}")]
    InvalidDistribution { variable: String, reason: String },

    /// An initialization that cannot be applied to the variable
    #[error("Invalid initialization for variable '{0}'")]
    InvalidInitialization(String),

    /// The evidence has probability zero, so no conditional can be formed
    #[error("The evidence has probability zero")]
    ZeroEvidence,

}

impl BayesError {

    /// Shorthand for a `MalformedDefinition` error
    pub fn malformed<S: Into<String>>(line: usize, reason: S) -> Self {
        BayesError::MalformedDefinition { line, reason: reason.into() }
    }

    /// Shorthand for an `InvalidDistribution` error
    pub fn invalid_distribution<S: Into<String>>(variable: &str, reason: S) -> Self {
        BayesError::InvalidDistribution { variable: variable.to_string(), reason: reason.into() }
    }

}
