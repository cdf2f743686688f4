//! The line-oriented network definition format.
//!
//! ```text
//! # a root variable
//! Flu: yes=20, no=80
//!
//! # a conditional variable: a header, then one row per parent assignment
//! Fever:
//! Flu=yes: yes=90, no=10
//! Flu=no: yes=10, no=90
//! ```
//!
//! Probabilities are percentages. Blank lines and lines starting with `#` are ignored.

use crate::model::Network;
use crate::util::{BayesError, Result};
use crate::variable::Assignment;
use super::Tables;

/// Probabilities in this format are percentages
const PERCENT: f64 = 100.0;


/// Parse a network definition in the text format
///
/// # Errors
/// * `BayesError::MalformedDefinition` with the 1-based line of the first malformed line
/// * the errors of `Tables::into_network` for definitions that do not form a valid `Network`
pub fn parse(source: &str) -> Result<Network> {
    let mut tables = Tables::new();

    // the conditional variable whose rows are being read
    let mut current: Option<String> = None;

    for (i, raw) in source.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (head, body) = line.split_once(':')
                               .ok_or_else(|| BayesError::malformed(line_no, "expected ':'"))?;
        let (head, body) = (head.trim(), body.trim());

        if head.is_empty() {
            return Err(BayesError::malformed(line_no, "missing variable name or condition"));
        }

        if head.contains('=') {
            // a row of the current conditional variable
            let var = current.as_deref()
                             .ok_or_else(|| BayesError::malformed(line_no, "conditional row without a variable header"))?;
            let key: Assignment = head.parse().map_err(|e| at_line(e, line_no))?;
            tables.add_row(var, key, parse_distribution(body, line_no)?)?;
        } else if body.is_empty() {
            // header of a conditional variable
            tables.declare_conditional(head)?;
            current = Some(head.to_string());
        } else {
            // a root variable
            tables.add_root(head, parse_distribution(body, line_no)?)?;
            current = None;
        }
    }

    tables.into_network()
}


/// Parse ```value1=prob1, value2=prob2```, converting the percentages into probabilities
fn parse_distribution(body: &str, line_no: usize) -> Result<Vec<(String, f64)>> {
    body.split(',')
        .map(|term| {
            let (value, p) = term.split_once('=')
                                 .ok_or_else(|| BayesError::malformed(line_no, format!("expected value=probability, found '{}'", term.trim())))?;
            let (value, p) = (value.trim(), p.trim());

            if value.is_empty() {
                return Err(BayesError::malformed(line_no, "missing value"));
            }

            let p: f64 = p.parse()
                          .map_err(|_| BayesError::malformed(line_no, format!("'{}' is not a number", p)))?;
            Ok((value.to_string(), p / PERCENT))
        })
        .collect()
}


/// Attach a line number to a malformed condition
fn at_line(err: BayesError, line_no: usize) -> BayesError {
    match err {
        BayesError::MalformedDefinition { reason, .. } => BayesError::MalformedDefinition { line: line_no, reason },
        other => other
    }
}
