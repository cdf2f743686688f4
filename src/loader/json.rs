//! The JSON network definition format.
//!
//! ```json
//! {
//!     "ProbabilityTables": { "Flu": { "yes": 0.2, "no": 0.8 } },
//!     "ConditionalProbabilities": {
//!         "Fever|Flu=yes": { "yes": 0.9, "no": 0.1 },
//!         "Fever|Flu=no": { "yes": 0.1, "no": 0.9 }
//!     }
//! }
//! ```
//!
//! `ProbabilityTables` holds the root variables and `ConditionalProbabilities` one entry per row
//! of each conditional variable, keyed by ```Variable|parent=value,parent2=value2```.
//! Probabilities are in [0, 1]. The order of the document is kept.

use crate::model::Network;
use crate::util::{BayesError, Result};
use crate::variable::Assignment;
use super::Tables;

use indexmap::IndexMap;
use serde::Deserialize;

/// A distribution, value -> probability
type JsonDistribution = IndexMap<String, f64>;

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "ProbabilityTables")]
    probability_tables: IndexMap<String, JsonDistribution>,

    #[serde(rename = "ConditionalProbabilities", default)]
    conditional_probabilities: IndexMap<String, JsonDistribution>
}


/// Parse a network definition in the JSON format
///
/// # Errors
/// * `BayesError::MalformedDefinition` if the document is not valid JSON of the expected shape,
///   or a conditional key is malformed
/// * the errors of `Tables::into_network` for definitions that do not form a valid `Network`
pub fn parse(source: &str) -> Result<Network> {
    let document: Document = serde_json::from_str(source)
        .map_err(|e| BayesError::malformed(e.line(), e.to_string()))?;

    let mut tables = Tables::new();

    for (var, dist) in document.probability_tables {
        tables.add_root(&var, dist.into_iter().collect())?;
    }

    for (key, dist) in document.conditional_probabilities {
        let (var, condition) = key.split_once('|')
                                  .ok_or_else(|| BayesError::malformed(0, format!("expected 'Variable|condition', found '{}'", key)))?;
        let var = var.trim();

        let condition: Assignment = condition.parse()
                                             .map_err(|_| BayesError::malformed(0, format!("malformed condition in '{}'", key)))?;

        if var.is_empty() || condition.is_empty() {
            return Err(BayesError::malformed(0, format!("expected 'Variable|condition', found '{}'", key)));
        }

        tables.add_row(var, condition, dist.into_iter().collect())?;
    }

    tables.into_network()
}
