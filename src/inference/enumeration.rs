//! Defines an `InferenceEngine` that answers probability queries exactly, by enumerating every
//! assignment to the hidden variables and summing the joint probability of each.
//!
//! Implementation of Russell & Norvig's ENUMERATE-JOINT-ASK. The number of joint evaluations of a
//! query is the product of the domain sizes of the hidden variables, which is exponential in the
//! number of hidden variables: the engine is only suitable for small networks.

use crate::model::Network;
use crate::util::{BayesError, Result};
use crate::variable::{all_assignments, Assignment, Domain};
use super::InferenceEngine;

use indexmap::IndexMap;
use tracing::{debug, warn};

/// Enumerations larger than this are reported with a warning
pub const LARGE_ENUMERATION: usize = 1 << 20;


/// An `InferenceEngine` for a `Network` and a fixed set of evidence
pub struct EnumerationEngine<'a> {

    /// The network over which to perform inference
    network: &'a Network,

    /// The evidence every query is conditioned on
    evidence: Assignment

}


impl<'a> EnumerationEngine<'a> {

    /// Construct an engine answering queries about `network` given `evidence`.
    ///
    /// # Errors
    /// * `BayesError::UnknownVariable` if the evidence names a variable outside of `network`
    /// * `BayesError::UnknownValue` if an observed value is outside of its variable's domain
    pub fn new(network: &'a Network, evidence: &Assignment) -> Result<Self> {
        for (var, value) in evidence.iter() {
            let domain = network.domain(var)
                                .ok_or_else(|| BayesError::UnknownVariable(var.to_string()))?;
            if !domain.contains(value) {
                return Err(BayesError::UnknownValue { variable: var.to_string(), value: value.to_string() });
            }
        }

        Ok(EnumerationEngine { network, evidence: evidence.clone() })
    }

    /// The evidence of this engine
    pub fn evidence(&self) -> &Assignment {
        &self.evidence
    }


    /// Compute ```P(evidence)```, the sum of the joint probability of every completion of the
    /// evidence.
    pub fn evidence_probability(&self) -> Result<f64> {
        self.sum_completions(&self.evidence)
    }


    /// Sum the joint probability over every completion of `fixed` to the whole `Network`.
    ///
    /// The hidden variables are the variables of the `Network` missing from `fixed`, taken in
    /// network order. Each completion is visited in the order of `all_assignments`, so the sum
    /// is reproducible bit for bit.
    fn sum_completions(&self, fixed: &Assignment) -> Result<f64> {
        let hidden: Vec<(&str, &Domain)> = self.network
                                               .scope()
                                               .into_iter()
                                               .filter(|&(var, _)| !fixed.contains(var))
                                               .collect();

        let completions = all_assignments(&hidden);
        let count = completions.len();

        debug!(hidden = hidden.len(), completions = count, "enumerating hidden variables");
        if count > LARGE_ENUMERATION {
            warn!(hidden = hidden.len(), completions = count, "very large enumeration, this query may take a long time");
        }

        let mut total = 0.0;
        for completion in completions {
            let mut full = fixed.clone();
            full.extend(&completion);
            total += self.network.joint_probability(&full)?;
        }

        Ok(total)
    }


    /// Verify the query and, if it is consistent with the evidence, return the evidence
    /// extended with it.
    fn with_query(&self, query: &str, value: &str) -> Result<Assignment> {
        let domain = self.network
                         .domain(query)
                         .ok_or_else(|| BayesError::UnknownVariable(query.to_string()))?;

        if !domain.contains(value) {
            return Err(BayesError::UnknownValue { variable: query.to_string(), value: value.to_string() });
        }

        if let Some(observed) = self.evidence.get(query) {
            if observed != value {
                return Err(BayesError::ConflictingQuery {
                    variable: query.to_string(),
                    query: value.to_string(),
                    evidence: observed.to_string()
                });
            }
        }

        let mut fixed = self.evidence.clone();
        fixed.set(query, value);
        Ok(fixed)
    }
}


impl<'a> InferenceEngine for EnumerationEngine<'a> {

    fn marginal(&self, query: &str, value: &str) -> Result<f64> {
        let fixed = self.with_query(query, value)?;
        self.sum_completions(&fixed)
    }

    fn conditional(&self, query: &str, value: &str) -> Result<f64> {
        let joint = self.marginal(query, value)?;
        let z = self.evidence_probability()?;

        if z == 0.0 {
            return Err(BayesError::ZeroEvidence);
        }

        Ok(joint / z)
    }

    fn infer(&self, query: &str) -> Result<IndexMap<String, f64>> {
        let domain = self.network
                         .domain(query)
                         .ok_or_else(|| BayesError::UnknownVariable(query.to_string()))?;

        let mut unnormalized = IndexMap::with_capacity(domain.len());
        for value in domain.iter() {
            let p = match self.evidence.get(query) {
                // values other than the observed one are impossible
                Some(observed) if observed != value => 0.0,
                _ => self.marginal(query, value)?
            };
            unnormalized.insert(value.to_string(), p);
        }

        let z: f64 = unnormalized.values().sum();
        if z == 0.0 {
            return Err(BayesError::ZeroEvidence);
        }

        Ok(unnormalized.into_iter().map(|(v, p)| (v, p / z)).collect())
    }
}


/// Compute ```P(query = value, evidence)``` by enumeration.
///
/// This is the joint probability of the query and the evidence: it is *not* divided by
/// ```P(evidence)```. See `conditional_probability` for the normalized value.
///
/// # Errors
/// * `BayesError::ConflictingQuery` if the evidence assigns another value to `query`
/// * `BayesError::UnknownVariable`/`BayesError::UnknownValue` for names outside the `Network`
/// * any error of `Network::joint_probability`
pub fn marginal_probability(network: &Network, query: &str, value: &str, evidence: &Assignment) -> Result<f64> {
    EnumerationEngine::new(network, evidence)?.marginal(query, value)
}


/// Compute ```P(query = value | evidence)``` by enumeration.
///
/// # Errors
/// * `BayesError::ZeroEvidence` if ```P(evidence) = 0```
/// * any error of `marginal_probability`
pub fn conditional_probability(network: &Network, query: &str, value: &str, evidence: &Assignment) -> Result<f64> {
    EnumerationEngine::new(network, evidence)?.conditional(query, value)
}


/// Compute ```P(evidence)``` by enumeration.
pub fn evidence_probability(network: &Network, evidence: &Assignment) -> Result<f64> {
    EnumerationEngine::new(network, evidence)?.evidence_probability()
}


/// Compute the probability of a full assignment. See `Network::joint_probability`.
pub fn joint_probability(network: &Network, assignment: &Assignment) -> Result<f64> {
    network.joint_probability(assignment)
}
