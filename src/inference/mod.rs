//! Defines the interface to inference engines

use crate::util::Result;

use indexmap::IndexMap;

mod enumeration;

pub use self::enumeration::{
    conditional_probability, evidence_probability, joint_probability, marginal_probability,
    EnumerationEngine, LARGE_ENUMERATION,
};


/// An `InferenceEngine` answers probability queries about a single variable of a network, given
/// the evidence `e` the engine was constructed with.
pub trait InferenceEngine {

    /// Compute the unnormalized marginal ```P(query = value, E = e)```
    fn marginal(&self, query: &str, value: &str) -> Result<f64>;

    /// Compute the conditional probability ```P(query = value | E = e)```
    fn conditional(&self, query: &str, value: &str) -> Result<f64>;

    /// Infer the distribution ```P(query | E = e)``` over every value of `query`, in domain order
    fn infer(&self, query: &str) -> Result<IndexMap<String, f64>>;

}
