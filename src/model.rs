//! Defines a `Network`, a Bayesian (directed) model representing the factorization of a
//! probability distribution P over discrete variables, and the `NetworkBuilder` used to
//! assemble one.

use crate::cpd::Cpd;
use crate::init::Initialization;
use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Domain};

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::prelude as nd;
use tracing::debug;

use std::fmt;


/// A variable of the `Network`: its domain and its CPD
#[derive(Clone, Debug)]
struct Node {
    domain: Domain,
    cpd: Cpd
}


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// A traditional graph data structure is not used; instead, the CPD of each variable names its
/// parents and thereby implicitly defines the edges of the graph. Variables are held in the
/// order in which they were declared, which is the order used everywhere the `Network` is
/// enumerated or displayed.
#[derive(Clone, Debug)]
pub struct Network {

    /// The variables of the `Network`, by name
    nodes: IndexMap<String, Node>

}


/// The distribution of a single variable, for one parent assignment.
#[derive(Clone, Debug)]
pub struct Distribution<'a> {
    domain: &'a Domain,
    probabilities: nd::ArrayView1<'a, f64>
}

impl<'a> Distribution<'a> {

    /// Probability of `value`, or `None` if `value` is outside the domain
    pub fn probability(&self, value: &str) -> Option<f64> {
        self.domain.index_of(value).map(|i| self.probabilities[i])
    }

    /// Iterate ```(value, probability)``` pairs in domain order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.domain.iter().zip(self.probabilities.iter().cloned())
    }

    /// Total probability mass of the distribution
    pub fn sum(&self) -> f64 {
        self.probabilities.sum()
    }
}


impl Network {

    /// Get the names of the variables in the `Network`, in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Get the number of variables in the `Network`
    pub fn num_variables(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, var: &str) -> bool {
        self.nodes.contains_key(var)
    }

    /// Get the `Domain` of a variable
    pub fn domain(&self, var: &str) -> Option<&Domain> {
        self.nodes.get(var).map(|n| &n.domain)
    }

    /// Get the CPD of a variable
    pub fn cpd(&self, var: &str) -> Option<&Cpd> {
        self.nodes.get(var).map(|n| &n.cpd)
    }

    /// Get the parents of a variable, in the order of its CPD. Roots have no parents.
    pub fn parents(&self, var: &str) -> Option<&[String]> {
        self.nodes.get(var).map(|n| n.cpd.parents())
    }

    /// Pair every variable with its `Domain`, in declaration order
    pub fn scope(&self) -> Vec<(&str, &Domain)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), &node.domain)).collect()
    }


    /// Resolve the distribution of `var` that applies under `assignment`.
    ///
    /// For a root this is its marginal distribution. For any other variable, the values of its
    /// parents are read from `assignment` and the matching row of its CPD is returned.
    ///
    /// # Errors
    /// * `BayesError::UnknownVariable` if `var` is not in the `Network`
    /// * `BayesError::MissingEvidence` if `assignment` lacks `var` or one of its parents
    /// * `BayesError::UnknownCondition` if no row matches the parent values
    pub fn distribution(&self, var: &str, assignment: &Assignment) -> Result<Distribution<'_>> {
        let node = self.nodes.get(var).ok_or_else(|| BayesError::UnknownVariable(var.to_string()))?;

        if !assignment.contains(var) {
            return Err(BayesError::MissingEvidence(var.to_string()));
        }

        let parents = node.cpd.parents();
        let mut values = Vec::with_capacity(parents.len());
        for parent in parents {
            let value = assignment.get(parent)
                                  .ok_or_else(|| BayesError::MissingEvidence(parent.clone()))?;
            values.push(value);
        }

        // a value outside of a parent's domain matches no row either
        let idxs: Option<Vec<usize>> = parents.iter()
                                              .zip(values.iter())
                                              .map(|(p, v)| self.domain(p).and_then(|d| d.index_of(v)))
                                              .collect();

        let row = idxs.and_then(|idxs| node.cpd.row(&idxs)).ok_or_else(|| {
            BayesError::UnknownCondition {
                variable: var.to_string(),
                key: parents.iter().zip(values.iter()).map(|(p, v)| format!("{}={}", p, v)).join(",")
            }
        })?;

        Ok(Distribution { domain: &node.domain, probabilities: row })
    }


    /// Determine the probability of a full `Assignment` to the variables in the `Network`.
    ///
    /// Specifically, this computes ```P(zeta) = prod_X P(X = zeta[X] | Pa(X) = zeta[Pa(X)])```,
    /// where ```zeta``` is a full assignment. Values of variables outside of the `Network` are
    /// ignored.
    ///
    /// # Errors
    /// * `BayesError::MissingEvidence` if `assignment` is not a full assignment
    /// * `BayesError::UnknownValue` if a value is outside of its variable's domain
    /// * `BayesError::UnknownCondition` if a CPD has no row for the assignment
    pub fn joint_probability(&self, assignment: &Assignment) -> Result<f64> {
        // for every variable in the graph
        self.nodes.keys().try_fold(1.0, |acc, var| -> Result<f64> {
            // get the probability of its value given its parents
            let dist = self.distribution(var, assignment)?;
            let value = assignment.get(var).unwrap_or_default();
            let p = dist.probability(value).ok_or_else(|| BayesError::UnknownValue {
                variable: var.clone(),
                value: value.to_string()
            })?;

            // and multiply those probabilities by the chain rule
            Ok(acc * p)
        })
    }
}


impl fmt::Display for Network {

    /// Lists every variable with its domain and the rows of its CPD, probabilities as fractions:
    ///
    /// ```text
    /// Fever {yes, no} | Flu
    ///   Flu=yes: yes=0.9, no=0.1
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, node) in self.nodes.iter() {
            let parents = node.cpd.parents();
            if parents.is_empty() {
                writeln!(f, "{} {}", name, node.domain)?;
            } else {
                writeln!(f, "{} {} | {}", name, node.domain, parents.iter().join(", "))?;
            }

            for (idxs, row) in node.cpd.rows() {
                let dist = node.domain.iter()
                                      .zip(row.iter())
                                      .map(|(v, p)| format!("{}={}", v, p))
                                      .join(", ");

                if idxs.is_empty() {
                    writeln!(f, "  {}", dist)?;
                } else {
                    let key = parents.iter()
                                     .zip(idxs.iter())
                                     .map(|(p, &i)| {
                                         let value = self.domain(p).and_then(|d| d.value(i)).unwrap_or("?");
                                         format!("{}={}", p, value)
                                     })
                                     .join(",");
                    writeln!(f, "  {}: {}", key, dist)?;
                }
            }
        }

        Ok(())
    }

}


/// A variable declared to the `NetworkBuilder`, built into a `Node` once all variables are known
struct Declaration {
    domain: Domain,
    parents: Vec<String>,
    init: Initialization
}


/// An implementation of the [builder pattern] for creating a `Network`.
///
/// Variables may be declared in any order; parents are resolved when the `Network` is built.
/// The first error encountered is kept and reported by `build`.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct NetworkBuilder {

    /// The declared variables, in declaration order
    declarations: IndexMap<String, Declaration>,

    /// The error state of the builder
    err: Option<BayesError>

}


impl Default for NetworkBuilder {
    fn default() -> Self {
        NetworkBuilder::new()
    }
}


impl NetworkBuilder {

    /// Construct a new `NetworkBuilder` representing an empty `Network`
    pub fn new() -> Self {
        NetworkBuilder {
            declarations: IndexMap::new(),
            err: None
        }
    }


    /// Add a root variable (no parents) to the `Network`.
    ///
    /// # Args
    /// * `name`: the unique name of the variable
    /// * `domain`: the values the variable can take
    /// * `init`: the initialization mechanism for the CPD of the variable
    pub fn with_root(self, name: &str, domain: Domain, init: Initialization) -> Self {
        self.with_variable(name, domain, &[], init)
    }


    /// Add a variable to the `Network`.
    ///
    /// # Args
    /// * `name`: the unique name of the variable
    /// * `domain`: the values the variable can take
    /// * `parents`: the parents of the variable. The parents do not need to be declared yet.
    ///   Their order is the order of the CPD's conditions.
    /// * `init`: the initialization mechanism for the CPD of the variable
    pub fn with_variable(
        mut self,
        name: &str,
        domain: Domain,
        parents: &[&str],
        init: Initialization,
    ) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if self.declarations.contains_key(name) {
            self.err = Some(BayesError::DuplicateVariable(name.to_string()));
            return self;
        }

        if parents.iter().any(|&p| p == name) || parents.iter().duplicates().next().is_some() {
            self.err = Some(BayesError::InconsistentParents(name.to_string()));
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Record the declaration
        let parents = parents.iter().map(|p| p.to_string()).collect();
        self.declarations.insert(name.to_string(), Declaration { domain, parents, init });

        self
    }


    /// Complete building the `Network`.
    ///
    /// # Returns
    /// the `Network`, or the first error generated during the building process
    ///
    /// # Errors
    /// * `BayesError::MissingParent` if a parent was never declared
    /// * any error produced while building a CPD from its `Initialization`
    pub fn build(self) -> Result<Network> {
        if let Some(e) = self.err {
            return Err(e);
        }

        let domains: IndexMap<String, Domain> = self.declarations
                                                    .iter()
                                                    .map(|(name, d)| (name.clone(), d.domain.clone()))
                                                    .collect();

        let mut nodes = IndexMap::with_capacity(self.declarations.len());
        for (name, decl) in self.declarations {
            let mut parents = Vec::with_capacity(decl.parents.len());
            for parent in decl.parents.iter() {
                let domain = domains.get(parent).ok_or_else(|| BayesError::MissingParent {
                    variable: name.clone(),
                    parent: parent.clone()
                })?;
                parents.push((parent.as_str(), domain));
            }

            let cpd = decl.init.build_cpd(&name, &decl.domain, &parents)?;
            nodes.insert(name, Node { domain: decl.domain, cpd });
        }

        debug!(variables = nodes.len(), "built network");
        Ok(Network { nodes })
    }
}
