//! Module containing initialization routines for the parameters of a network.

use crate::cpd::Cpd;
use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Domain};

use ndarray::prelude as nd;
use ndarray::{indices, Dimension};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Defines possible ways to initialize a variable's CPD.
#[derive(Clone, Debug)]
pub enum Initialization {
    /// A uniform distribution over the domain, for every parent assignment
    Uniform,

    /// Randomly initialize the rows of the CPD.
    Random,

    /// Randomly initialize the rows of the CPD from a seeded generator, so the same seed always
    /// produces the same CPD.
    SeededRandom(u64),

    /// Initialize the CPD as a Multinomial distribution with parameters ```p_0, p_1...```, given
    /// in domain order. Note that this `Initialization` is valid only for a variable with no
    /// parents.
    Multinomial(Vec<f64>),

    /// User defined rows. Each row pairs a parent assignment with probabilities in domain
    /// order. A root variable takes a single row with the empty assignment.
    Rows(Vec<(Assignment, Vec<f64>)>)
}


impl Initialization {

    /// Construct a CPD, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the name of the variable
    /// * `domain`: the domain of the variable
    /// * `parents`: the parents of the variable and their domains, in table order
    ///
    /// # Returns
    /// a `Marginal` CPD if there are no parents, otherwise a `Conditional` CPD
    pub fn build_cpd(self, var: &str, domain: &Domain, parents: &[(&str, &Domain)]) -> Result<Cpd> {
        match self {
            Initialization::Uniform => {
                let val = 1. / (domain.len() as f64);
                build_rows(var, domain, parents, |_| vec![val; domain.len()])
            },
            Initialization::Random => {
                let mut rng = StdRng::from_entropy();
                build_rows(var, domain, parents, |_| random_row(domain.len(), &mut rng))
            },
            Initialization::SeededRandom(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                build_rows(var, domain, parents, |_| random_row(domain.len(), &mut rng))
            },
            Initialization::Multinomial(ps) => {
                // A multinomial on a non-unit scope, or with an incorrect number of parameters
                if !parents.is_empty() || ps.len() != domain.len() {
                    return Err(BayesError::InvalidInitialization(var.to_string()));
                }
                Cpd::marginal(var, domain, &ps)
            },
            Initialization::Rows(rows) => {
                if parents.is_empty() {
                    return match rows.as_slice() {
                        [(key, ps)] if key.is_empty() => Cpd::marginal(var, domain, ps),
                        _ => Err(BayesError::InvalidInitialization(var.to_string()))
                    };
                }

                let rows = rows.into_iter()
                               .map(|(key, ps)| parent_indices(var, parents, &key).map(|idxs| (idxs, ps)))
                               .collect::<Result<Vec<_>>>()?;

                Cpd::conditional(var, domain, parents, rows)
            }
        }
    }
}


/// Build a CPD with one row per parent assignment, each produced by `row`
fn build_rows<F>(var: &str, domain: &Domain, parents: &[(&str, &Domain)], mut row: F) -> Result<Cpd>
    where F: FnMut(&[usize]) -> Vec<f64>
{
    if domain.is_empty() {
        return Err(BayesError::InvalidInitialization(var.to_string()));
    }

    if parents.is_empty() {
        return Cpd::marginal(var, domain, &row(&[]));
    }

    let shape: Vec<usize> = parents.iter().map(|&(_, d)| d.len()).collect();
    let rows = indices(shape).into_iter()
                             .map(|idx| {
                                 let idxs = idx.slice().to_vec();
                                 let ps = row(&idxs);
                                 (idxs, ps)
                             })
                             .collect();

    Cpd::conditional(var, domain, parents, rows)
}


/// Draw a random distribution over `n` values
fn random_row(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let weights = nd::Array1::random_using(n, Uniform::new(1.0, 100.0), rng);
    let z = weights.sum();
    (weights / z).to_vec()
}


/// Translate a parent assignment into value indices, in the order of `parents`.
///
/// # Errors
/// * `BayesError::InconsistentParents` if `key` does not assign exactly the parents
/// * `BayesError::UnknownValue` if a parent value is not in that parent's domain
fn parent_indices(var: &str, parents: &[(&str, &Domain)], key: &Assignment) -> Result<Vec<usize>> {
    if key.len() != parents.len() {
        return Err(BayesError::InconsistentParents(var.to_string()));
    }

    parents.iter()
           .map(|&(parent, domain)| {
               let value = key.get(parent)
                              .ok_or_else(|| BayesError::InconsistentParents(var.to_string()))?;
               domain.index_of(value).ok_or_else(|| BayesError::UnknownValue {
                   variable: parent.to_string(),
                   value: value.to_string()
               })
           })
           .collect()
}
