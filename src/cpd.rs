//! Definition of the cpd module
//!
//! A `Cpd` is the Conditional Probability Distribution of a single variable, stored as a dense
//! table. A root variable has a `Marginal` table over its own `Domain`; any other variable has a
//! `Conditional` table with one row per assignment to its parents.

use crate::util::{BayesError, Result};
use crate::variable::Domain;

use itertools::Itertools;
use ndarray::prelude as nd;
use ndarray::{Axis, Dimension, IxDyn};

/// Alias f64 ndarray::ArrayD as Table
pub type Table = nd::ArrayD<f64>;

/// Maximum distance from 1 tolerated for the sum of a distribution
pub const NORMALIZATION_TOLERANCE: f64 = 0.001;


#[derive(Clone, Debug)]
pub enum Cpd {

    /// The unconditional distribution of a root variable, indexed by value
    Marginal {
        table: nd::Array1<f64>
    },

    /// A table-CPD as described in Koller & Friedman Section 5.2.1.
    Conditional {
        /// The parents of the variable. The first axes of `table` follow this order.
        parents: Vec<String>,

        /// Probabilities indexed by ```(parent value indices..., value index)```
        table: Table,

        /// Which parent assignments have a declared row, indexed by parent value indices
        defined: nd::ArrayD<bool>
    }
}


impl Cpd {

    /// Create the `Marginal` table of a root variable.
    ///
    /// # Args
    /// * `variable`: the name of the variable, used for error reporting
    /// * `domain`: the domain of the variable
    /// * `probabilities`: one probability per value of `domain`, in `domain` order
    ///
    /// # Errors
    /// * `BayesError::InvalidDistribution` if `probabilities` is not a distribution over `domain`
    pub fn marginal(variable: &str, domain: &Domain, probabilities: &[f64]) -> Result<Self> {
        check_distribution(variable, domain, probabilities)?;
        Ok(Cpd::Marginal { table: nd::Array1::from(probabilities.to_vec()) })
    }


    /// Create the `Conditional` table of a variable with parents.
    ///
    /// # Args
    /// * `variable`: the name of the variable, used for error reporting
    /// * `domain`: the domain of the variable
    /// * `parents`: the parents of the variable and their domains
    /// * `rows`: pairs of ```(parent value indices, probabilities)```. The parent value indices
    ///   follow the order of `parents`; the probabilities follow the order of `domain`.
    ///
    /// Rows do not have to cover every parent assignment. A missing row is reported when it is
    /// looked up.
    ///
    /// # Errors
    /// * `BayesError::InconsistentParents` if there are no parents, or a row does not index them
    /// * `BayesError::InvalidDistribution` if a row is not a distribution or is declared twice
    pub fn conditional(
        variable: &str,
        domain: &Domain,
        parents: &[(&str, &Domain)],
        rows: Vec<(Vec<usize>, Vec<f64>)>,
    ) -> Result<Self> {
        if parents.is_empty() {
            return Err(BayesError::InconsistentParents(variable.to_string()));
        }

        let parent_shape: Vec<usize> = parents.iter().map(|&(_, d)| d.len()).collect();
        let mut shape = parent_shape.clone();
        shape.push(domain.len());

        let mut table = Table::zeros(IxDyn(&shape));
        let mut defined = nd::ArrayD::from_elem(IxDyn(&parent_shape), false);

        for (idxs, probabilities) in rows {
            if idxs.len() != parents.len() || idxs.iter().zip(parent_shape.iter()).any(|(&i, &n)| i >= n) {
                return Err(BayesError::InconsistentParents(variable.to_string()));
            }

            check_distribution(variable, domain, &probabilities)?;

            if defined[IxDyn(&idxs)] {
                return Err(BayesError::invalid_distribution(
                    variable,
                    format!("the row for '{}' is declared twice", condition_key(parents, &idxs))
                ));
            }
            defined[IxDyn(&idxs)] = true;

            let mut idx = idxs;
            for (k, &p) in probabilities.iter().enumerate() {
                idx.push(k);
                table[IxDyn(&idx)] = p;
                idx.pop();
            }
        }

        Ok(Cpd::Conditional {
            parents: parents.iter().map(|&(name, _)| name.to_string()).collect(),
            table,
            defined
        })
    }


    /// The parents of the variable, in table order. Empty for a `Marginal` table.
    pub fn parents(&self) -> &[String] {
        match self {
            Cpd::Marginal { .. } => &[],
            Cpd::Conditional { parents, .. } => parents
        }
    }


    /// Check if this is the table of a root variable
    pub fn is_marginal(&self) -> bool {
        matches!(self, Cpd::Marginal { .. })
    }


    /// Retrieve the distribution of the variable for the given parent value indices.
    ///
    /// # Returns
    /// the row, or `None` if the indices do not address a declared row. A `Marginal` table has a
    /// single row, addressed by the empty index.
    pub fn row(&self, idxs: &[usize]) -> Option<nd::ArrayView1<'_, f64>> {
        match self {
            Cpd::Marginal { table } => {
                if idxs.is_empty() { Some(table.view()) } else { None }
            },
            Cpd::Conditional { parents, table, defined } => {
                if idxs.len() != parents.len() || idxs.iter().zip(defined.shape()).any(|(&i, &n)| i >= n) {
                    return None;
                }
                if !defined[IxDyn(idxs)] {
                    return None;
                }

                let mut view = table.view();
                for &i in idxs {
                    view = view.index_axis_move(Axis(0), i);
                }
                view.into_dimensionality::<nd::Ix1>().ok()
            }
        }
    }


    /// All declared rows as ```(parent value indices, distribution)```, with the last parent
    /// varying fastest.
    pub fn rows(&self) -> Vec<(Vec<usize>, nd::ArrayView1<'_, f64>)> {
        match self {
            Cpd::Marginal { table } => vec![(vec![], table.view())],
            Cpd::Conditional { defined, .. } => {
                defined.indexed_iter()
                       .filter(|&(_, &d)| d)
                       .filter_map(|(idx, _)| {
                           let idxs = idx.slice().to_vec();
                           self.row(&idxs).map(|row| (idxs, row))
                       })
                       .collect()
            }
        }
    }
}


/// Format parent value indices as a condition string, e.g. ```"A=yes,B=no"```
pub fn condition_key(parents: &[(&str, &Domain)], idxs: &[usize]) -> String {
    parents.iter()
           .zip(idxs.iter())
           .map(|(&(name, domain), &i)| format!("{}={}", name, domain.value(i).unwrap_or("?")))
           .join(",")
}


/// Verify that `probabilities` is a distribution over `domain`
fn check_distribution(variable: &str, domain: &Domain, probabilities: &[f64]) -> Result<()> {
    if probabilities.len() != domain.len() {
        return Err(BayesError::invalid_distribution(
            variable,
            format!("expected {} probabilities, found {}", domain.len(), probabilities.len())
        ));
    }

    if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(BayesError::invalid_distribution(variable, format!("invalid probability {}", p)));
    }

    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Err(BayesError::invalid_distribution(variable, format!("probabilities sum to {}", sum)));
    }

    Ok(())
}
