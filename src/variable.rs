//! Definition of the variable module
//!
//! A `Domain` is the ordered set of values a random variable can take, and an `Assignment` maps
//! variable names to values. `all_assignments` enumerates every `Assignment` to a scope of
//! variables.

use crate::util::{BayesError, Result};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;


/// The values of a discrete random variable. The order of the values is the order in which they
/// were declared, and it is the order used for enumeration and for indexing probability tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    values: IndexSet<String>
}

impl Domain {

    /// Construct a new `Domain`. Repeated values are kept once, at their first position.
    pub fn new<I, S>(values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Domain { values: values.into_iter().map(|s| s.into()).collect() }
    }

    /// The number of values in the `Domain`
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of `value` in the `Domain`
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.get_index_of(value)
    }

    /// The value at position `idx`
    pub fn value(&self, idx: usize) -> Option<&str> {
        self.values.get_index(idx).map(|s| s.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// Iterate the values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|s| s.as_str())
    }
}

impl fmt::Display for Domain {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.values.iter().join(", "))
    }

}


/// A (partial or full) assignment of values to named variables.
///
/// Insertion order is kept so that printing an `Assignment` is reproducible. Equality does not
/// depend on that order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    values: IndexMap<String, String>
}

impl Assignment {

    /// Construct an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Assign `value` to `var`, replacing any previous value
    pub fn set(&mut self, var: &str, value: &str) {
        self.values.insert(var.to_string(), value.to_string());
    }

    /// Builder-style variant of `set`
    pub fn with(mut self, var: &str, value: &str) -> Self {
        self.set(var, value);
        self
    }

    /// Get the value assigned to `var`
    pub fn get(&self, var: &str) -> Option<&str> {
        self.values.get(var).map(|s| s.as_str())
    }

    pub fn contains(&self, var: &str) -> bool {
        self.values.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The assigned variables, in insertion order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    /// Iterate `(variable, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every value of `other` into this `Assignment`. Values of `other` take precedence.
    pub fn extend(&mut self, other: &Assignment) {
        for (var, value) in other.iter() {
            self.set(var, value);
        }
    }
}

impl fmt::Display for Assignment {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.values.iter().map(|(k, v)| format!("{}={}", k, v)).join(", "))
    }

}

/// Parses a comma separated `Var=Value` list, e.g. `"Flu=yes, Fever=no"`. Whitespace around
/// names and values is ignored and the empty string is the empty `Assignment`.
impl FromStr for Assignment {

    type Err = BayesError;

    fn from_str(s: &str) -> Result<Self> {
        let mut assignment = Assignment::new();

        for term in s.split(',').map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let (var, value) = term.split_once('=')
                .ok_or_else(|| BayesError::malformed(0, format!("expected Var=Value, found '{}'", term)))?;
            let (var, value) = (var.trim(), value.trim());

            if var.is_empty() || value.is_empty() {
                return Err(BayesError::malformed(0, format!("empty name or value in '{}'", term)));
            }
            if assignment.contains(var) {
                return Err(BayesError::malformed(0, format!("'{}' is assigned more than once", var)));
            }

            assignment.set(var, value);
        }

        Ok(assignment)
    }

}


/// Enumerate every `Assignment` to the given scope of variables, each ranging over its own
/// `Domain`.
///
/// The sequence is a mixed-radix counter: the first variable of the scope varies fastest and
/// values are taken in `Domain` order. There are `prod(|domain|)` assignments, which grows
/// exponentially with the size of the scope. An empty scope yields exactly one (empty)
/// assignment; a scope containing an empty `Domain` yields none.
pub fn all_assignments<'a>(scope: &[(&'a str, &'a Domain)]) -> Assignments<'a> {
    let remaining = scope.iter()
                         .try_fold(1usize, |acc, &(_, d)| acc.checked_mul(d.len()))
                         .unwrap_or(usize::MAX);

    Assignments {
        scope: scope.to_vec(),
        counter: vec![0; scope.len()],
        remaining
    }
}

/// Iterator returned by `all_assignments`
#[derive(Clone, Debug)]
pub struct Assignments<'a> {

    /// The variables being enumerated and their domains
    scope: Vec<(&'a str, &'a Domain)>,

    /// Current value index of each variable in the scope
    counter: Vec<usize>,

    /// Number of assignments not yet produced
    remaining: usize

}

impl<'a> Iterator for Assignments<'a> {

    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.remaining == 0 {
            return None;
        }

        let mut assignment = Assignment::new();
        for (&(var, domain), &idx) in self.scope.iter().zip(self.counter.iter()) {
            assignment.set(var, &domain.values[idx]);
        }
        self.remaining -= 1;

        // increment the counter, carrying into the next position on overflow
        for (pos, &(_, domain)) in self.scope.iter().enumerate() {
            self.counter[pos] += 1;
            if self.counter[pos] < domain.len() {
                break;
            }
            self.counter[pos] = 0;
        }

        Some(assignment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

}

impl<'a> ExactSizeIterator for Assignments<'a> {}

impl<'a> FusedIterator for Assignments<'a> {}


// Unit Tests for the variable module
#[cfg(test)]
mod tests {

    use super::*;

    use std::collections::HashSet;

    fn binary() -> Domain {
        Domain::new(vec!["yes", "no"])
    }

    #[test]
    fn domain() {
        let d = Domain::new(vec!["low", "mid", "high", "mid"]);
        assert_eq!(3, d.len());
        assert_eq!(Some(0), d.index_of("low"));
        assert_eq!(Some(2), d.index_of("high"));
        assert_eq!(None, d.index_of("none"));
        assert_eq!(Some("mid"), d.value(1));
        assert_eq!(None, d.value(3));
        assert_eq!("{low, mid, high}", d.to_string());
    }

    #[test]
    fn assignment() {
        let mut a = Assignment::new();
        assert!(a.is_empty());
        a.set("Flu", "yes");
        a.set("Fever", "no");
        assert_eq!(Some("yes"), a.get("Flu"));
        assert_eq!(None, a.get("Cough"));

        a.set("Flu", "no");
        assert_eq!(Some("no"), a.get("Flu"));
        assert_eq!(2, a.len());
        assert_eq!("Flu=no, Fever=no", a.to_string());

        // equality ignores insertion order
        let b = Assignment::new().with("Fever", "no").with("Flu", "no");
        assert_eq!(a, b);
    }

    #[test]
    fn parse() {
        let a: Assignment = " Flu = yes,Fever=no ".parse().unwrap();
        assert_eq!(Assignment::new().with("Flu", "yes").with("Fever", "no"), a);

        let empty: Assignment = "   ".parse().unwrap();
        assert!(empty.is_empty());

        for bad in &["Flu", "Flu=yes,Flu=no", "=yes", "Flu="] {
            match bad.parse::<Assignment>() {
                Err(BayesError::MalformedDefinition { .. }) => assert!(true),
                other => panic!("expected malformed error for '{}', got {:?}", bad, other)
            }
        }
    }

    #[test]
    /// 2^k distinct, complete assignments for k binary variables
    fn all_binary_assignments() {
        let d = binary();
        let names = ["A", "B", "C", "D"];

        for k in 0..names.len() + 1 {
            let scope: Vec<(&str, &Domain)> = names[..k].iter().map(|&n| (n, &d)).collect();
            let iter = all_assignments(&scope);
            assert_eq!(1 << k, iter.len());

            let all: Vec<Assignment> = iter.collect();
            assert_eq!(1 << k, all.len());
            assert!(all.iter().all(|a| a.len() == k && names[..k].iter().all(|n| a.contains(n))));

            let distinct: HashSet<String> = all.iter().map(|a| a.to_string()).collect();
            assert_eq!(all.len(), distinct.len());
        }
    }

    #[test]
    fn mixed_domains() {
        let d2 = binary();
        let d3 = Domain::new(vec!["low", "mid", "high"]);
        let scope = [("A", &d2), ("G", &d3)];

        let all: Vec<Assignment> = all_assignments(&scope).collect();
        assert_eq!(6, all.len());

        // the first variable varies fastest
        assert_eq!(Assignment::new().with("A", "yes").with("G", "low"), all[0]);
        assert_eq!(Assignment::new().with("A", "no").with("G", "low"), all[1]);
        assert_eq!(Assignment::new().with("A", "yes").with("G", "mid"), all[2]);
        assert_eq!(Assignment::new().with("A", "no").with("G", "high"), all[5]);
    }

    #[test]
    fn empty_domain() {
        let d = binary();
        let empty = Domain::new(Vec::<String>::new());
        let scope = [("A", &d), ("B", &empty)];

        assert_eq!(0, all_assignments(&scope).count());
    }

    #[test]
    /// Every call starts over and produces the same sequence
    fn restartable() {
        let d = binary();
        let scope = [("A", &d), ("B", &d), ("C", &d)];

        let first: Vec<Assignment> = all_assignments(&scope).collect();
        let second: Vec<Assignment> = all_assignments(&scope).collect();
        assert_eq!(first, second);

        let mut iter = all_assignments(&scope);
        assert_eq!(8, iter.by_ref().count());
        assert_eq!(None, iter.next());
    }
}
