//! Loading a `Network` from a network definition.
//!
//! Two formats are supported: a line-oriented text format with probabilities given as
//! percentages (see `text`), and a JSON document with probabilities in [0, 1] (see `json`). Both
//! read their tables into `Tables`, which checks them and builds the `Network`, so the two formats
//! produce identical networks for the same definition.

use crate::init::Initialization;
use crate::model::{Network, NetworkBuilder};
use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Domain};

use indexmap::IndexMap;
use itertools::Itertools;
use tracing::info;

use std::fs;
use std::path::Path;

pub mod json;
pub mod text;


/// The format of a network definition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// The line-oriented format, probabilities in percent
    Text,

    /// The JSON document format, probabilities in [0, 1]
    Json
}

impl Format {

    /// Pick the format from the extension of `path`: `.json` is `Json`, anything else is `Text`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Text
        }
    }
}


/// Read a `Network` from a file.
///
/// # Args
/// * `path`: the file to read
/// * `format`: the format of the file, or `None` to pick it from the extension
///
/// # Errors
/// * `BayesError::FileUnavailable` if the file cannot be read
/// * `BayesError::MalformedDefinition` and the `NetworkBuilder` errors for invalid definitions
pub fn load(path: &Path, format: Option<Format>) -> Result<Network> {
    let source = fs::read_to_string(path).map_err(|source| BayesError::FileUnavailable {
        path: path.to_path_buf(),
        source
    })?;

    let format = format.unwrap_or_else(|| Format::from_path(path));
    let network = parse(&source, format)?;

    info!(path = %path.display(), ?format, variables = network.num_variables(), "loaded network");
    Ok(network)
}


/// Read a `Network` from a definition held in memory. A leading byte order mark is ignored.
pub fn parse(source: &str, format: Format) -> Result<Network> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    match format {
        Format::Text => text::parse(source),
        Format::Json => json::parse(source)
    }
}


/// The probability table of a single variable, as read from a definition
#[derive(Debug)]
enum Entry {
    /// ```(value, probability)``` pairs of a root variable
    Root(Vec<(String, f64)>),

    /// ```(parent assignment, (value, probability) pairs)``` rows of a conditional variable
    Conditional(Vec<(Assignment, Vec<(String, f64)>)>)
}


/// The tables of a network definition, in the order in which the variables first appear. All
/// probabilities must already be in [0, 1].
#[derive(Debug, Default)]
pub(crate) struct Tables {
    entries: IndexMap<String, Entry>
}


impl Tables {

    pub(crate) fn new() -> Self {
        Tables::default()
    }


    /// Record the distribution of a root variable
    pub(crate) fn add_root(&mut self, var: &str, dist: Vec<(String, f64)>) -> Result<()> {
        if self.entries.contains_key(var) {
            return Err(BayesError::DuplicateVariable(var.to_string()));
        }

        self.entries.insert(var.to_string(), Entry::Root(dist));
        Ok(())
    }


    /// Record that `var` is a conditional variable, without adding a row yet
    pub(crate) fn declare_conditional(&mut self, var: &str) -> Result<()> {
        match self.entries.get(var) {
            Some(Entry::Root(_)) => Err(BayesError::DuplicateVariable(var.to_string())),
            Some(Entry::Conditional(_)) => Ok(()),
            None => {
                self.entries.insert(var.to_string(), Entry::Conditional(Vec::new()));
                Ok(())
            }
        }
    }


    /// Record one row of the table of a conditional variable
    pub(crate) fn add_row(&mut self, var: &str, key: Assignment, dist: Vec<(String, f64)>) -> Result<()> {
        self.declare_conditional(var)?;

        if let Some(Entry::Conditional(rows)) = self.entries.get_mut(var) {
            rows.push((key, dist));
        }
        Ok(())
    }


    /// Check the tables and build the `Network`.
    ///
    /// The domain of a variable is the order in which its values appear in its first row; every
    /// other row must list the same values. The parents of a conditional variable are the
    /// variables of its first row's condition, in order; every other row must condition on the
    /// same set of parents.
    pub(crate) fn into_network(self) -> Result<Network> {
        let mut builder = NetworkBuilder::new();

        for (var, entry) in self.entries {
            builder = match entry {
                Entry::Root(dist) => {
                    let domain = Domain::new(dist.iter().map(|(v, _)| v.clone()));
                    let ps = probabilities(&var, &domain, &dist)?;
                    builder.with_root(&var, domain, Initialization::Multinomial(ps))
                },
                Entry::Conditional(rows) => {
                    let (first_key, first_dist) = rows.first().ok_or_else(|| {
                        BayesError::invalid_distribution(&var, "no conditional rows are declared")
                    })?;

                    let domain = Domain::new(first_dist.iter().map(|(v, _)| v.clone()));
                    let parents: Vec<String> = first_key.variables().map(|p| p.to_string()).collect();

                    let mut table = Vec::with_capacity(rows.len());
                    for (key, dist) in rows.iter() {
                        if key.len() != parents.len() || !parents.iter().all(|p| key.contains(p)) {
                            return Err(BayesError::InconsistentParents(var.clone()));
                        }
                        table.push((key.clone(), probabilities(&var, &domain, dist)?));
                    }

                    let parents: Vec<&str> = parents.iter().map(|p| p.as_str()).collect();
                    builder.with_variable(&var, domain, &parents, Initialization::Rows(table))
                }
            };
        }

        builder.build()
    }
}


/// Order the probabilities of `dist` by `domain`.
///
/// # Errors
/// * `BayesError::InvalidDistribution` if `dist` does not list exactly the values of `domain`
fn probabilities(var: &str, domain: &Domain, dist: &[(String, f64)]) -> Result<Vec<f64>> {
    let values: Vec<&str> = dist.iter().map(|(v, _)| v.as_str()).collect();

    if values.len() != domain.len() || values.iter().any(|v| !domain.contains(v)) {
        return Err(BayesError::invalid_distribution(
            var,
            format!("values [{}] differ from the domain {}", values.iter().join(", "), domain)
        ));
    }

    let mut ps = vec![0.0; domain.len()];
    for (value, p) in dist.iter() {
        if let Some(i) = domain.index_of(value) {
            ps[i] = *p;
        }
    }

    Ok(ps)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::all_assignments;

    use std::io::Write;

    const FLU_TEXT: &str = "\
Flu: yes=20, no=80
Fever:
Flu=yes: yes=90, no=10
Flu=no: yes=10, no=90
";

    const FLU_JSON: &str = r#"{
        "ProbabilityTables": { "Flu": { "yes": 0.2, "no": 0.8 } },
        "ConditionalProbabilities": {
            "Fever|Flu=yes": { "yes": 0.9, "no": 0.1 },
            "Fever|Flu=no": { "yes": 0.1, "no": 0.9 }
        }
    }"#;

    #[test]
    fn format_from_path() {
        assert_eq!(Format::Json, Format::from_path(Path::new("networks/flu.json")));
        assert_eq!(Format::Json, Format::from_path(Path::new("FLU.JSON")));
        assert_eq!(Format::Text, Format::from_path(Path::new("networks/flu.txt")));
        assert_eq!(Format::Text, Format::from_path(Path::new("flu")));
    }

    #[test]
    /// Percentages and fractions describing the same network give identical joint probabilities
    fn same_network_from_both_formats() {
        let from_text = parse(FLU_TEXT, Format::Text).unwrap();
        let from_json = parse(FLU_JSON, Format::Json).unwrap();

        assert_eq!(from_text.variables().collect::<Vec<_>>(), from_json.variables().collect::<Vec<_>>());

        let scope = from_text.scope();
        for a in all_assignments(&scope) {
            let p_text = from_text.joint_probability(&a).unwrap();
            let p_json = from_json.joint_probability(&a).unwrap();
            assert_eq!(p_text.to_bits(), p_json.to_bits());
        }
    }

    #[test]
    /// Editors may start a file with a UTF-8 byte order mark
    fn byte_order_mark_text() {
        let source = format!("\u{feff}{}", FLU_TEXT);
        let model = parse(&source, Format::Text).unwrap();
        assert_eq!(vec!["Flu", "Fever"], model.variables().collect::<Vec<_>>());
    }

    #[test]
    fn byte_order_mark_json() {
        let source = format!("\u{feff}{}", FLU_JSON);
        let model = parse(&source, Format::Json).unwrap();
        assert_eq!(vec!["Flu", "Fever"], model.variables().collect::<Vec<_>>());
    }

    #[test]
    fn byte_order_mark_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all("\u{feff}".as_bytes()).unwrap();
        file.write_all(FLU_TEXT.as_bytes()).unwrap();

        let model = load(file.path(), None).unwrap();
        assert!(model.contains("Flu"));
        assert_eq!(&["Flu".to_string()], model.parents("Fever").unwrap());
    }

    #[test]
    /// Values may be listed in any order after the first row
    fn value_order() {
        let mut tables = Tables::new();
        tables.add_root("A", vec![("t".to_string(), 0.4), ("f".to_string(), 0.6)]).unwrap();
        tables.add_row("B", Assignment::new().with("A", "t"), vec![("x".to_string(), 0.3), ("y".to_string(), 0.7)]).unwrap();
        tables.add_row("B", Assignment::new().with("A", "f"), vec![("y".to_string(), 0.5), ("x".to_string(), 0.5)]).unwrap();

        let model = tables.into_network().unwrap();
        let a = Assignment::new().with("A", "t").with("B", "y");
        assert!((model.joint_probability(&a).unwrap() - 0.28).abs() < 1e-12);
    }

    #[test]
    fn table_errs() {
        // different values in two rows
        let mut tables = Tables::new();
        tables.add_root("A", vec![("t".to_string(), 0.4), ("f".to_string(), 0.6)]).unwrap();
        tables.add_row("B", Assignment::new().with("A", "t"), vec![("x".to_string(), 0.3), ("y".to_string(), 0.7)]).unwrap();
        tables.add_row("B", Assignment::new().with("A", "f"), vec![("x".to_string(), 0.5), ("z".to_string(), 0.5)]).unwrap();
        match tables.into_network() {
            Err(BayesError::InvalidDistribution { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };

        // different parents in two rows
        let mut tables = Tables::new();
        tables.add_root("A", vec![("t".to_string(), 0.4), ("f".to_string(), 0.6)]).unwrap();
        tables.add_root("C", vec![("t".to_string(), 0.4), ("f".to_string(), 0.6)]).unwrap();
        tables.add_row("B", Assignment::new().with("A", "t"), vec![("x".to_string(), 0.3), ("y".to_string(), 0.7)]).unwrap();
        tables.add_row("B", Assignment::new().with("C", "f"), vec![("x".to_string(), 0.5), ("y".to_string(), 0.5)]).unwrap();
        match tables.into_network() {
            Err(BayesError::InconsistentParents(v)) => assert_eq!("B", v),
            _ => panic!("wrong error type")
        };

        // a conditional variable without rows
        let mut tables = Tables::new();
        tables.declare_conditional("B").unwrap();
        match tables.into_network() {
            Err(BayesError::InvalidDistribution { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };

        // a variable that is both a root and conditional
        let mut tables = Tables::new();
        tables.add_root("A", vec![("t".to_string(), 1.0)]).unwrap();
        match tables.add_row("A", Assignment::new().with("C", "t"), vec![("t".to_string(), 1.0)]) {
            Err(BayesError::DuplicateVariable(_)) => assert!(true),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    fn load_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(FLU_JSON.as_bytes()).unwrap();

        let model = load(file.path(), None).unwrap();
        assert_eq!(2, model.num_variables());

        // forcing the wrong format fails
        match load(file.path(), Some(Format::Text)) {
            Err(BayesError::MalformedDefinition { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        match load(&path, None) {
            Err(BayesError::FileUnavailable { path: p, .. }) => assert_eq!(path, p),
            _ => panic!("wrong error type")
        };
    }
}
