//! The state of an interactive inference session: the active network, where it was loaded from,
//! and the evidence queries are conditioned on.

use crate::inference::{EnumerationEngine, InferenceEngine};
use crate::loader::{self, Format};
use crate::model::Network;
use crate::util::Result;
use crate::variable::Assignment;

use tracing::{info, warn};

use std::path::{Path, PathBuf};


/// An active `Network` and the evidence set against it
#[derive(Debug)]
pub struct Session {

    /// The network queries are answered on
    network: Network,

    /// The file `network` was loaded from
    source: PathBuf,

    /// The format forced for every load, or `None` to pick it from each file's extension
    format: Option<Format>,

    /// The current evidence, always valid for `network`
    evidence: Assignment

}


impl Session {

    /// Start a session on `network`, with no evidence. Reloads pick the format from the
    /// extension.
    pub fn new(network: Network, source: &Path) -> Self {
        Session { network, source: source.to_path_buf(), format: None, evidence: Assignment::new() }
    }


    /// Load a network from `path` and start a session on it. See `loader::load`. `format` is
    /// also used by every `reload`.
    pub fn open(path: &Path, format: Option<Format>) -> Result<Self> {
        let network = loader::load(path, format)?;
        Ok(Session { format, ..Session::new(network, path) })
    }


    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn evidence(&self) -> &Assignment {
        &self.evidence
    }


    /// Replace the current evidence.
    ///
    /// # Errors
    /// * `BayesError::UnknownVariable`/`BayesError::UnknownValue` if `evidence` is not valid for
    ///   the active network. The previous evidence is kept.
    pub fn set_evidence(&mut self, evidence: Assignment) -> Result<()> {
        EnumerationEngine::new(&self.network, &evidence)?;
        self.evidence = evidence;
        Ok(())
    }


    /// An engine over the active network and the current evidence
    pub fn engine(&self) -> Result<EnumerationEngine<'_>> {
        EnumerationEngine::new(&self.network, &self.evidence)
    }


    /// Compute ```P(query = value, evidence)``` for the current evidence
    pub fn query(&self, query: &str, value: &str) -> Result<f64> {
        self.engine()?.marginal(query, value)
    }


    /// Compute ```P(query = value | evidence)``` for the current evidence
    pub fn conditional(&self, query: &str, value: &str) -> Result<f64> {
        self.engine()?.conditional(query, value)
    }


    /// Replace the active network with the one defined in `path`, in the format the session was
    /// opened with, or else the format of its extension.
    ///
    /// The new network is fully loaded before it replaces the active one. On success the evidence
    /// is cleared, as it may name variables of the old network. On failure the session is left
    /// exactly as it was and the error is returned.
    pub fn reload(&mut self, path: &Path) -> Result<()> {
        match loader::load(path, self.format) {
            Ok(network) => {
                info!(path = %path.display(), "reloaded network, evidence cleared");
                self.network = network;
                self.source = path.to_path_buf();
                self.evidence = Assignment::new();
                Ok(())
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reload failed, keeping the active network");
                Err(e)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::BayesError;

    use std::fs;

    const FLU: &str = "Flu: yes=20, no=80\nFever:\nFlu=yes: yes=90, no=10\nFlu=no: yes=10, no=90\n";
    const RAIN: &str = r#"{ "ProbabilityTables": { "Rain": { "yes": 0.3, "no": 0.7 } } }"#;

    #[test]
    fn evidence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flu.txt");
        fs::write(&path, FLU).unwrap();

        let mut session = Session::open(&path, None).unwrap();
        assert_eq!(path.as_path(), session.source());
        assert!((session.query("Fever", "yes").unwrap() - 0.26).abs() < 1e-12);

        session.set_evidence("Flu=no".parse().unwrap()).unwrap();
        assert!((session.query("Fever", "yes").unwrap() - 0.08).abs() < 1e-12);
        assert!((session.conditional("Fever", "yes").unwrap() - 0.1).abs() < 1e-12);

        // invalid evidence is rejected and the old evidence kept
        match session.set_evidence("Cold=yes".parse().unwrap()) {
            Err(BayesError::UnknownVariable(v)) => assert_eq!("Cold", v),
            _ => panic!("wrong error type")
        };
        assert_eq!(Some("no"), session.evidence().get("Flu"));
    }

    #[test]
    fn reload() {
        let dir = tempfile::tempdir().unwrap();
        let flu = dir.path().join("flu.txt");
        let rain = dir.path().join("rain.json");
        fs::write(&flu, FLU).unwrap();
        fs::write(&rain, RAIN).unwrap();

        let mut session = Session::open(&flu, None).unwrap();
        session.set_evidence("Flu=yes".parse().unwrap()).unwrap();

        session.reload(&rain).unwrap();
        assert_eq!(rain.as_path(), session.source());
        assert!(session.evidence().is_empty());
        assert_eq!(vec!["Rain"], session.network().variables().collect::<Vec<_>>());
        assert!((session.query("Rain", "yes").unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    /// A format given when opening applies to reloads, whatever the extension
    fn reload_keeps_format() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("rain.net");
        let second = dir.path().join("rain-v2.net");
        fs::write(&first, RAIN).unwrap();
        fs::write(&second, RAIN).unwrap();

        match Session::open(&first, None) {
            Err(BayesError::MalformedDefinition { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };

        let mut session = Session::open(&first, Some(Format::Json)).unwrap();
        assert_eq!(Some(Format::Json), session.format());

        session.reload(&second).unwrap();
        assert_eq!(second.as_path(), session.source());
        assert_eq!(Some(Format::Json), session.format());
    }

    #[test]
    /// A failed reload leaves the network, its source and the evidence untouched
    fn failed_reload() {
        let dir = tempfile::tempdir().unwrap();
        let flu = dir.path().join("flu.txt");
        let broken = dir.path().join("broken.txt");
        fs::write(&flu, FLU).unwrap();
        fs::write(&broken, "Flu: yes=20, no=70").unwrap();

        let mut session = Session::open(&flu, None).unwrap();
        session.set_evidence("Flu=no".parse().unwrap()).unwrap();

        match session.reload(&broken) {
            Err(BayesError::InvalidDistribution { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };
        match session.reload(&dir.path().join("missing.txt")) {
            Err(BayesError::FileUnavailable { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };

        assert_eq!(flu.as_path(), session.source());
        assert_eq!(Some("no"), session.evidence().get("Flu"));
        assert!((session.query("Fever", "yes").unwrap() - 0.08).abs() < 1e-12);
    }
}
