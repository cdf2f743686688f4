//! The interactive menu over a `Session`.
//!
//! Reads commands from any `BufRead` and writes to any `Write`, so the same loop drives a
//! terminal and the tests. Errors of a single command are reported and the loop continues; only
//! I/O errors end it early. End of input exits like option 5.

use crate::inference::InferenceEngine;
use crate::session::Session;
use crate::util::BayesError;
use crate::variable::Assignment;

use std::io::{self, BufRead, Write};
use std::path::Path;

const MENU: &str = "\
1) Show the network
2) Set evidence
3) Query
4) Reload the network
5) Exit";


/// Run the menu until the user exits or `input` ends
pub fn run<R: BufRead, W: Write>(session: &mut Session, mut input: R, mut output: W) -> io::Result<()> {
    loop {
        writeln!(output, "{}", MENU)?;
        let choice = match prompt(&mut input, &mut output, "> ")? {
            Some(line) => line,
            None => return Ok(())
        };

        match choice.as_str() {
            "1" => write!(output, "{}", session.network())?,
            "2" => {
                let line = match prompt(&mut input, &mut output, "Evidence (Var=Value, ...): ")? {
                    Some(line) => line,
                    None => return Ok(())
                };

                match line.parse::<Assignment>().and_then(|e| session.set_evidence(e)) {
                    Ok(()) if session.evidence().is_empty() => writeln!(output, "Evidence cleared")?,
                    Ok(()) => writeln!(output, "Evidence: {}", session.evidence())?,
                    Err(e) => writeln!(output, "Error: {}", e)?
                }
            },
            "3" => {
                let line = match prompt(&mut input, &mut output, "Query (Var=Value): ")? {
                    Some(line) => line,
                    None => return Ok(())
                };

                match answer(session, &line) {
                    Ok((joint, conditional)) => {
                        writeln!(output, "P({}, evidence) = {:.6}", line, joint)?;
                        match conditional {
                            Some(p) => writeln!(output, "P({} | evidence) = {:.6}", line, p)?,
                            None => writeln!(output, "P({} | evidence) is undefined: {}", line, BayesError::ZeroEvidence)?
                        }
                    },
                    Err(e) => writeln!(output, "Error: {}", e)?
                }
            },
            "4" => {
                let line = match prompt(&mut input, &mut output, "Path: ")? {
                    Some(line) => line,
                    None => return Ok(())
                };

                match session.reload(Path::new(&line)) {
                    Ok(()) => writeln!(output, "Loaded {}", session.source().display())?,
                    Err(e) => writeln!(output, "Error: {}", e)?
                }
            },
            "5" => return Ok(()),
            other => writeln!(output, "Unknown option '{}'", other)?
        }
    }
}


/// Write `message` and read the next line, trimmed. `None` at the end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}


/// Answer a ```Var=Value``` query: the joint with the evidence, and the conditional unless the
/// evidence is impossible
fn answer(session: &Session, line: &str) -> crate::Result<(f64, Option<f64>)> {
    let query: Assignment = line.parse()?;
    let (var, value) = match (query.len(), query.iter().next()) {
        (1, Some(pair)) => pair,
        _ => return Err(BayesError::malformed(0, "expected a single Var=Value")),
    };

    let engine = session.engine()?;
    let joint = engine.marginal(var, value)?;
    let z = engine.evidence_probability()?;
    let conditional = if z == 0.0 { None } else { Some(joint / z) };

    Ok((joint, conditional))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::model::NetworkBuilder;
    use crate::variable::Domain;

    use std::fs;
    use std::io::Cursor;

    fn flu_session() -> Session {
        let yes_no = Domain::new(vec!["yes", "no"]);
        let rows = vec![
            (Assignment::new().with("Flu", "yes"), vec![0.9, 0.1]),
            (Assignment::new().with("Flu", "no"), vec![0.1, 0.9]),
        ];
        let network = NetworkBuilder::new().with_root("Flu", yes_no.clone(), Initialization::Multinomial(vec![0.2, 0.8]))
                                           .with_variable("Fever", yes_no, &["Flu"], Initialization::Rows(rows))
                                           .build()
                                           .unwrap();
        Session::new(network, Path::new("flu.txt"))
    }

    fn run_script(session: &mut Session, script: &str) -> String {
        let mut output = Vec::new();
        run(session, Cursor::new(script), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn show_and_exit() {
        let mut session = flu_session();
        let out = run_script(&mut session, "1\n5\n");

        assert!(out.contains("Flu {yes, no}"));
        assert!(out.contains("Fever {yes, no} | Flu"));
        assert!(out.contains("Flu=yes: yes=0.9, no=0.1"));
    }

    #[test]
    fn query_with_evidence() {
        let mut session = flu_session();
        let out = run_script(&mut session, "3\nFever=yes\n2\nFlu=no\n3\nFever=yes\n");

        assert!(out.contains("P(Fever=yes, evidence) = 0.260000"));
        assert!(out.contains("Evidence: Flu=no"));
        assert!(out.contains("P(Fever=yes | evidence) = 0.100000"));
        assert_eq!(Some("no"), session.evidence().get("Flu"));
    }

    #[test]
    /// Errors are reported and the menu keeps going
    fn errors() {
        let mut session = flu_session();
        let out = run_script(&mut session, "7\n2\nCold=yes\n3\nFever\n3\nFlu=yes,Fever=no\n4\n/no/such/file.txt\n5\n");

        assert!(out.contains("Unknown option '7'"));
        assert!(out.contains("Unknown variable 'Cold'"));
        assert_eq!(4, out.matches("Error:").count());
        assert_eq!(Path::new("flu.txt"), session.source());
    }

    #[test]
    /// The menu answers agree bit for bit with the session's own queries
    fn answer_matches_session() {
        let mut session = flu_session();
        session.set_evidence("Flu=no".parse().unwrap()).unwrap();

        for value in &["yes", "no"] {
            let (joint, conditional) = answer(&session, &format!("Fever={}", value)).unwrap();
            assert_eq!(session.query("Fever", value).unwrap().to_bits(), joint.to_bits());
            assert_eq!(session.conditional("Fever", value).unwrap().to_bits(), conditional.unwrap().to_bits());
        }

        match answer(&session, "Flu=yes") {
            Err(BayesError::ConflictingQuery { .. }) => assert!(true),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    fn impossible_evidence() {
        let yes_no = Domain::new(vec!["yes", "no"]);
        let network = NetworkBuilder::new().with_root("A", yes_no, Initialization::Multinomial(vec![1.0, 0.0]))
                                           .build()
                                           .unwrap();
        let mut session = Session::new(network, Path::new("a.txt"));

        let out = run_script(&mut session, "2\nA=no\n3\nA=no\n");
        assert!(out.contains("P(A=no, evidence) = 0.000000"));
        assert!(out.contains("is undefined"));
    }

    #[test]
    fn reload_clears_evidence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rain.txt");
        fs::write(&path, "Rain: yes=30, no=70\n").unwrap();

        let mut session = flu_session();
        let script = format!("2\nFlu=yes\n4\n{}\n3\nRain=yes\n", path.display());
        let out = run_script(&mut session, &script);

        assert!(out.contains("Loaded"));
        assert!(session.evidence().is_empty());
        assert!(out.contains("P(Rain=yes | evidence) = 0.300000"));
    }
}
