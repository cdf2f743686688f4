//! Exact inference on the student network, built in code rather than loaded from a file.
//!
//! Run with ```cargo run --example inference```.

use bayesnet as b;
use b::inference::{EnumerationEngine, InferenceEngine};
use b::init::Initialization;

fn main() -> b::Result<()> {
    /////////////////////////////////////////////////////
    // Step 1: Build Model
    let model = build_model()?;
    print!("{}", model);

    /////////////////////////////////////////////////////
    // Step 2: Compile some evidence
    let evidence: b::Assignment = "D=easy,L=strong,S=low".parse()?;

    /////////////////////////////////////////////////////
    // Step 3: Build an inference engine
    let engine = EnumerationEngine::new(&model, &evidence)?;
    println!();
    println!("P({}) = {:.6}", evidence, engine.evidence_probability()?);

    /////////////////////////////////////////////////////
    // Step 4: Run conditional queries
    for query in &["I", "G"] {
        for (value, p) in engine.infer(query)? {
            println!("P({} = {} | {}) = {:.4}", query, value, evidence, p);
        }
    }

    Ok(())
}

fn key(pairs: &[(&str, &str)]) -> b::Assignment {
    pairs.iter().fold(b::Assignment::new(), |a, &(var, value)| a.with(var, value))
}

fn build_model() -> b::Result<b::Network> {
    let difficulty = b::Domain::new(vec!["easy", "hard"]);
    let intelligence = b::Domain::new(vec!["low", "high"]);
    let grade = b::Domain::new(vec!["A", "B", "C"]);
    let sat = b::Domain::new(vec!["low", "high"]);
    let letter = b::Domain::new(vec!["weak", "strong"]);

    ///////////////////////////////////////////////////
    // Step 1: Build CPTs for variables with parents
    let cpt_g = vec![
        (key(&[("I", "low"), ("D", "easy")]), vec![0.3, 0.4, 0.3]),
        (key(&[("I", "low"), ("D", "hard")]), vec![0.05, 0.25, 0.7]),
        (key(&[("I", "high"), ("D", "easy")]), vec![0.9, 0.08, 0.02]),
        (key(&[("I", "high"), ("D", "hard")]), vec![0.5, 0.3, 0.2]),
    ];

    let cpt_s = vec![
        (key(&[("I", "low")]), vec![0.95, 0.05]),
        (key(&[("I", "high")]), vec![0.2, 0.8]),
    ];

    let cpt_l = vec![
        (key(&[("G", "A")]), vec![0.1, 0.9]),
        (key(&[("G", "B")]), vec![0.4, 0.6]),
        (key(&[("G", "C")]), vec![0.99, 0.01]),
    ];

    ///////////////////////////////////////////////////
    // Step 2: Build the Model
    b::NetworkBuilder::new()
        .with_root("D", difficulty, Initialization::Multinomial(vec![0.6, 0.4]))
        .with_root("I", intelligence, Initialization::Multinomial(vec![0.7, 0.3]))
        .with_variable("G", grade, &["I", "D"], Initialization::Rows(cpt_g))
        .with_variable("S", sat, &["I"], Initialization::Rows(cpt_s))
        .with_variable("L", letter, &["G"], Initialization::Rows(cpt_l))
        .build()
}
