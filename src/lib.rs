//! Exact inference over small discrete Bayesian networks.
//!
//! A `Network` is loaded from a definition (see `loader`) or assembled with a `NetworkBuilder`,
//! and queried by enumeration (see `inference`).

pub mod variable;
pub mod cpd;
pub mod init;
pub mod model;
pub mod inference;
pub mod loader;
pub mod session;
pub mod console;
pub mod util;
pub use util::{Result, BayesError};
pub use variable::{Assignment, Domain};
pub use model::{Network, NetworkBuilder};
