extern crate rand;
extern crate rayon;

pub mod types;
pub mod error;

pub mod graph_representation;
pub mod graph_algorithms;
pub mod utils;

pub mod portal_table;
pub mod horizon_index;
pub mod label_pairs;
pub mod oracle;

pub use error::{OracleError, Result};
pub use oracle::{IndexStats, LabelDistance, LabelPairDistance, LabeledOracle, OracleConfig};
