pub mod config;
pub mod corpus_path;
pub mod sidecar;

pub use config::*;
pub use corpus_path::*;
pub use sidecar::*;
