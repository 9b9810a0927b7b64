//#![warn(missing_docs)]
#![warn(unused_qualifications)]
#![deny(deprecated)]
#![deny(missing_copy_implementations)]

pub mod corpus;
pub mod diagram;
pub mod error;
pub mod parser;
pub mod util;

pub use crate::corpus::aggregate::{CorpusSummary, Signature};
pub use crate::corpus::{AnalysisConfig, VersionPolicy};
pub use crate::diagram::{node::*, Diagram};
pub use crate::error::AnalysisError;
