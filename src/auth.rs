//! Xbox Live identifiers and the credential artifacts produced along the exchange chain.

pub mod id;
pub mod token;

pub use id::*;
pub use token::*;
