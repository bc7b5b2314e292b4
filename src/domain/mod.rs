pub mod eligibility;
pub mod error;
pub mod mint;
pub mod model;

pub use error::MintError;
