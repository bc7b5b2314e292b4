pub mod client;
pub mod instruction;

pub use client::{load_authority, SolanaMintClient};
