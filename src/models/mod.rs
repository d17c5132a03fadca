//! CircleCI API model types.

mod env_var;
mod project;

pub use env_var::*;
pub use project::*;
