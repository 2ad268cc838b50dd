//! NRP instances, formulations and the evaluating problem model.
//!
//! # Key Types
//!
//! - [`ProblemInstance`]: loaded, immutable problem data in either
//!   constraint style
//! - [`Formulation`]: objective/constraint semantics per NRP variant
//! - [`ProblemModel`]: a formulation plus its repair policy, implementing
//!   [`Problem`] for the evolutionary engine
//! - [`Solution`] / [`Fingerprint`]: mutable candidate and its value
//!   identity

mod formulation;
mod instance;
mod model;
mod types;

pub use formulation::{CustomerForm, Formulation};
pub use instance::{
    CustomerInstance, Inequation, LinearInstance, Precedence, ProblemInstance, SHAPE_TOLERANCE,
};
pub use model::{ProblemModel, Repair};
pub use types::{Fingerprint, Problem, Solution};
