//! Command implementations.

mod doctor;
mod run;

pub use doctor::run_doctor;
pub use run::run_pipeline;
