//! Job configuration: where the job runs, what triggered it, and how
//! pipeline variables are read in each case.

pub mod execution;
pub mod variables;

pub use execution::{EnvSnapshot, ExecutionContext, PipelineTrigger};
pub use variables::{EnvResolver, Strategy, VarMap, VarSpec, job_variables};
