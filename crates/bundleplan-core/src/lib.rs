#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]

//! Build and test-session descriptors for a bundled web application.
//!
//! Nothing here touches the network or runs a bundler. [`make_build_plan`]
//! describes how an external bundler should package the app, and
//! [`make_test_plan`] derives the descriptor an external browser test runner
//! consumes. [`failure::FailurePolicy`] decides what the process does when the
//! test environment itself breaks.

pub mod codes;
pub mod config;
pub mod error;
pub mod failure;
pub mod naming;
pub mod plan;
pub mod project;
pub mod testplan;
pub mod version;

pub use config::Config;
pub use error::Error;
pub use failure::{
    DeferredExit, Disposition, Exit, FailurePolicy, FailureReporter, ProcessExit, Signal,
    Termination, TerminationWatch,
};
pub use plan::{make_build_plan, BuildPlan, CompiledRules, Handler, Mode, Rule, Step, StepKind};
pub use project::Project;
pub use testplan::{derive_test_plan, make_test_plan, TestPlan};
pub use version::VERSION;
