//! Command fan-out engine
//!
//! This module handles the actual execution of a command across packages:
//! shell spawning, bounded-concurrency wave dispatch, and the
//! dependency-ordered scheduling loop.

pub mod batch;
pub mod command;
pub mod dependencies;
pub mod runner;

pub use batch::{default_concurrency, dispatch_wave, FailedPackage};
pub use command::{run_shell_command, CommandFailure, CommandOutput};
pub use dependencies::{build_wait_map, compute_waves, Exemptions};
pub use runner::{CommandRunner, RunReport, RunnerConfig};
