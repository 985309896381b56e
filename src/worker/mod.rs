//! Simulated compute servers.
//!
//! Each server runs a [`Worker`] loop against the shared queue:
//! - **Claim**: remove the first queued job it owns, under the queue lock
//! - **Execute**: [`JobExecutor::execute`] sleeps for the turn length, outside the lock
//! - **Settle**: completed jobs go to the completion sink, unfinished ones rejoin
//!   the queue tail with the same owner
//!
//! # Turn length
//!
//! Round-robin bounds each turn by the quantum. SJF and Priority run a claimed job
//! to completion in a single turn.

pub mod executor;
pub mod server;

pub use executor::{JobExecutor, TurnOutcome, TurnResult};
pub use server::Worker;
