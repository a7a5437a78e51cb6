//! revgate-azure — the platform command layer.
//!
//! Every interaction with Azure Container Apps goes through the `az` CLI.
//! The [`CommandExecutor`] trait is the process-spawning seam (the real
//! implementation is [`AzCli`]; tests script it), and [`AzClient`] is the
//! typed surface on top: it builds the exact command strings and parses
//! their JSON/text output.
//!
//! Mutating commands are never issued concurrently — the orchestrator
//! serializes them — so nothing here takes locks.

pub mod client;
pub mod error;
pub mod executor;

pub use client::AzClient;
pub use error::CommandError;
pub use executor::{AzCli, CommandExecutor, CommandOutcome};
