//! Homelab Deploy - dependency-aware deployment planner and orchestrator
//!
//! This crate plans a multi-module infrastructure deployment from a catalog of
//! reusable modules, validates the operator's configuration against each
//! module's declared variables, computes a safe execution order, and drives an
//! external automation engine through every module in sequence, classifying
//! the engine's streamed events into per-host run reports with fail-fast
//! abort semantics.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod exec;
pub mod planner;

pub use catalog::ModuleCatalog;
pub use cli::DeployContext;
