//! Governance Advisor - persona-aware voting recommendations for DAO proposals
//!
//! This crate turns a proposal and a voter persona into a validated decision.
//! The primary path asks a completion service for a JSON verdict and repairs
//! whatever comes back; when that fails a deterministic synthesizer produces
//! an equivalent decision from the proposal id alone.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
