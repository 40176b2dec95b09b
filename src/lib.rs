//! Door sensor library
//!
//! A noisy binary door detector for a one-dimensional robot world, with the
//! Bayesian posterior of "door present" computed for every reading.

pub mod domain;
pub mod infra;
pub mod services;
