//! Cart fleet management: a cart store, a manager store, and the
//! assignment reconciler that keeps cart status and manager assignment
//! lists consistent across two collections with no shared transaction.

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infra;
pub mod problem;

#[cfg(test)]
pub(crate) mod test_support;
