//! Task management.
//!
//! A task is created with a generated identifier and creation timestamp,
//! updated any number of times through its mutable fields, and optionally
//! deleted. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Boundary handling in [`api`]

pub mod adapters;
pub mod api;
pub mod domain;
pub mod ports;
pub mod services;
