//! Taskhub: a task-tracking backend.
//!
//! This crate provides create, read, update and delete operations on a single
//! `Task` entity behind a transport-agnostic request handler, backed by a
//! swappable persistence engine.
//!
//! # Architecture
//!
//! Taskhub follows hexagonal architecture principles:
//!
//! - **Domain**: Validated task values with no infrastructure dependencies
//! - **Ports**: The [`task::ports::TaskStore`] capability trait
//! - **Adapters**: `PostgreSQL` and in-memory store implementations
//! - **Services**: The repository that owns identity and timestamps
//! - **API**: Transfer representation, mapper and request handler
//!
//! # Modules
//!
//! - [`config`]: Environment-driven store selection
//! - [`task`]: Task entity, stores, repository and request handling

pub mod config;
pub mod task;
