//! Domain logic for project management: the project aggregate, its
//! lifecycle, role-based authorization and dashboard aggregation.
//!
//! This crate has no database or HTTP dependencies. Storage is reached
//! through the [`store::ProjectStore`] trait; `managix-db` provides the
//! Postgres implementation and `managix-api` the HTTP surface.

pub mod authorization;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod project;
pub mod roles;
pub mod store;
pub mod types;
