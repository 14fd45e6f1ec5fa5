//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept any Postgres executor as the first argument, so the same query
//! runs against the pool or inside a transaction. [`PgProjectStore`]
//! composes them into the engine's `ProjectStore`.

pub mod milestone_repo;
pub mod project_repo;
pub mod project_store;
pub mod task_repo;

pub use milestone_repo::MilestoneRepo;
pub use project_repo::ProjectRepo;
pub use project_store::PgProjectStore;
pub use task_repo::TaskRepo;
