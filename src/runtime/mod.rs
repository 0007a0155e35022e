//! Runtime adapters that drive scheduled tasks.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
