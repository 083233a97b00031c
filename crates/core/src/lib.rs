pub mod auth;
pub mod config;
pub mod detail;
pub mod error;
pub mod model;
pub mod services;
pub mod stats;
pub mod storage;
pub mod store;

pub use auth::{AuthError, AuthPort, AuthUser, DirectoryAuth, UserProfile};
pub use config::AppConfig;
pub use detail::{DetailController, DetailState};
pub use error::{StoreError, StoreResult};
pub use model::*;
pub use services::Workspace;
pub use stats::TaskStats;
pub use storage::{LocalStore, MemoryPort, PersistencePort, RemoteBackend, RemotePort};
pub use store::TaskStore;
