pub use tido_cli::cli;
pub use tido_cli::commands;
pub use tido_cli::config;
pub use tido_cli::AppConfig;

pub use tido_core as core;
pub use tido_core::auth;
pub use tido_core::model;
pub use tido_core::storage;
pub use tido_core::Workspace;
