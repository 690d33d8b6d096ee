//! Configuration module for Budget Saver
//!
//! This module provides configuration management including:
//! - Platform-aware path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SaverPaths;
pub use settings::{OverdraftPolicy, Settings, StorageFormat};
