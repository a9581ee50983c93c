//! Storage layer for gitdata
//!
//! Handles the configuration file and the local credential store.
//! Both are TOML files under the platform config directory.

use crate::error::StorageError;
use std::path::{Path, PathBuf};

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, StorageError>;

pub const APP_DIR_NAME: &str = "gitdata";

/// `<config_dir>/gitdata`, or `dir_override` when one is given.
pub fn app_dir(dir_override: Option<&Path>) -> Result<PathBuf> {
    match dir_override {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(StorageError::ConfigDirNotFound),
    }
}
