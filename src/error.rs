//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::render::RenderError;

/// Any error the library can return
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;
