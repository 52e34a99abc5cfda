//! # Core error types
//!
//! The core never retries I/O and never swallows errors; callers get
//! one of these five kinds back unchanged.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoolCvsError>;

#[derive(Debug, Error)]
pub enum CoolCvsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt object or reference: {0}")]
    Corrupt(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not a cool_cvs repository: {0}")]
    NotARepository(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
