//! `roleguard-core`: the user id and the error raised when one fails to parse.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::UserId;
