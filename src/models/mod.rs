// src/models/mod.rs

use serde::{Deserialize, Deserializer};

pub mod company;
pub mod job;
pub mod user;

pub use company::*;
pub use job::*;
pub use user::*;

/// For `Option<Option<T>>` patch fields with `#[serde(default)]`: a missing
/// key stays `None`, an explicit `null` becomes `Some(None)`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validation_error(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(message.into());
    error
}
