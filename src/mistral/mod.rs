//! Client for the hosted Mistral chat completion API.

mod core;
pub use self::core::*;
