//! External collaborator contracts and their HTTP implementations

pub mod traits;
pub mod retry;
pub mod http;

#[cfg(test)]
pub mod mock;

pub use traits::*;
pub use retry::*;
pub use http::*;
