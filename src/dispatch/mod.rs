//! Settlement dispatch and in-flight tracking

pub mod dispatcher;

pub use dispatcher::*;
