//! Session types shared by the store service and its tests.
//!
//! Provides session JWT issuing/validation, the `sign_in` cookie builders, and
//! the `Session` extractor.

pub mod cookie;
pub mod session;
pub mod token;
