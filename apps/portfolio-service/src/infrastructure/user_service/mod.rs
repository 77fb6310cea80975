//! User-service client adapter.

mod client;

pub use client::{HttpUserStatusClient, UserServiceConfig};
