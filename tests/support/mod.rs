//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod socket_guard;
pub mod stream_server;
