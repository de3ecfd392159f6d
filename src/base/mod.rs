//! Core components, types, and utilities for support-desk.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Secret key derivation for the broadcast gateway.
//! - Common types and result handling.

pub mod config;
pub mod keys;
/// Common types and result handling.
pub mod types;
