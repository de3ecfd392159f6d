//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by support-desk:
//! - Chat services (e.g., Discord)
//! - Database services (e.g., SurrealDB)
//! - Messaging gateways (e.g., the zapmeow WhatsApp gateway)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
pub mod messenger;
