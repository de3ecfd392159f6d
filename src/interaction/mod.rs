//! Event handling for ticket and comment side effects.
//!
//! This module provides the notification fan-out triggered by CRUD writes:
//! - Mirroring new tickets and new comments into Discord channels
//! - Broadcasting comments to interested parties over WhatsApp
//!
//! Handlers run after the originating write succeeded and never fail it.

pub mod comment_event;
pub mod ticket_event;
