//! Core domain types
//!
//! This module contains the core domain structures used across Wharf services.
//! These types represent the fundamental business entities and are shared between
//! the queue (for scheduling) and the worker (for execution).

pub mod context;
pub mod job;
pub mod log;
pub mod result;
