//! Wharf Core
//!
//! Core types and abstractions for the Wharf packaging system.
//!
//! This crate contains:
//! - Domain types: Core business entities (Context, LogRecord, BuildResult, etc.)
//! - DTOs: Data transfer objects carried over the job-messaging channel

pub mod domain;
pub mod dto;
