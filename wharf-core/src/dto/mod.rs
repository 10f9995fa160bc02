//! Data transfer objects
//!
//! Payloads carried over the job-messaging channel: the inbound build
//! request and the outbound report messages.

pub mod report;
pub mod request;
