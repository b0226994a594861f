//! # Outreach Connectors Library
//!
//! Workflow connectors for the Anymailfinder email-finding API and the
//! Smartlead cold-email platform: field descriptors, operation catalogs, a
//! sequential batch dispatcher and the HTTP plumbing underneath.

pub mod config;
pub mod connectors;
pub mod credentials;
pub mod error;
pub mod execution;
pub mod fields;
pub mod http;
pub mod telemetry;
