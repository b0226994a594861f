//! Connectors module
//!
//! This module provides the connector building blocks:
//! - The `Connector` trait every workflow connector implements
//! - The operation catalog and request builders
//! - Connector metadata and the registry for discovery and lookup
//! - The Anymailfinder and Smartlead connectors

pub mod anymailfinder;
pub mod catalog;
pub mod metadata;
pub mod registry;
pub mod smartlead;
pub mod trait_;

pub use catalog::{
    Catalog, OneOf, OperationDescriptor, OperationOption, Payload, RequestParts,
    ResourceDescriptor,
};
pub use metadata::{AuthType, ConnectorMetadata};
pub use registry::{Registry, RegistryError};
pub use trait_::Connector;

pub use anymailfinder::{AnymailFinderConnector, register_anymailfinder_connector};
pub use smartlead::{SmartleadConnector, register_smartlead_connector};
