//! # nimbus-sdk
//!
//! Client for the Nimbus edge-cloud and resource-manager APIs.
//!
//! The crate is split into:
//! - [`models`]: request payloads and response types with their wire names
//! - [`client`]: the [`EdgeApi`] / [`ProjectApi`] capabilities and the
//!   `reqwest`-backed [`HttpClient`] implementing them
//! - [`wait`]: polling handlers that drive asynchronous instance operations
//!   to a terminal state
//!
//! Everything above the transport talks to the traits, so callers can swap in
//! the scripted fake from the `testing` feature.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod models;
pub mod paths;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wait;

pub use client::{ClientConfig, EdgeApi, HttpClient, ProjectApi};
pub use error::{ApiError, ApiResult};
pub use models::{
    CreateInstancePayload, Instance, InstanceList, InstanceStatus, Kubeconfig, Plan, PlanList,
    Project, Token, UpdateInstancePayload,
};
pub use wait::{InstanceRef, WaitConfig, WaitError, Waiter};
