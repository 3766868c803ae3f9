//! natmend - NAT-aware topology reconciliation
//!
//! Topology probes record connections after the kernel has rewritten them
//! with NAT, so a client appears to talk to a service's virtual address
//! rather than the endpoint actually serving it. This crate walks the
//! connection-tracking table and rewrites an endpoint topology report in
//! place so that each flow is represented by its true logical endpoints.

pub mod config;
pub mod conntrack;
pub mod error;
pub mod nat;
pub mod report;
pub mod telemetry;

pub use error::{Error, Result};
pub use nat::NatMapper;
