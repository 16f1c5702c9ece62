//! API exposure modules
//!
//! Each exposure consumes the resource registry and produces a Router for
//! its protocol.

pub mod rest;

pub use rest::RestExposure;
