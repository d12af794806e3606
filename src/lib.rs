//! Maintenance Beacon - maintenance event tracking with live status fan-out.
//!
//! Applications (a slug plus a deployment tier) carry maintenance events. At
//! most one event per application may be active at a time, and every change
//! is pushed to the WebSocket clients watching that application.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
