//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors, state machines)
//! - `maintenance` - Applications, maintenance events and the active-event rule

pub mod foundation;
pub mod maintenance;
