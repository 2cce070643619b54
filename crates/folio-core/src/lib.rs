#![forbid(unsafe_code)]

//! Core: layout snapshots, host events, coalescing, and rate limiting.
//!
//! Nothing in this crate touches a DOM. The host measures the page, pushes
//! [`event::Event`] values, and the higher layers decide what to mutate.

pub mod event;
pub mod event_coalescer;
pub mod geometry;
pub mod logging;
pub mod throttle;
