//! Live departure board for a regional rail network.
//!
//! Fetches the active routes for one transit mode, pulls their schedules
//! together with live predictions, and reconciles the normalized API
//! response into flat departure records ready for a table view.

pub mod board;
pub mod domain;
pub mod reconcile;
pub mod resolve;
pub mod transit;
pub mod web;
