//! Transit API client.
//!
//! The transit API speaks JSON:API: a response carries its primary records
//! in `data` and any related entities requested with `include=` in a
//! separate `included` side table. Records point at related entities by
//! `relationships.<kind>.data.id`.
//!
//! Two requests are used:
//! - `GET /routes?type=<route type>` lists the active routes for a mode
//! - `GET /schedules?filter[route]=...&include=route,trip,stop,prediction`
//!   returns scheduled stops with everything needed to display them

mod api;
mod client;
mod error;
mod mock;
mod types;

pub use api::TransitApi;
pub use client::{TransitClient, TransitConfig};
pub use error::TransportError;
pub use mock::MockTransitApi;
pub use types::{Document, EntityKind, Linkage, Relationship, Resource, ResourceIdentifier};
