//! The live board: loading, load status and the table query.
//!
//! A load resolves routes and reconciles their schedules in one go. Loads
//! are tagged with a generation number and only the newest one issued may
//! publish its records, so a slow response can never overwrite, or mix
//! with, a newer one.

mod loader;
mod query;

pub use loader::{BoardConfig, BoardLoader, BoardSnapshot, LoadError, LoadStatus};
pub use query::{BoardQuery, Column};
