//! Domain types for the departure board.
//!
//! Everything in here is validated data: identifiers, the configured
//! transit mode, the status algorithm and the records it produces. None of
//! these types know about HTTP or JSON:API framing.

mod departure;
mod ids;
mod mode;
mod status;
mod time;

pub use departure::{DepartureRecord, LAST_STOP_PREFIX};
pub use ids::RouteId;
pub use mode::{InvalidMode, TransitMode};
pub use status::{DisplayTime, LegStatus, Punctuality, compute_status};
pub use time::{CLOCK_FORMAT, TimeError, format_clock, humanize_distance, parse_timestamp};
