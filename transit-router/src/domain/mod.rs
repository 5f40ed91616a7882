//! Domain types for the transit routing engine.
//!
//! Validated leaf types shared by the rest of the crate: identifiers,
//! coordinates, clock times and the raw stop-sequence records the import
//! pipeline hands over. All types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod geo;
mod record;
mod stop;
mod time;

pub use geo::{Coordinates, haversine_km};
pub use record::StopSequenceRecord;
pub use stop::{InvalidId, RouteId, StopDetails, StopId};
pub use time::{Adjustment, InvalidTimeOfDay, TimeBand, TimeOfDay};
