//! In-memory query pipeline over a ship snapshot.
//!
//! # Responsibility
//! - Filter ships by optional criteria (`criteria`).
//! - Order ships by a closed set of sort keys (`order`).
//! - Slice an ordered result into pages (`page`).
//!
//! # Invariants
//! - Every stage is a pure function of its input; no store access happens here.
//! - Unset criteria, order or page parameters impose no constraint beyond
//!   their documented defaults.

pub mod criteria;
pub mod order;
pub mod page;

pub use criteria::{InvalidTimestamp, ShipCriteria, ShipFilter};
pub use order::{sort_ships, ShipOrder};
pub use page::{paginate, PageOutOfRange, PageRequest, DEFAULT_PAGE_NUMBER};
