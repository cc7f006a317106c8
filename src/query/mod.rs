//! Filter and pagination query building
//!
//! Turns validated filter criteria plus an optional keyset cursor into a
//! deterministic, parameterized selection over the setup history view.

pub mod builder;
pub mod criteria;

pub use builder::{build, escape_literal, ParamValue, QueryDescriptor, QueryParam};
pub use criteria::{FilterCriteria, PageCursor, RawFilters, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
