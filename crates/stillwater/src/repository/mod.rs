//! Store access. Everything that builds a query lives here; controllers only
//! pass in filters and get back records.

pub mod sessions;
pub mod users;

pub use sessions::{Scope, SessionFilter, Sort, SortField, SortOrder, StatusCounts, TagCount};
