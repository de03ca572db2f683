//! Filter implementations.

pub mod already_rated;

pub use already_rated::AlreadyRatedFilter;
