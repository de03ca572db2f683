//! Pipeline for filtering recommendation candidates.
//!
//! This crate provides:
//! - The `Filter` trait for composable candidate filters
//! - `FilterPipeline` for chaining filters in order
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//! use pipeline::filters::AlreadyRatedFilter;
//!
//! let pipeline = FilterPipeline::new().add_filter(AlreadyRatedFilter);
//! let filtered = pipeline.apply(candidates, &context)?;
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use traits::Filter;
