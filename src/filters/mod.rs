pub mod apply;
pub mod parser;
pub mod spec;

pub use apply::{apply_filters, matches_file};
pub use parser::parse_filter;
pub use spec::{FilterSpec, compare_iso_prefix, iso_within, timestamp_in_bounds};
