//! File utilities behind the `sort-numbers` and `char-count` binaries

pub mod charcount;
pub mod sort;

pub use charcount::CharReport;
pub use sort::{sort_file, SortError};
