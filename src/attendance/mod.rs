pub mod calendar;
pub mod day_buckets;
pub mod employee;
pub mod error;
pub mod intervals;
pub mod snapshot;
pub mod summarize_week;
pub mod today;
pub mod warnings;
