pub mod filter_cache;

pub use filter_cache::{FILTER_CACHE_LOCK, FilterCacheJob, JobError, JobOutcome, JobReport};
