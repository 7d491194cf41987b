pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::init_filters_router;
pub use service::{CacheSource, FilterMetadataService, Resolution};
