pub mod controller;
pub mod router;
pub mod service;

pub use router::init_tracks_router;
pub use service::TrackService;
