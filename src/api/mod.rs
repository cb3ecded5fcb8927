//! HTTP API handlers for huemap

pub mod health;
pub mod segments;
pub mod stream;

pub use health::health_routes;
pub use segments::get_segments;
pub use stream::stream_segments;
