pub mod artifact;
pub mod detection;
pub mod pipeline;
pub mod service;
pub mod shared;
pub mod transform;
pub mod video;
