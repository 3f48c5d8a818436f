pub mod classifier;
pub mod detection;
pub mod learning;
pub mod pipeline;
pub mod registry;
pub mod shared;
