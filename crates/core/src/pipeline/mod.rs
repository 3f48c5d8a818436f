pub mod announcer;
pub mod frame_pipeline;
pub mod infrastructure;
