pub mod domain;
pub mod infrastructure;
pub mod predictor_registry;
