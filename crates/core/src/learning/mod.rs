pub mod session_config;
pub mod session_controller;
pub mod session_observer;
pub mod state;
