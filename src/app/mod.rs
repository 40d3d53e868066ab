//! Application orchestration module

pub mod execution;
pub mod initialization;

pub use execution::{build_options, run};
pub use initialization::{build_generator_config, configure_logging, load_configuration};
