//! Core configuration shared by the library and the CLI.

mod config;

pub use config::{
    ApiConfig, Config, OutputConfig, WorkflowConfig, ENV_API_TOKEN, ENV_API_URL, ENV_TIMEOUT_SECS,
};
