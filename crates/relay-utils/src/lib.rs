//! Shared utilities for the relay workspace
//!
//! This crate provides the ambient pieces every other crate leans on:
//! tracing setup and typed access to environment configuration.

pub mod config;
pub mod logging;

pub use config::{
    ConfigError, EnvSource, ProcessEnv, env_flag, env_or, env_parse, first_env, load_dotenv,
    optional_env, required_env,
};
pub use logging::{LogFormat, init_tracing};
