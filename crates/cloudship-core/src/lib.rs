//! Core types and configuration for cloudship.
//!
//! This crate defines the `config.json` schema ([`DeployConfig`]), the
//! secrets list ([`Secrets`]), environment access ([`EnvSource`],
//! [`DeployEnv`]), image tagging ([`ServiceVersion`], [`ImageName`]), and
//! the shared error type.

pub mod config;
pub mod env;
pub mod error;
pub mod image;
pub mod secrets;
pub mod version;

pub use config::{DEFAULT_CONFIG_PATH, DeployConfig};
pub use env::{DeployEnv, EnvSource, MapEnv, ProcessEnv};
pub use error::{Error, Result};
pub use image::ImageName;
pub use secrets::{DEFAULT_SECRETS_PATH, Secrets};
pub use version::ServiceVersion;
