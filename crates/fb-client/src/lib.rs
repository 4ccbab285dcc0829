//! HTTP side of the form builder: a [`fb_core::FormBackend`] over the REST
//! API, and the configuration it is built from.

pub mod config;
pub mod rest;

pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL};
pub use rest::RestBackend;
