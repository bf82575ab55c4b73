#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod api;
pub mod app;
pub mod classification;
pub mod clients;
pub mod config;
pub mod evaluation;
pub mod healthcheck;
pub mod observability;
pub mod response;

pub use healthcheck::{healthcheck, healthcheck_with_port};
