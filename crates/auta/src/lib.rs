//! `auta` - Minimal car record management web application
//!
//! This library provides the record store, form validation, session handling
//! and HTTP routes behind the `auta` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod car;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod session;
pub mod storage;
pub mod validation;
pub mod views;
pub mod web;

pub use car::{Car, CarDraft, CarForm};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use session::{Session, SessionCodec};
pub use storage::{Database, Storage};
pub use validation::{Strictness, ValidationError, Validator};
pub use web::{router, serve, AppState};
