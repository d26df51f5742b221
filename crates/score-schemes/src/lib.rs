//! Scheme definition store.
//!
//! Schemes are declarative TOML documents (see [`definition`]). They are
//! loaded either from the definitions embedded in this crate or from a
//! directory verified against a sha256 `manifest.toml`, checked for internal
//! consistency, and served read-only from a [`SchemeStore`].

#![deny(unsafe_code)]

pub mod consistency;
pub mod definition;
pub mod doctor;
pub mod embedded;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod store;

pub use consistency::check_scheme;
pub use definition::parse_scheme;
pub use doctor::DoctorReport;
pub use error::{Result, SchemeError};
pub use paths::{SCHEMES_ENV_VAR, schemes_dir_from_env};
pub use store::{SchemeStore, SchemeStoreBuilder, VerifySummary};
