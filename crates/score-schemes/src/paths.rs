//! Scheme directory path resolution.

use std::path::PathBuf;

/// Environment variable pointing at a manifest-verified scheme directory.
pub const SCHEMES_ENV_VAR: &str = "SCORE_SCHEMES_DIR";

/// Scheme directory from `SCORE_SCHEMES_DIR`, if set and non-empty.
///
/// When unset, callers fall back to the built-in schemes.
pub fn schemes_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(SCHEMES_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
