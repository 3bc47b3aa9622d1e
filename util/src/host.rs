//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use uname;

/// Environment variable pointing at the root of the software checkout. Parameter files and
/// session directories are resolved relative to it.
pub const SW_ROOT_ENV_VAR: &str = "CAT_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the `CAT_SW_ROOT` environment variable.
pub fn get_cat_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
