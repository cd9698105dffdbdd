//! TOML config loading: explicit path or platform default.

mod loader;
mod paths;


pub use loader::{load_default, load_from_path, ConfigSource};
pub use paths::default_config_path;
