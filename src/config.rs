use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "MOVIE_INDEX_CONFIG";

/// Path to the user config file: `$MOVIE_INDEX_CONFIG` or `$HOME/.config/movie-index.toml`
///
/// Returns `None` if neither is set and the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});
