use std::path::{Path, PathBuf};
use std::sync::Once;
use std::{env, fs, io};

static TRACING_INIT: Once = Once::new();

/// Environment variable that overrides the application data directory.
pub const HOME_ENV: &str = "KAKEIBO_HOME";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("kakeibo_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Resolves the base application directory.
///
/// Precedence: explicit override, `KAKEIBO_HOME`, the platform data
/// directory, then the current directory as a last resort.
pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
    if let Some(root) = root {
        return root;
    }
    if let Some(home) = env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    dirs::data_dir()
        .map(|dir| dir.join("kakeibo"))
        .unwrap_or_else(|| PathBuf::from(".kakeibo"))
}

/// Creates the directory (and parents) when it does not exist yet.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
