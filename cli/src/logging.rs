//! Log subscriber setup for the `fdraft` binary.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "fdraft.log";

const DEFAULT_FILTER: &str = "fdraft=info,filter_draft_core=info,filter_draft_tui=info";
const VERBOSE_FILTER: &str = "fdraft=debug,filter_draft_core=debug,filter_draft_tui=debug";

/// `RUST_LOG` when set and valid, else the crate defaults. `-v` always wins.
pub fn build_filter(verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return EnvFilter::try_new(VERBOSE_FILTER).context("invalid log filter");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("invalid log filter")
}

/// Install the global subscriber.
///
/// With `log_dir` set (TUI mode) output is appended to `fdraft.log` in that
/// directory with ANSI colors off, since stderr belongs to the terminal UI.
/// Otherwise logs go to stderr.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let filter = build_filter(verbose)?;

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("failed to install log subscriber: {}", e)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_every_crate_to_debug() {
        let filter = build_filter(true).unwrap().to_string();
        assert!(filter.contains("filter_draft_core=debug"));
        assert!(filter.contains("fdraft=debug"));
    }

    #[test]
    fn quiet_filter_always_builds() {
        assert!(build_filter(false).is_ok());
    }

    #[test]
    fn default_directives_parse() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new(VERBOSE_FILTER).is_ok());
    }
}
