//! Startup environment variables.

const DEFAULT_MANUAL_SYNC_PORT: u16 = 9281;

/// Values read once at process startup. CLI flags in `src/cli.rs` override
/// these when present.
#[derive(Debug, Clone, Copy)]
pub struct StartupEnv {
    pub dry_run: bool,
    pub manual_sync_port: u16,
}

impl StartupEnv {
    pub fn read() -> Self {
        StartupEnv {
            dry_run: read_dry_run(),
            manual_sync_port: read_manual_sync_port(),
        }
    }
}

fn read_dry_run() -> bool {
    std::env::var("DRY_RUN")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn read_manual_sync_port() -> u16 {
    std::env::var("MANUAL_SYNC_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MANUAL_SYNC_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_when_unset() {
        std::env::remove_var("MANUAL_SYNC_PORT");
        assert_eq!(read_manual_sync_port(), DEFAULT_MANUAL_SYNC_PORT);
    }

    #[test]
    fn dry_run_is_case_insensitive() {
        std::env::set_var("DRY_RUN", "TrUe");
        assert!(read_dry_run());
        std::env::remove_var("DRY_RUN");
    }
}
