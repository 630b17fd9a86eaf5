/// Default cap on nested change notifications.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Store-wide settings, fixed when the [`Rx`](crate::Rx) context is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Emit a debug event (tag + payload) for every dispatch.
    pub log_dispatch: bool,

    /// Emit a debug event (path, previous and next value) for every write.
    pub log_writes: bool,

    /// Emit the full state snapshot when deferred dispatch logs are drained.
    pub log_snapshots: bool,

    /// Fail dependency reads of missing paths with `NotFound`.
    /// When off, missing dependencies read as `null`.
    pub strict_reads: bool,

    /// Maximum nesting of change notifications before a write fails with
    /// `DepthExceeded`. Guards against dependency cycles.
    pub max_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_dispatch: true,
            log_writes: true,
            log_snapshots: true,
            strict_reads: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl StoreConfig {
    /// Parse configuration from command-line style arguments.
    ///
    /// Supported flags:
    /// - `--log-dispatch=BOOL`
    /// - `--log-writes=BOOL`
    /// - `--log-snapshots=BOOL`
    /// - `--strict-reads=BOOL`
    /// - `--max-depth=N`
    ///
    /// Unknown arguments and unparsable values are ignored.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = StoreConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--log-dispatch=") {
                config.log_dispatch = parse_bool(val).unwrap_or(config.log_dispatch);
            } else if let Some(val) = arg.strip_prefix("--log-writes=") {
                config.log_writes = parse_bool(val).unwrap_or(config.log_writes);
            } else if let Some(val) = arg.strip_prefix("--log-snapshots=") {
                config.log_snapshots = parse_bool(val).unwrap_or(config.log_snapshots);
            } else if let Some(val) = arg.strip_prefix("--strict-reads=") {
                config.strict_reads = parse_bool(val).unwrap_or(config.strict_reads);
            } else if let Some(val) = arg.strip_prefix("--max-depth=") {
                if let Ok(n) = val.parse::<usize>() {
                    config.max_depth = n.max(1);
                }
            }
        }

        config
    }

    /// All diagnostics off; reads stay strict.
    pub fn quiet() -> Self {
        Self {
            log_dispatch: false,
            log_writes: false,
            log_snapshots: false,
            ..Self::default()
        }
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
