use clap::Parser;

/// Mosaic — a shared scene split across independently-moving windows.
///
/// Runs a local simulation: several window contexts share one store and
/// keep a live, consistent view of each other while drifting around.
#[derive(Parser, Debug)]
#[command(name = "mosaic", version, about)]
pub struct Args {
    /// Number of simulated window contexts.
    #[arg(short = 'n', long)]
    pub windows: Option<usize>,

    /// How long to run, in seconds.
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Tick period in milliseconds.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Staleness threshold in milliseconds.
    #[arg(long)]
    pub staleness_ms: Option<u64>,

    /// Share the scene through a JSON file instead of process memory, so
    /// several mosaic processes can join the same scene.
    #[arg(long)]
    pub store_file: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_unset() {
        let args = Args::parse_from(["mosaic"]);
        assert!(args.windows.is_none());
        assert!(args.duration_secs.is_none());
        assert!(args.tick_ms.is_none());
        assert!(args.staleness_ms.is_none());
        assert!(args.store_file.is_none());
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());
    }

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "mosaic",
            "-n",
            "5",
            "--duration-secs",
            "30",
            "--tick-ms",
            "100",
            "--staleness-ms",
            "600",
            "--store-file",
            "/tmp/scene.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.windows, Some(5));
        assert_eq!(args.duration_secs, Some(30));
        assert_eq!(args.tick_ms, Some(100));
        assert_eq!(args.staleness_ms, Some(600));
        assert_eq!(args.store_file.as_deref(), Some("/tmp/scene.json"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
