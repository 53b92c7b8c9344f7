//! Log output setup.

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows the number of `-v`
/// flags: warn, info, debug, trace.
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "imgsplit=warn",
        1 => "imgsplit=info",
        2 => "imgsplit=debug",
        _ => "imgsplit=trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
