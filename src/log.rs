//! Logging setup for the binary.

use tracing_subscriber::EnvFilter;

/// Map `-v` occurrences to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "fanout=warn",
        1 => "fanout=info",
        2 => "fanout=debug",
        _ => "fanout=trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `verbosity`.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "fanout=warn");
        assert_eq!(default_directive(2), "fanout=debug");
        assert_eq!(default_directive(9), "fanout=trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(1);
        init(3);
    }
}
