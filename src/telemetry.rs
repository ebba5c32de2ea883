//! Opt-in `tracing` subscriber for hosts, benches and tests.
//!
//! The library only emits events; nothing is printed until a host installs a
//! subscriber, either its own or the one set up here.

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "formant_chart=info";

static SUBSCRIBER: OnceLock<bool> = OnceLock::new();

/// Installs a compact fmt subscriber filtered by `RUST_LOG`.
///
/// Safe to call repeatedly. Returns whether a subscriber from this module is
/// active, which is `false` if another global subscriber was installed first.
pub fn init() -> bool {
    *SUBSCRIBER.get_or_init(|| install(false))
}

/// Like [`init`], but routes output through the libtest capture.
pub fn init_for_tests() -> bool {
    *SUBSCRIBER.get_or_init(|| install(true))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()))
}

fn install(test_writer: bool) -> bool {
    let builder = fmt().with_env_filter(filter()).with_target(false).compact();
    let result = if test_writer {
        builder.with_test_writer().try_init()
    } else {
        builder.try_init()
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            eprintln!("[telemetry] tracing subscriber not installed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_stable() {
        let first = init_for_tests();
        assert_eq!(init(), first);
        assert_eq!(init_for_tests(), first);
    }
}
