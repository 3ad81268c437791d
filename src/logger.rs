use tracing_subscriber::{EnvFilter, fmt, fmt::format::FmtSpan};

/// Filter used when `RUST_LOG` is unset: this crate at `info`, everything else quiet.
pub const DEFAULT_FILTER: &str = "color_tally=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global tracing subscriber. Later calls leave the first one in place.
///
/// Pass spans are `debug`, so their close events (with timings) only show up when
/// `RUST_LOG` asks for them.
pub fn init() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_scoped_to_this_crate() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(DEFAULT_FILTER.starts_with(concat!(env!("CARGO_PKG_NAME"), "=")));
    }

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        tracing::info!("still logging");
    }
}
