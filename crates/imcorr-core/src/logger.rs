//! Run logging for tracking jobs.
//!
//! Library code only uses the `log` macros. Binaries pick a sink once:
//! [`init_with_level`] for plain stderr lines, or `init_tracing` (feature
//! `tracing`) for span-aware output.

use std::fmt::Arguments;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Crate part of a log target: `imcorr_tracking::tracker::pipeline` becomes
/// `tracking`, foreign targets are kept as they are.
fn short_target(target: &str) -> &str {
    let krate = target.split("::").next().unwrap_or(target);
    krate.strip_prefix("imcorr_").unwrap_or(krate)
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("[{elapsed:8.3}s {level:>5} {}] {args}", short_target(target))
}

struct RunLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<RunLogger> = OnceLock::new();

/// Send `log` records at or above `level` to stderr.
///
/// Only the first call installs the logger; later calls return `Ok` and keep
/// the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| RunLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above are kept.
/// Span close events carry the time spent in `track` and `match_chips`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    // an already installed subscriber is kept
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_shortened_to_the_crate() {
        assert_eq!(short_target("imcorr_tracking::tracker::pipeline"), "tracking");
        assert_eq!(short_target("imcorr_matcher"), "matcher");
        assert_eq!(short_target("imcorr"), "imcorr");
        assert_eq!(short_target("rayon_core::registry"), "rayon_core");
    }

    #[test]
    fn line_layout() {
        let line = format_line(
            1.5,
            Level::Info,
            "imcorr_tracking::tracker::pipeline",
            &format_args!("{} accepted", 12),
        );
        assert_eq!(line, "[   1.500s  INFO tracking] 12 accepted");
    }
}
