//! Log output for a single run.
//!
//! Lines look like `INFO 21:30 Created /path/to/archive.tar.gz.` on stderr.
//! The subscriber is handed to `tracing::subscriber::with_default` by the
//! binary, so it lives exactly as long as the run and nothing is installed
//! globally. Library code only emits events.

use std::fmt::{self, Write as _};

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Default logging target when `RUST_LOG` is not provided.
const DEFAULT_LOG_LEVEL: &str = "info";
const VERBOSE_LOG_LEVEL: &str = "debug";

pub fn subscriber(verbose: bool) -> impl Subscriber + Send + Sync + 'static {
    let level = if verbose { VERBOSE_LOG_LEVEL } else { DEFAULT_LOG_LEVEL };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    build(env_filter, std::io::stderr)
}

fn build<W>(env_filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .event_format(LineFormat::default())
        .finish()
}

/// `LEVEL HH:MM message`, one event per line, no targets or span context.
struct LineFormat {
    timer: ChronoLocal,
}

impl Default for LineFormat {
    fn default() -> Self {
        LineFormat {
            timer: ChronoLocal::new("%H:%M".to_string()),
        }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", event.metadata().level())?;
        self.timer.format_time(&mut writer)?;
        writer.write_char(' ')?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lines_start_with_level_then_time() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = build(EnvFilter::new("info"), move || sink.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Created out.tar.gz.");
            tracing::debug!("hidden at info");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1, "{output}");

        let (level, rest) = lines[0].split_once(' ').unwrap();
        let (time, message) = rest.split_once(' ').unwrap();
        assert_eq!(level, "INFO");
        assert!(chrono::NaiveTime::parse_from_str(time, "%H:%M").is_ok(), "{time}");
        assert_eq!(message, "Created out.tar.gz.");
    }
}
