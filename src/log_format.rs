//! Log format that leads with the aircraft.
//!
//! Default tracing format: `LEVEL span1:span2: target: message callsign=X`
//! This format:            `LEVEL target: span1:span2: [X] message other=fields`

use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const CALLSIGN_FIELD: &str = "callsign";

/// Event formatter that puts target, then span context, then the callsign
pub struct CallsignFirstFormat {
    ansi: bool,
}

impl CallsignFirstFormat {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }
}

impl Default for CallsignFirstFormat {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Splits an event into callsign, message and the remaining fields
#[derive(Default)]
struct EventFields {
    callsign: Option<String>,
    message: String,
    rest: String,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            CALLSIGN_FIELD => self.callsign = Some(value.to_string()),
            "message" => self.message.push_str(value),
            name => {
                let _ = write!(self.rest, " {}={:?}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            CALLSIGN_FIELD => self.callsign = Some(format!("{:?}", value)),
            "message" => {
                let _ = write!(self.message, "{:?}", value);
            }
            name => {
                let _ = write!(self.rest, " {}={:?}", name, value);
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for CallsignFirstFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let level = metadata.level();
        if self.ansi {
            let level_style = match *level {
                tracing::Level::ERROR => "\x1b[31m", // Red
                tracing::Level::WARN => "\x1b[33m",  // Yellow
                tracing::Level::INFO => "\x1b[32m",  // Green
                tracing::Level::DEBUG => "\x1b[34m", // Blue
                tracing::Level::TRACE => "\x1b[35m", // Magenta
            };
            write!(writer, "{}{:>5}\x1b[0m ", level_style, level)?;
        } else {
            write!(writer, "{:>5} ", level)?;
        }

        write!(writer, "{}: ", metadata.target())?;

        if let Some(scope) = ctx.event_scope() {
            let names: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !names.is_empty() {
                write!(writer, "{}: ", names.join(":"))?;
            }
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);
        if let Some(callsign) = &fields.callsign {
            write!(writer, "[{}] ", callsign)?;
        }
        write!(writer, "{}{}", fields.message, fields.rest)?;

        writeln!(writer)
    }
}
