//! Compact colored log line format.
//!
//! `[LEVEL] [MM-DD|hh:mm:ss.sss] target message key=value ...`
use std::fmt;

use nu_ansi_term::{Color, Style};
use time::{OffsetDateTime, format_description::OwnedFormatItem};
use tracing::{Event, Level, Subscriber, field, span};
use tracing_subscriber::field::{RecordFields, VisitFmt, VisitOutput};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

const MESSAGE_WIDTH: usize = 40;

pub struct CompactFormat {
    time_format: Option<OwnedFormatItem>,
}

impl Default for CompactFormat {
    fn default() -> Self {
        let time_format = time::format_description::parse_owned::<2>(
            r#"\[[month]-[day]|[hour]:[minute]:[second].[subsecond digits:3]\]"#,
        )
        .ok();

        Self { time_format }
    }
}

impl CompactFormat {
    fn write_time(&self, writer: &mut Writer<'_>) -> fmt::Result {
        let Some(format) = self.time_format.as_ref() else {
            return writer.write_str("[<unknown-timestamp>]");
        };

        let now = OffsetDateTime::now_utc();
        match now.format(format) {
            Ok(formatted) => writer.write_str(&formatted),
            Err(_) => writer.write_str("[<unknown-timestamp>]"),
        }
    }
}

impl<S, N> FormatEvent<S, N> for CompactFormat
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
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        write!(writer, "{} ", LevelLabel(meta.level(), ansi))?;
        self.write_time(&mut writer)?;

        if ansi {
            write!(writer, " {} ", Style::new().dimmed().paint(meta.target()))?;
        } else {
            write!(writer, " {} ", meta.target())?;
        }

        ctx.format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

impl<'w> FormatFields<'w> for CompactFormat {
    fn format_fields<R: RecordFields>(&self, writer: Writer<'w>, fields: R) -> fmt::Result {
        let mut visitor = FieldVisitor::new(writer, true);
        fields.record(&mut visitor);
        visitor.finish()
    }

    fn add_fields(
        &self,
        current: &'w mut FormattedFields<Self>,
        fields: &span::Record<'_>,
    ) -> fmt::Result {
        let empty = current.is_empty();
        let mut visitor = FieldVisitor::new(current.as_writer(), empty);
        fields.record(&mut visitor);
        visitor.finish()
    }
}

struct FieldVisitor<'a> {
    writer: Writer<'a>,
    is_empty: bool,
    result: fmt::Result,
}

impl<'a> FieldVisitor<'a> {
    fn new(writer: Writer<'a>, is_empty: bool) -> Self {
        Self {
            writer,
            is_empty,
            result: Ok(()),
        }
    }

    fn separator(&mut self) -> &'static str {
        if self.is_empty {
            self.is_empty = false;
            ""
        } else {
            " "
        }
    }
}

impl field::Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &field::Field, value: &str) {
        if field.name() == "message" {
            self.record_debug(field, &format_args!("{value}"));
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &field::Field, value: &dyn fmt::Debug) {
        if self.result.is_err() {
            return;
        }

        let separator = self.separator();
        let ansi = self.writer.has_ansi_escapes();

        self.result = match field.name() {
            "message" => write!(
                self.writer,
                "{separator}{:<width$}",
                format!("{value:?}"),
                width = MESSAGE_WIDTH
            ),
            name if ansi => {
                let color = if name == "error" || name == "reason" {
                    Color::Red
                } else {
                    Color::Blue
                };
                write!(
                    self.writer,
                    "{separator}{name}={}",
                    color.paint(format!("{value:?}"))
                )
            }
            name => write!(self.writer, "{separator}{name}={value:?}"),
        };
    }
}

impl VisitOutput<fmt::Result> for FieldVisitor<'_> {
    fn finish(self) -> fmt::Result {
        self.result
    }
}

impl VisitFmt for FieldVisitor<'_> {
    fn writer(&mut self) -> &mut dyn fmt::Write {
        &mut self.writer
    }
}

struct LevelLabel<'a>(&'a Level, bool);

impl fmt::Display for LevelLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, color) = match *self.0 {
            Level::TRACE => ("TRACE", Color::Purple),
            Level::DEBUG => ("DEBUG", Color::Blue),
            Level::INFO => ("INFO", Color::Green),
            Level::WARN => ("WARN", Color::Yellow),
            Level::ERROR => ("ERROR", Color::Red),
        };

        if self.1 {
            write!(f, "[{}]", color.paint(label))
        } else {
            write!(f, "[{label}]")
        }
    }
}
