use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Bracketed line format used on both stdout and the log file.
/// Format: [TIMESTAMP] [LEVEL] [STAGE] [TARGET: FILE:LINE]: MESSAGE
///
/// STAGE is the chain of open spans (`pipeline/prepare`), or `main` outside any span.
pub struct BracketedFormatter;

impl<S, N> FormatEvent<S, N> for BracketedFormatter
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
        // Get metadata
        let metadata = event.metadata();

        // Write local timestamp in brackets
        let now = chrono::Local::now();
        write!(writer, "[{}] ", now.format("%Y-%m-%d %H:%M:%S%.3f"))?;

        // Write level in brackets
        write!(writer, "[{:5}] ", metadata.level())?;

        // Write the stage: every open span from the root down, e.g. pipeline/train
        let stage = ctx
            .event_scope()
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| span.name())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| "main".to_string());
        write!(writer, "[{}] ", stage)?;

        // Write target and location in brackets
        match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => {
                write!(writer, "[{}: {}:{}]: ", metadata.target(), file, line)?
            }
            _ => write!(writer, "[{}]: ", metadata.target())?,
        }

        // Write the message
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
