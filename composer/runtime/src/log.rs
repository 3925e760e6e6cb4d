//! Diagnostics go to standard error; standard output carries only rendered resources.

use kubert::{LogFilter, LogFormat};
use tracing::Subscriber;
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, util::TryInitError};

/// Installs the global subscriber, writing to standard error.
pub fn init(format: LogFormat, filter: LogFilter) -> Result<(), TryInitError> {
    subscriber(format, filter, std::io::stderr).try_init()
}

/// Builds a subscriber that writes events in `format` to `writer`.
pub fn subscriber<W>(
    format: LogFormat,
    filter: LogFilter,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    let events = match format {
        LogFormat::Plain => fmt::layer().with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer()
            .event_format(
                fmt::format()
                    .json()
                    .with_span_list(true)
                    .with_current_span(false),
            )
            .fmt_fields(fmt::format::JsonFields::default())
            .with_writer(writer)
            .boxed(),
    };
    registry.with(events)
}
