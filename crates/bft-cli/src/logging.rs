use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::CliError;

/// Install the process-wide subscriber. Logs go to stderr so command output
/// on stdout stays machine-readable.
///
/// The filter comes from `BFT_LOG`, then `RUST_LOG`, and defaults to `warn`.
pub fn init_logging(json: bool) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_env("BFT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init()
    };

    result.map_err(|err| CliError::Logging(err.to_string()))
}
