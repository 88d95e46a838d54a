//! Runtime for the `iceboot` binary.
//!
//! The binary bootstraps a communicator from its own process arguments.
//! Runtime options (`--Ice.*` and plug-in options) are consumed by the
//! bootstrap; whatever remains is parsed as the tool's own flags.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use ice_config::PROGRAM_NAME_PROPERTY;
use serde_json::json;
use thiserror::Error;

use crate::args::ArgVector;
use crate::bootstrap::{Bootstrap, BootstrapError, InitializationData};
use crate::communicator::{Communicator, EncodingVersion};
use crate::stream::{
    StreamError, create_output_stream_with_encoding, wrap_input_stream_with_encoding,
};
use crate::version::RUNTIME_VERSION;

/// Flags left to the tool once the runtime has consumed its options.
#[derive(Parser, Debug)]
#[command(name = "iceboot", version, about = "Bootstraps a communicator and reports its state")]
pub(crate) struct Cli {
    /// Prints the resolved properties as JSON instead of the summary.
    #[arg(long)]
    pub(crate) dump_properties: bool,
    /// Restricts the property dump to keys starting with PREFIX.
    #[arg(long, value_name = "PREFIX", requires = "dump_properties")]
    pub(crate) prefix: Option<String>,
    /// Encoding used for the stream round trip. Defaults to the communicator's.
    #[arg(long, value_name = "MAJOR.MINOR")]
    pub(crate) encoding: Option<EncodingVersion>,
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("stream round trip failed: {0}")]
    Stream(#[from] StreamError),
    #[error("failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Runs `iceboot` with the default bootstrap collaborators.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(&Bootstrap::default(), args, stdout, stderr)
}

pub(crate) fn run_with<I, W, E>(
    bootstrap: &Bootstrap<'_>,
    args: I,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut vector = ArgVector::from_os_args(args);
    let result = bootstrap_communicator(bootstrap, &mut vector).and_then(|communicator| {
        let outcome = execute(&communicator, &vector.to_sequence(), stdout);
        communicator.destroy();
        outcome
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn bootstrap_communicator(
    bootstrap: &Bootstrap<'_>,
    vector: &mut ArgVector,
) -> Result<Communicator, CliError> {
    let (argc, argv) = vector.parts_mut();
    let communicator =
        bootstrap.initialize_argv(argc, argv, InitializationData::default(), RUNTIME_VERSION)?;
    Ok(communicator)
}

fn execute<W: Write>(
    communicator: &Communicator,
    remaining: &[String],
    stdout: &mut W,
) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(remaining)?;

    if cli.dump_properties {
        let prefix = cli.prefix.as_deref().unwrap_or_default();
        let properties = communicator.properties().get_properties_for_prefix(prefix);
        serde_json::to_writer_pretty(&mut *stdout, &properties)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let encoding = cli
        .encoding
        .unwrap_or_else(|| communicator.default_encoding());
    let program = communicator.properties().get_property(PROGRAM_NAME_PROPERTY);
    let encoded = round_trip(communicator, encoding, program)?;

    let summary = json!({
        "runtime": RUNTIME_VERSION.to_string(),
        "program": program,
        "properties": communicator.properties().len(),
        "encoding": encoding.to_string(),
        "encoded_bytes": encoded,
        "arguments": remaining.get(1..).unwrap_or_default(),
    });
    serde_json::to_writer(&mut *stdout, &summary)?;
    writeln!(stdout)?;
    Ok(())
}

// Writes `text` through an output stream and reads it back, returning the
// encoded length.
fn round_trip(
    communicator: &Communicator,
    encoding: EncodingVersion,
    text: &str,
) -> Result<usize, CliError> {
    let mut output = create_output_stream_with_encoding(communicator, encoding);
    output.write_string(text)?;
    let bytes = output.finished();

    let mut input = wrap_input_stream_with_encoding(communicator, &bytes, encoding);
    let decoded = input.read_string()?;
    if decoded != text || input.remaining() != 0 {
        return Err(CliError::Stream(StreamError::InvalidString));
    }
    Ok(bytes.len())
}
