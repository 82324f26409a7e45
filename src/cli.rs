//! Command-line wrapper around [`Hiera`].
//!
//! `main.rs` only installs logging, calls [`run`] and maps the result to an
//! exit code; everything else lives here so it can be tested.

use std::error::Error as _;
use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Hiera;
use crate::context::Context;
use crate::value::Value;
use crate::Error;

/// Prefix of environment variables imported into the context.
pub const ENV_PREFIX: &str = "HIERA";

/// Output format of resolved values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Resolve a hierarchy config into one flat document
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the hierarchy config file
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: PathBuf,

    /// Value of the `environment` context variable (default: local)
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Additional context variable, may be repeated
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print a single key instead of the flattened document
    #[arg(long, value_name = "KEY")]
    pub lookup: Option<String>,

    /// Merge strategy for --lookup: first, hash, unique or deep
    #[arg(long, value_name = "STRATEGY", requires = "lookup")]
    pub merge: Option<String>,

    /// List the loaded layers instead of resolving values
    #[arg(long, conflicts_with = "lookup")]
    pub layers: bool,

    /// Print the full error chain on failure
    #[arg(long)]
    pub traceback: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the interpolation context.
    ///
    /// `environment` defaults to `local`; `HIERA_*` environment variables
    /// override it, and command-line options override both.
    pub fn context(&self) -> Result<Context, Error> {
        let mut builder = Context::builder()
            .with_var("environment", "local")
            .with_env(ENV_PREFIX);

        if let Some(environment) = &self.environment {
            builder = builder.with_var("environment", environment.as_str());
        }

        for var in &self.vars {
            let (key, value) = var
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| Error::InvalidVariable(var.clone()))?;
            builder = builder.with_var(key, value);
        }

        Ok(builder.build())
    }
}

/// Runs the command and returns what should be printed on stdout.
pub fn run(cli: &Cli) -> Result<String, Error> {
    let ctx = cli.context()?;
    let data = Hiera::load_data(&cli.config_file, &ctx)?;

    if cli.layers {
        let mut out = String::new();
        for layer in data.layers() {
            let _ = writeln!(out, "{} ({} keys)", layer.origin, layer.data.len());
        }
        return Ok(out);
    }

    let value = match &cli.lookup {
        Some(key) => {
            let strategy = cli
                .merge
                .as_deref()
                .map(|name| data.parse_strategy(name, key))
                .transpose()?;
            data.lookup(key, strategy)?
                .ok_or_else(|| Error::KeyNotFound(key.clone()))?
        }
        None => Value::Mapping(data.flatten()?),
    };

    encode(&value, cli.format)
}

/// Serializes `value` in the requested format, newline terminated.
pub fn encode(value: &Value, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

/// Formats an error for stderr: `<Kind>: <message>`, or the debug form and
/// every cause when `traceback` is set.
pub fn report(err: &Error, traceback: bool) -> String {
    if !traceback {
        return format!("{}: {}", err.kind(), err);
    }

    let mut out = format!("{err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\ncaused by: {cause}");
        source = cause.source();
    }
    out
}
