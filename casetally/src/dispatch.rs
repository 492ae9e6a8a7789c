// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    errors::Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use casetally_metadata::CasetallyExitCode;
use casetally_runner::{
    aggregator::{AttachmentStager, EventAggregator},
    config::{ConfigLocation, ReporterConfig},
    reporter::{JunitConfig, ReporterBuilder, RunStats, StructuredReporter},
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::BufWriter;
use tokio::io::{AsyncRead, BufReader};
use tracing::debug;

/// Aggregates Cucumber messages into one result per executed test case.
#[derive(Debug, Parser)]
#[command(version, styles = crate::output::clap_styles::style())]
pub struct CasetallyApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl CasetallyApp {
    /// Initializes logging and color detection, returning the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Report(opts) => opts.exec(output, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a Cucumber message stream and report per-case results
    ///
    /// Messages are read as newline-delimited JSON. Results are printed to
    /// standard error as each test case finishes, and optionally written as
    /// JSON lines and a JUnit report.
    Report(ReportOpts),
}

#[derive(Debug, Args)]
struct ReportOpts {
    /// Message stream to read, or `-` for standard input
    #[arg(long, short, value_name = "PATH", default_value = "-")]
    input: Utf8PathBuf,

    /// Write one JSON object per event to this file
    #[arg(long, value_name = "PATH")]
    json: Option<Utf8PathBuf>,

    /// Write a JUnit XML report to this file
    #[arg(long, value_name = "PATH")]
    junit: Option<Utf8PathBuf>,

    /// Config file [default: .config/casetally.toml]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Exit with a non-zero code if any test case failed
    #[arg(long)]
    fail_on_failure: bool,
}

impl ReportOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = self.load_config()?;
        let header = config.run_header(Local::now().fixed_offset());

        let attachments_dir = config.attachments_dir()?;
        std::fs::create_dir_all(&attachments_dir).map_err(|err| {
            ExpectedError::AttachmentsDirCreateError {
                dir: attachments_dir.clone(),
                err,
            }
        })?;
        debug!("staging attachments in `{attachments_dir}`");

        let structured_reporter = match &self.json {
            Some(path) => {
                let file = std::fs::File::create(path).map_err(|err| {
                    ExpectedError::OutputCreateError {
                        path: path.clone(),
                        err,
                    }
                })?;
                StructuredReporter::JsonLines(Box::new(BufWriter::new(file)))
            }
            None => StructuredReporter::Disabled,
        };
        let junit = self
            .junit
            .as_deref()
            .map(|path| JunitConfig::new(path, header.root_suite_title.as_deref()));

        let mut builder = ReporterBuilder::default();
        builder
            .set_colorize(output.color.should_colorize(supports_color::Stream::Stderr))
            .set_verbose(output.verbose);
        let reporter = builder.build(output_writer.reporter_output(), structured_reporter, junit);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("casetally-worker")
            .build()
            .map_err(|err| ExpectedError::RuntimeBuildError { err })?;

        let stats = runtime.block_on(async {
            let input = open_input(&self.input).await?;
            let mut aggregator =
                EventAggregator::new(reporter, header, AttachmentStager::new(&attachments_dir));
            aggregator.consume_lines(BufReader::new(input)).await?;
            Ok::<RunStats, ExpectedError>(aggregator.finish().await?)
        })?;

        if self.fail_on_failure && stats.has_failures() {
            Ok(CasetallyExitCode::TEST_RUN_FAILED)
        } else {
            Ok(CasetallyExitCode::OK)
        }
    }

    fn load_config(&self) -> Result<ReporterConfig> {
        match &self.config_file {
            Some(path) => Ok(ReporterConfig::load(ConfigLocation::Explicit(path))?),
            None => {
                let cwd = current_dir()?;
                Ok(ReporterConfig::load(ConfigLocation::Default(&cwd))?)
            }
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
    Utf8PathBuf::try_from(cwd).map_err(|err| ExpectedError::CurrentDirNotUtf8 {
        path: err.into_path_buf(),
    })
}

async fn open_input(path: &Utf8Path) -> Result<Box<dyn AsyncRead + Unpin>> {
    if path.as_str() == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|err| ExpectedError::InputOpenError {
            path: path.to_owned(),
            err,
        })?;
    Ok(Box::new(file))
}
