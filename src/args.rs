//! These structs provide the CLI interface for the finapp CLI.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// finapp: a dashboard and append tool for a personal finance tracking workbook.
///
/// The workbook lives in a cloud drive folder (or, if configured, a local file). `dashboard`
/// downloads it, consolidates the transaction sheets and prints the KPIs and grouped series.
/// `append` adds one transaction row to the register sheet and uploads the workbook back.
///
/// Start with `finapp init` to set up the data directory, then `finapp auth` to confirm the
/// refresh token works.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// You need an OAuth credentials JSON file (client id, client secret, refresh token and
    /// redirect URI) obtained from your drive's app registration; pass its path as
    /// --credentials and it will be moved into the data directory.
    Init(InitArgs),
    /// Verify that the stored refresh token can be exchanged for an access token.
    Auth,
    /// Download the workbook, consolidate the transaction sheets and print KPIs and series.
    Dashboard(DashboardArgs),
    /// Append one transaction row to the register sheet and upload the workbook.
    Append(AppendArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finapp data and configuration is held. Defaults to ~/finapp
    #[arg(long, env = "FINAPP_HOME", default_value_os_t = default_finapp_home())]
    finapp_home: PathBuf,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finapp_home(&self) -> &Path {
        &self.finapp_home
    }
}

fn default_finapp_home() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("finapp"),
        None => PathBuf::from("finapp"),
    }
}

#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to your OAuth credentials JSON file. This file will be moved to the default
    /// secrets location in the data directory.
    #[arg(long)]
    credentials: PathBuf,
}

impl InitArgs {
    pub fn credentials(&self) -> &Path {
        &self.credentials
    }
}

#[derive(Debug, Parser, Clone, Default)]
pub struct DashboardArgs {
    /// Only include rows with this exact category.
    #[arg(long)]
    category: Option<String>,

    /// Only include rows from this calendar month, given as YYYY-MM.
    #[arg(long)]
    month: Option<String>,
}

impl DashboardArgs {
    pub fn new(category: Option<String>, month: Option<String>) -> Self {
        Self { category, month }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

#[derive(Debug, Parser, Clone)]
pub struct AppendArgs {
    /// The transaction date, day first: dd/mm/yyyy.
    #[arg(long)]
    fecha: String,

    /// The transaction category.
    #[arg(long)]
    categoria: String,

    /// A free-text description.
    #[arg(long, default_value = "")]
    descripcion: String,

    /// The amount, e.g. 150 or 150.50.
    #[arg(long)]
    monto: String,

    /// The sheet to append to. Defaults to the configured register sheet.
    #[arg(long)]
    sheet: Option<String>,
}

impl AppendArgs {
    pub fn new(
        fecha: impl Into<String>,
        categoria: impl Into<String>,
        descripcion: impl Into<String>,
        monto: impl Into<String>,
        sheet: Option<String>,
    ) -> Self {
        Self {
            fecha: fecha.into(),
            categoria: categoria.into(),
            descripcion: descripcion.into(),
            monto: monto.into(),
            sheet,
        }
    }

    pub fn fecha(&self) -> &str {
        &self.fecha
    }

    pub fn categoria(&self) -> &str {
        &self.categoria
    }

    pub fn descripcion(&self) -> &str {
        &self.descripcion
    }

    pub fn monto(&self) -> &str {
        &self.monto
    }

    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }
}
