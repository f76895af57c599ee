use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use log::LevelFilter;

/// Runtime configuration, read from the command line or the environment.
///
/// A `.env` file in the working directory is loaded before parsing.
#[derive(Debug, Parser)]
#[command(name = "codebin", version, about = "Store and share short code snippets")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CODEBIN_ADDRESS", default_value = "127.0.0.1:7878")]
    pub address: SocketAddr,

    /// Path of the SQLite database file
    #[arg(long, env = "CODEBIN_DATABASE", default_value = "./db.sqlite3")]
    pub database: PathBuf,

    /// Glob matching the Tera templates
    #[arg(long, env = "CODEBIN_TEMPLATES", default_value = "templates/**/*")]
    pub templates: String,

    /// Directory served under `/static`
    #[arg(long, env = "CODEBIN_PUBLIC", default_value = "public")]
    pub public: PathBuf,

    #[arg(long, env = "CODEBIN_LOG_LEVEL", default_value = "debug")]
    pub log_level: LevelFilter,
}
