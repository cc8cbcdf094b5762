//! CLI command definitions and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use utilkit_core::crypto::hash::{md5_hex, sha1_hex, sha256_hex};
use utilkit_core::file::archive::{unzip, zip_dir_deterministic, zip_files};
use utilkit_core::file::hash::{file_md5, file_sha1, file_sha256};
use utilkit_core::{csv_io, date, json, net, CoreResult, TaggedError, UtilConfig};

/// Small file, crypto, data and network helpers.
#[derive(Debug, Parser)]
#[command(name = "utilkit", version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HashAlgo {
    Md5,
    Sha1,
    Sha256,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the hex digest of a file or a string
    Hash {
        /// File to hash
        #[arg(required_unless_present = "text", conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Hash this string instead of a file
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_enum, default_value = "sha256")]
        algo: HashAlgo,
    },
    /// Deflate files into a zip archive
    Zip {
        out: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Zip a directory reproducibly and print the archive's SHA-256
    ZipDir { dir: PathBuf, out: PathBuf },
    /// Extract an archive and list the extracted paths
    Unzip { archive: PathBuf, dest: PathBuf },
    /// Pretty-print a JSON object
    JsonPretty { file: PathBuf },
    /// Print CSV records, fields separated by spaces
    CsvShow { file: PathBuf },
    /// GET a URL and print the status and body
    Fetch { url: String },
    /// Report whether a TCP port accepts connections
    PortCheck {
        host: String,
        port: u16,
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,
    },
    /// Print this host's first non-loopback IPv4 address
    LocalIp,
    /// Print this host's name
    Hostname,
    /// Print network interfaces as JSON
    Interfaces,
    /// Print when the TLS certificate served on port 443 expires
    SslExpiry { domain: String },
}

const RFC3339: &str =
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]";

impl Cli {
    pub fn execute(&self) -> CoreResult<()> {
        let cfg = UtilConfig::load_or_default(self.config.as_deref())?;
        tracing::debug!(command = ?self.command, config = ?self.config, "running command");
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match &self.command {
            Commands::Hash { file, text, algo } => {
                let digest = match (file, text) {
                    (_, Some(text)) => match algo {
                        HashAlgo::Md5 => md5_hex(text),
                        HashAlgo::Sha1 => sha1_hex(text),
                        HashAlgo::Sha256 => sha256_hex(text),
                    },
                    (Some(file), None) => match algo {
                        HashAlgo::Md5 => file_md5(file)?,
                        HashAlgo::Sha1 => file_sha1(file)?,
                        HashAlgo::Sha256 => file_sha256(file)?,
                    },
                    (None, None) => {
                        return Err(TaggedError::validation("give a file or --text").into())
                    }
                };
                writeln!(out, "{}", digest)?;
            }
            Commands::Zip { out: archive, inputs } => {
                zip_files(archive, inputs)?;
                writeln!(out, "{}", archive.display())?;
            }
            Commands::ZipDir { dir, out: archive } => {
                let sha = zip_dir_deterministic(dir, archive, &cfg.archive)?;
                writeln!(out, "{}  {}", sha, archive.display())?;
            }
            Commands::Unzip { archive, dest } => {
                for path in unzip(archive, dest)? {
                    writeln!(out, "{}", path.display())?;
                }
            }
            Commands::JsonPretty { file } => {
                let data = std::fs::read(file)?;
                json::pretty_print_to_writer(&data, &mut out)?;
                writeln!(out)?;
            }
            Commands::CsvShow { file } => {
                let records = csv_io::read_csv_file_with(file, &cfg.csv)?;
                csv_io::print_csv_data(&records, &mut out)?;
            }
            Commands::Fetch { url } => {
                let (status, body) = net::simple_get_request_with(url, &cfg.http)?;
                writeln!(out, "{}", status)?;
                writeln!(out, "{}", body)?;
            }
            Commands::PortCheck {
                host,
                port,
                timeout_ms,
            } => {
                let open = net::is_port_open(host, *port, Duration::from_millis(*timeout_ms));
                writeln!(out, "{}:{} {}", host, port, if open { "open" } else { "closed" })?;
            }
            Commands::LocalIp => writeln!(out, "{}", net::local_ip()?)?,
            Commands::Hostname => writeln!(out, "{}", net::hostname()?)?,
            Commands::Interfaces => {
                let ifaces = net::network_interfaces()?;
                writeln!(out, "{}", serde_json::to_string_pretty(&ifaces)?)?;
            }
            Commands::SslExpiry { domain } => {
                let expiry = net::ssl_expiry(domain, &cfg.http)?;
                writeln!(out, "{}", date::format_date(expiry, RFC3339)?)?;
            }
        }
        Ok(())
    }
}
