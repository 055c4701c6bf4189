//! Command-line configuration.
//!
//! File naming follows the tool's long-standing convention: encoding
//! `dir/name.ext` produces `dir/name.enc` plus a hidden frequency table
//! `dir/.name_freq.txt`, and decoding `dir/name.enc` looks for the table in
//! the same place.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "static-huffman", version, about = "Static Huffman file compressor")]
pub struct Cli {
    /// Log codec phases at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Tracing filter directive (overrides --verbose and RUST_LOG)
    #[arg(long, env = "STATIC_HUFFMAN_LOG", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compress a file, writing the payload and its frequency table
    Encode {
        input: PathBuf,
        /// Output name; its extension is replaced with `.enc`
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Frequency table path (default: `.<name>_freq.txt` beside the output)
        #[arg(long)]
        freq: Option<PathBuf>,
    },
    /// Decompress a payload using its frequency table
    Decode {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Frequency table path (default: `.<name>_freq.txt` beside the input)
        #[arg(long)]
        freq: Option<PathBuf>,
    },
    /// Print the code assigned to every byte of a file
    Codes { input: PathBuf },
    /// Print the Huffman tree built from a file
    Tree { input: PathBuf },
}

/// Fully resolved file locations for one encode or decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecPaths {
    pub source: PathBuf,
    pub sink: PathBuf,
    pub freq: PathBuf,
}

impl Cli {
    /// Explicit filter directive, if the user asked for one.
    pub fn log_directive(&self) -> Option<String> {
        match (&self.log_filter, self.verbose) {
            (Some(filter), _) => Some(filter.clone()),
            (None, true) => Some("debug".to_string()),
            (None, false) => None,
        }
    }

    /// Validate the resolved paths before touching any file
    pub fn validate(&self) -> Result<(), String> {
        let Some(paths) = self.command.paths() else {
            return Ok(());
        };
        if paths.source == paths.sink {
            return Err(format!(
                "output {} would overwrite the input",
                paths.sink.display()
            ));
        }
        if paths.freq == paths.source || paths.freq == paths.sink {
            return Err(format!(
                "frequency table {} collides with another file",
                paths.freq.display()
            ));
        }
        Ok(())
    }
}

impl Command {
    /// Resolved paths for `encode` and `decode`; `None` for inspection commands.
    pub fn paths(&self) -> Option<CodecPaths> {
        match self {
            Command::Encode {
                input,
                output,
                freq,
            } => {
                let base = output.as_deref().unwrap_or(input);
                Some(CodecPaths {
                    source: input.clone(),
                    sink: base.with_extension("enc"),
                    freq: freq.clone().unwrap_or_else(|| freq_path_for(base)),
                })
            }
            Command::Decode {
                input,
                output,
                freq,
            } => Some(CodecPaths {
                source: input.clone(),
                sink: output.clone(),
                freq: freq.clone().unwrap_or_else(|| freq_path_for(input)),
            }),
            Command::Codes { .. } | Command::Tree { .. } => None,
        }
    }
}

/// `dir/name.ext` -> `dir/.name_freq.txt`
pub fn freq_path_for(base: &Path) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.with_file_name(format!(".{}_freq.txt", stem))
}
