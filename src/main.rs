use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use static_huffman::config::{Cli, Command};
use static_huffman::huffman_codec::open_byte_source;
use static_huffman::{FrequencyTable, HuffmanCodec};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.log_directive() {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli.validate().map_err(anyhow::Error::msg)?;

    match &cli.command {
        Command::Encode { .. } => {
            let paths = cli.command.paths().context("encode paths")?;
            let summary = HuffmanCodec::encode_file(&paths.source, &paths.sink, &paths.freq)
                .with_context(|| format!("encoding {}", paths.source.display()))?;
            info!(
                input = %paths.source.display(),
                encoded = %paths.sink.display(),
                freq = %paths.freq.display(),
                input_bytes = summary.input_bytes,
                encoded_bytes = summary.encoded_bytes,
                symbols = summary.distinct_symbols,
                "encoded"
            );
        }
        Command::Decode { .. } => {
            let paths = cli.command.paths().context("decode paths")?;
            let summary = HuffmanCodec::decode_file(&paths.source, &paths.sink, &paths.freq)
                .with_context(|| format!("decoding {}", paths.source.display()))?;
            info!(
                input = %paths.source.display(),
                output = %paths.sink.display(),
                output_bytes = summary.output_bytes,
                payload_bits = summary.payload_bits,
                "decoded"
            );
        }
        Command::Codes { input } => {
            let codec = codec_for(input)?;
            print!("{}", codec.code_table());
        }
        Command::Tree { input } => {
            let codec = codec_for(input)?;
            match codec.tree() {
                Some(tree) => print!("{}", tree),
                None => println!("(empty input, no tree)"),
            }
        }
    }

    Ok(())
}

fn codec_for(input: &Path) -> Result<HuffmanCodec> {
    let mut source = open_byte_source(input)?;
    let table = FrequencyTable::scan(&mut source)
        .with_context(|| format!("scanning {}", input.display()))?;
    Ok(HuffmanCodec::new(table)?)
}
