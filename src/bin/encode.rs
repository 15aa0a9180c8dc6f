//! Minimal CLI encoder.
//!
//! Reads an input file in `K`-byte chunks (the last chunk zero-padded)
//! and writes one parity file alongside it: `E` parity bytes plus one
//! integrity tag byte per chunk, in lockstep with the input.
//!
//! Usage:
//!   encode --in <path> [--out <path>]
//!
//! `--out` defaults to `<in>.parity`.

#![forbid(unsafe_code)]

use std::{env, fs::File, io::BufWriter, path::PathBuf};

use fecblock::io::encode_file;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "encode=info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();

    let in_path = parse_flag(&args, "--in")
        .ok_or_else(|| anyhow::anyhow!("usage: encode --in <path> [--out <path>]"))?;
    let in_path = PathBuf::from(in_path);

    let out_path = parse_flag(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = in_path.clone().into_os_string();
            p.push(".parity");
            PathBuf::from(p)
        });

    let input = File::open(&in_path)
        .map_err(|e| anyhow::anyhow!("open {}: {e}", in_path.display()))?;
    let output = File::create(&out_path)
        .map_err(|e| anyhow::anyhow!("create {}: {e}", out_path.display()))?;

    tracing::info!(input = %in_path.display(), output = %out_path.display(), "encoding");
    let report = encode_file(input, BufWriter::new(output))?;

    eprintln!(
        "wrote {} ({} block{}, {} padding byte{})",
        out_path.display(),
        report.blocks,
        if report.blocks == 1 { "" } else { "s" },
        report.padding_bytes,
        if report.padding_bytes == 1 { "" } else { "s" },
    );

    Ok(())
}
