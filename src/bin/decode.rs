//! Minimal CLI decoder.
//!
//! Reads a (possibly-corrupted) data file and its parity file produced by
//! the `encode` binary in lockstep, `K` data bytes against `E + 1` parity
//! bytes per block, and writes the corrected data to an output file.
//! Uncorrectable blocks are passed through unchanged and counted in the
//! report rather than aborting the whole file.
//!
//! Usage:
//!   decode --data <path> --parity <path> [--out <path>] [--untrusted-parity] [--json]
//!
//! `--out` defaults to `<data>.decoded`. `--json` prints the
//! [`fecblock::io::DecodeReport`] to stdout instead of the plain summary line.

#![forbid(unsafe_code)]

use std::{env, fs::File, io::BufWriter, path::PathBuf};

use fecblock::io::decode_file;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "decode=info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();

    let data_path = parse_flag(&args, "--data").ok_or_else(|| {
        anyhow::anyhow!("usage: decode --data <path> --parity <path> [--out <path>] [--untrusted-parity] [--json]")
    })?;
    let data_path = PathBuf::from(data_path);

    let parity_path = parse_flag(&args, "--parity")
        .ok_or_else(|| anyhow::anyhow!("--parity <path> is required"))?;
    let parity_path = PathBuf::from(parity_path);

    let out_path = parse_flag(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = data_path.clone().into_os_string();
            p.push(".decoded");
            PathBuf::from(p)
        });

    // Per spec §9, PARITY_TRUSTED is a per-call policy, not a build flag;
    // this CLI defaults to the crate's trusted-parity policy and exposes
    // the untrusted path as an explicit opt-out.
    let parity_trusted = !has_flag(&args, "--untrusted-parity");
    let json = has_flag(&args, "--json");

    let data = File::open(&data_path).map_err(|e| anyhow::anyhow!("open {}: {e}", data_path.display()))?;
    let parity =
        File::open(&parity_path).map_err(|e| anyhow::anyhow!("open {}: {e}", parity_path.display()))?;
    let output =
        File::create(&out_path).map_err(|e| anyhow::anyhow!("create {}: {e}", out_path.display()))?;

    tracing::info!(
        data = %data_path.display(),
        parity = %parity_path.display(),
        output = %out_path.display(),
        parity_trusted,
        "decoding",
    );
    let report = decode_file(data, parity, BufWriter::new(output), parity_trusted)?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        eprintln!(
            "wrote {} ({} block{}: {} without errors, {} fixed, {} uncorrectable)",
            out_path.display(),
            report.total(),
            if report.total() == 1 { "" } else { "s" },
            report.without_errors,
            report.fixed,
            report.uncorrectable,
        );
        if report.uncorrectable > 0 {
            eprintln!("warning: {} block(s) were uncorrectable and passed through unchanged", report.uncorrectable);
        }
    }

    Ok(())
}
