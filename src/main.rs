//! # cuckatoo-lean CLI
//!
//! Runs a full lean trimming run on the selected GPU and prints the
//! surviving edge count to stdout. Logs go to stderr (`RUST_LOG=info`
//! for round progress).

use clap::Parser;
use log::{error, info};

use cuckatoo_lean::config::TrimConfig;
use cuckatoo_lean::gpu::{GpuDevice, LeanTrimmer, TrimError};
use cuckatoo_lean::trim::SipKeys;

/// Command-line interface for the lean trimmer
#[derive(Parser)]
#[command(name = "cuckatoo-lean")]
#[command(about = "GPU lean edge trimmer for Cuckatoo proof-of-work graphs")]
#[command(long_about = "Trims a 2^EDGE_BITS Cuckatoo graph down to the edges worth
cycle-searching:
  cuckatoo-lean                        # full 2^29 graph, 60 rounds
  cuckatoo-lean --adapter NVIDIA       # pick a vendor by name substring
  cuckatoo-lean --adapter AMD --device-index 1
  cuckatoo-lean --edge-bits 20 --rounds 30
  cuckatoo-lean --k0 a34c6a2bdaa03a14  # graph keys in hex")]
#[command(version)]
struct Cli {
    /// Adapter name filter (substring, case-insensitive), e.g. "NVIDIA" or "AMD"
    #[arg(long)]
    adapter: Option<String>,

    /// Index into the adapters matching the filter
    #[arg(long, default_value_t = 0)]
    device_index: usize,

    /// Edge-space exponent: the graph has 2^EDGE_BITS edges per side
    #[arg(long, default_value_t = 29)]
    edge_bits: u32,

    /// Number of trimming rounds (the last round extracts survivors)
    #[arg(long, default_value_t = 60)]
    rounds: u32,

    /// Workgroups per dispatch chunk
    #[arg(long, default_value_t = 1024)]
    groups_per_chunk: u32,

    /// SipHash key 0 in hex
    #[arg(long, value_parser = parse_hex_u64, default_value = "a34c6a2bdaa03a14")]
    k0: u64,

    /// SipHash key 1 in hex
    #[arg(long, value_parser = parse_hex_u64, default_value = "d736650ae53eee9e")]
    k1: u64,

    /// SipHash key 2 in hex
    #[arg(long, value_parser = parse_hex_u64, default_value = "9a22f05e3bffed5e")]
    k2: u64,

    /// SipHash key 3 in hex
    #[arg(long, value_parser = parse_hex_u64, default_value = "b8d55478fa3a606d")]
    k3: u64,
}

fn parse_hex_u64(s: &str) -> Result<u64, String> {
    let digits = s.trim_start_matches("0x");
    u64::from_str_radix(digits, 16).map_err(|e| format!("not a hex u64: {e}"))
}

#[tokio::main]
async fn main() {
    // Initialize logging to stderr
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(count) => println!("trimmed to {count} edges"),
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<u32, TrimError> {
    let config = TrimConfig::new(cli.edge_bits, cli.rounds, cli.groups_per_chunk)?;
    let keys = SipKeys {
        k0: cli.k0,
        k1: cli.k1,
        k2: cli.k2,
        k3: cli.k3,
    };

    let device = if cli.adapter.is_some() || cli.device_index != 0 {
        GpuDevice::with_selector(cli.adapter.as_deref(), cli.device_index).await?
    } else {
        GpuDevice::new().await?
    };
    let info = device.info();
    info!("using adapter '{}' ({:?} backend)", info.name, info.backend);

    let mut trimmer = LeanTrimmer::new(device, config).await?;
    let result = trimmer.trim(keys).await?;
    Ok(result.count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_keys() {
        assert_eq!(
            parse_hex_u64("a34c6a2bdaa03a14").unwrap(),
            0xa34c_6a2b_daa0_3a14
        );
        assert_eq!(parse_hex_u64("0xff").unwrap(), 0xff);
        assert!(parse_hex_u64("not-hex").is_err());
    }

    #[test]
    fn test_cli_defaults_match_full_size_run() {
        let cli = Cli::parse_from(["cuckatoo-lean"]);
        assert_eq!(cli.edge_bits, 29);
        assert_eq!(cli.rounds, 60);
        assert_eq!(cli.groups_per_chunk, 1024);
        assert!(cli.adapter.is_none());
        assert_eq!(cli.device_index, 0);

        let keys = SipKeys {
            k0: cli.k0,
            k1: cli.k1,
            k2: cli.k2,
            k3: cli.k3,
        };
        assert_eq!(keys, SipKeys::TEST_HEADER);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "cuckatoo-lean",
            "--adapter",
            "NVIDIA",
            "--device-index",
            "1",
            "--edge-bits",
            "20",
            "--rounds",
            "30",
            "--groups-per-chunk",
            "64",
            "--k0",
            "0xdead",
        ]);
        assert_eq!(cli.adapter.as_deref(), Some("NVIDIA"));
        assert_eq!(cli.device_index, 1);
        assert_eq!(cli.edge_bits, 20);
        assert_eq!(cli.rounds, 30);
        assert_eq!(cli.groups_per_chunk, 64);
        assert_eq!(cli.k0, 0xdead);
    }
}
