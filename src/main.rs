use analyzer_core::{format_usd_value, parse_address_input, Network};
use clap::Parser;
use config_manager::SystemConfig;
use job_orchestrator::AnalysisOrchestrator;
use std::path::{Path, PathBuf};
use tracing::info;

/// One-shot analysis from address files. The HTTP API lives in `api_server`.
#[derive(Parser, Debug)]
#[command(name = "wallet_analyzer")]
#[command(about = "Check which wallets hold which ERC-20 tokens", long_about = None)]
struct Args {
    /// File with one wallet address per line
    #[arg(short, long, required_unless_present = "show_config")]
    wallets: Option<PathBuf>,

    /// File with one token contract address per line
    #[arg(short, long, required_unless_present = "show_config")]
    tokens: Option<PathBuf>,

    /// ethereum or base
    #[arg(short, long, default_value = "ethereum")]
    network: String,

    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Print the effective configuration with keys redacted, then exit
    #[arg(long)]
    show_config: bool,
}

fn read_addresses(path: &Path) -> anyhow::Result<Vec<String>> {
    Ok(parse_address_input(&std::fs::read_to_string(path)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = SystemConfig::build_from_path(&args.config)?;

    if args.show_config {
        println!("{}", serde_json::to_string_pretty(&config.to_redacted_json())?);
        return Ok(());
    }

    let (Some(wallets_path), Some(tokens_path)) = (&args.wallets, &args.tokens) else {
        anyhow::bail!("--wallets and --tokens are required");
    };

    config.validate()?;
    let network: Network = args.network.parse()?;
    let wallets = read_addresses(wallets_path)?;
    let tokens = read_addresses(tokens_path)?;
    info!("Loaded {} wallets and {} tokens", wallets.len(), tokens.len());

    let orchestrator = AnalysisOrchestrator::new(config)?;
    let report = orchestrator.analyze(&wallets, &tokens, network).await?;

    let total: f64 = report
        .all_tokens
        .iter()
        .chain(&report.some_tokens)
        .map(|outcome| outcome.total_usd_value)
        .sum();
    info!(
        "📊 {} all / {} some / {} none, {} held in total",
        report.counts.all_tokens,
        report.counts.some_tokens,
        report.counts.no_tokens,
        format_usd_value(total)
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_config_needs_no_address_files() {
        let args = Args::try_parse_from(["wallet_analyzer", "--show-config"]).unwrap();
        assert!(args.show_config);
        assert!(args.wallets.is_none());
    }

    #[test]
    fn test_analysis_needs_both_address_files() {
        assert!(Args::try_parse_from(["wallet_analyzer"]).is_err());
        assert!(Args::try_parse_from(["wallet_analyzer", "--wallets", "w.txt"]).is_err());

        let args = Args::try_parse_from([
            "wallet_analyzer",
            "-w",
            "w.txt",
            "-t",
            "t.txt",
            "-n",
            "base",
        ])
        .unwrap();
        assert_eq!(args.tokens, Some(PathBuf::from("t.txt")));
        assert_eq!(args.network, "base");
    }
}
