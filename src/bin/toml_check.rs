use anyhow::Context;
use clap::Parser;
use isbn_checker::core::ConfigProvider;
use isbn_checker::utils::{logger, validation::Validate};
use isbn_checker::{run_check, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-check")]
#[command(about = "ISBN catalog check driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "isbn-checker.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the input file from config
    #[arg(long)]
    input: Option<String>,

    /// Override the output file from config
    #[arg(long)]
    output: Option<String>,

    /// Show what would be checked without contacting the catalog
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(input) = args.input {
        config.input.path = input;
    }
    if let Some(output) = args.output {
        config.output.path = output;
    }

    let verbose = args.verbose || config.verbose();
    if config.log_json() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the catalog will not be contacted");
        return Ok(());
    }

    match run_check(config).await {
        Ok(output_path) => {
            println!("✅ Catalog check completed successfully!");
            println!("📁 Results saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Catalog check failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration summary:");
    tracing::info!("  Catalog: {}", config.catalog_url());
    match config.hit_count_pattern() {
        Some(pattern) => tracing::info!("  Match rule: hit count pattern '{}'", pattern),
        None => tracing::info!("  Match rule: marker '{}'", config.no_results_marker()),
    }
    tracing::info!("  Input: {}", config.input_path());
    tracing::info!("  Output: {}", config.output_path());
    tracing::info!(
        "  Settle delay: {:?}, concurrency: {}",
        config.settle_delay(),
        config.concurrent_requests()
    );
}
