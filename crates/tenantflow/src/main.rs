mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tenantflow")]
#[command(about = "顧客ごとの GitLab プロジェクトと GCP 環境をまとめて用意する", long_about = None)]
struct Cli {
    /// マニフェストファイルのパス（省略時は自動検出）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 作成されるリソースを表示
    Plan {
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// リソースを作成
    Up,
    /// マニフェストを検証（プロバイダーには接続しない）
    Validate,
    /// バージョンを表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr に出力（stdout は plan --json で使う）
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("tenantflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate => {
            commands::validate::handle(cli.config.as_deref())?;
        }
        Commands::Plan { json } => {
            commands::plan::handle(cli.config.as_deref(), json).await?;
        }
        Commands::Up => {
            commands::up::handle(cli.config.as_deref()).await?;
        }
    }

    Ok(())
}
