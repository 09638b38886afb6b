use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;

use trifold::{
    bundler::OxcBundler,
    orchestrator::{BuildConfig, build},
};

/// Bundles the TypeScript under each of `client`, `server` and `shared`
/// into one script per category.
#[derive(Parser)]
#[command(version, about)]
struct CLI {
    /// Directory holding the category subdirectories.
    #[arg(long, default_value = "./src")]
    source_dir: PathBuf,
    /// Output directory, replaced on every run.
    #[arg(long, default_value = "./dist")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(true)
        .init();
    let cli = CLI::parse();
    let config = BuildConfig {
        source_dir: cli.source_dir,
        out_dir: cli.out_dir,
    };
    match build(&config, Arc::new(OxcBundler)).await {
        Ok(_) => {
            log::info!("build complete");
            log::info!("output directory: {}/", config.out_dir.display());
            Ok(())
        }
        Err(error) => {
            eprintln!("{:?}", error);
            std::process::exit(1);
        }
    }
}
