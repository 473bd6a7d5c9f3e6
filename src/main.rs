use anyhow::Result;
use clap::Parser;
use cineplayer::app::{run, RunOptions};
use cineplayer::storage::config::PlaybackMode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cineplayer", version, about = "Terminal video player controls for VLC")]
struct Cli {
    #[arg(help = "Media URL or file path to play")]
    media_url: String,

    #[arg(long, help = "Enable verbose debug logs")]
    debug: bool,

    #[arg(long, value_name = "PATH", help = "Config file (default ~/.config/cineplayer/config.toml)")]
    config: Option<PathBuf>,

    #[arg(long, value_parser = PlaybackMode::parse, help = "VLC control mode: rc or http")]
    mode: Option<PlaybackMode>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(RunOptions {
        media_url: cli.media_url,
        debug: cli.debug,
        config_path: cli.config,
        mode: cli.mode,
    })
}
