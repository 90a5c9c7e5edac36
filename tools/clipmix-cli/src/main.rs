//! ClipMix CLI: stitch MP4 clips into one social-ready video.
//!
//! Usage:
//!   clipmix render <CLIPS>...   Render a mix
//!   clipmix plan <CLIPS>...     Print the render plan as JSON
//!   clipmix probe <CLIPS>...    Show clip metadata
//!   clipmix check               Check for ffmpeg/ffprobe
//!   clipmix config [--init]     Show or initialize configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use clipmix_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "clipmix",
    about = "Stitch short clips into one cropped, crossfaded video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Mix parameters shared by `render` and `plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct MixArgs {
    /// Input MP4 clips, in upload order
    #[arg(required = true)]
    pub clips: Vec<PathBuf>,

    /// Output aspect ratio: 9:16, 16:9 or 1:1
    #[arg(long)]
    pub aspect: Option<String>,

    /// Total duration in seconds, split evenly across clips (minimum 5)
    #[arg(long, conflicts_with = "keep_original")]
    pub target: Option<u32>,

    /// Keep every clip at its original length
    #[arg(long)]
    pub keep_original: bool,

    /// Take a random segment of each clip instead of its opening
    #[arg(long)]
    pub random_cut: bool,

    /// Shuffle the clip order
    #[arg(long)]
    pub shuffle: bool,

    /// Use hard cuts instead of crossfades
    #[arg(long)]
    pub no_crossfade: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a mix to MP4
    Render {
        #[command(flatten)]
        mix: MixArgs,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Probe clips and print the render plan as JSON without rendering
    Plan {
        #[command(flatten)]
        mix: MixArgs,

        /// Seed for shuffle and random cut decisions
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show duration, resolution and audio presence of clips
    Probe {
        /// Clips to probe
        #[arg(required = true)]
        clips: Vec<PathBuf>,
    },

    /// Check system capabilities
    Check,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    clipmix_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render { mix, output } => commands::render::run(&config, mix, output).await,
        Commands::Plan { mix, seed } => commands::plan::run(&config, mix, seed),
        Commands::Probe { clips } => commands::probe::run(&config, clips),
        Commands::Check => commands::check::run(&config),
        Commands::Config { init } => commands::config::run(&config, init),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_flags_parse() {
        let cli = Cli::try_parse_from([
            "clipmix",
            "render",
            "a.mp4",
            "b.mp4",
            "--aspect",
            "1:1",
            "--target",
            "20",
            "--shuffle",
            "-o",
            "out.mp4",
        ])
        .unwrap();

        let Commands::Render { mix, output } = cli.command else {
            panic!("expected render command");
        };
        assert_eq!(mix.clips.len(), 2);
        assert_eq!(mix.aspect.as_deref(), Some("1:1"));
        assert_eq!(mix.target, Some(20));
        assert!(mix.shuffle);
        assert!(!mix.random_cut);
        assert_eq!(output, Some(PathBuf::from("out.mp4")));
    }

    #[test]
    fn test_target_conflicts_with_keep_original() {
        let result = Cli::try_parse_from([
            "clipmix",
            "plan",
            "a.mp4",
            "--target",
            "20",
            "--keep-original",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_requires_clips() {
        assert!(Cli::try_parse_from(["clipmix", "render"]).is_err());
    }
}
