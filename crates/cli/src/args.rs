use clap::Parser;
use std::path::PathBuf;

use stickerfit_core::TargetType;

#[derive(Debug, Parser)]
#[command(name = "stickerfit")]
#[command(author, version, about = "Fit images, GIFs and clips into sticker and emoji limits")]
pub struct Cli {
    /// Files or directories to convert
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// What to produce: video_sticker, static_sticker or emoji
    #[arg(short, long, default_value = "video_sticker")]
    pub target: TargetType,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of parallel workers, 0 for one per CPU (overrides the config file)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print a JSON report on stdout; progress lines go to stderr
    #[arg(long)]
    pub json: bool,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub print_metrics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["stickerfit", "clip.mp4"]).unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("clip.mp4")]);
        assert_eq!(cli.target, TargetType::VideoSticker);
        assert!(cli.output.is_none());
        assert!(cli.concurrency.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "stickerfit",
            "a.png",
            "pics/",
            "--target",
            "emoji",
            "-o",
            "out",
            "-j",
            "3",
            "--config",
            "stickerfit.toml",
            "--json",
            "--print-metrics",
        ])
        .unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.target, TargetType::Emoji);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.concurrency, Some(3));
        assert_eq!(cli.config, Some(PathBuf::from("stickerfit.toml")));
        assert!(cli.json);
        assert!(cli.print_metrics);
    }

    #[test]
    fn test_target_accepts_dashes() {
        let cli = Cli::try_parse_from(["stickerfit", "a.png", "-t", "static-sticker"]).unwrap();
        assert_eq!(cli.target, TargetType::StaticSticker);
    }

    #[test]
    fn test_rejects_unknown_target_and_missing_inputs() {
        assert!(Cli::try_parse_from(["stickerfit", "a.png", "-t", "banner"]).is_err());
        assert!(Cli::try_parse_from(["stickerfit"]).is_err());
    }
}
