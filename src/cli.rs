// Thumbpick CLI binary

use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use log::LevelFilter;

use thumbpick::constants::{
    DEFAULT_FILE_PREFIX, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_FRAMES, DEFAULT_OPENAI_ENDPOINT,
    DEFAULT_OPENAI_MODEL, DEFAULT_OUTPUT_FORMAT, DEFAULT_TOP_N, ENV_OPENAI_API_KEY,
    ENV_OPENAI_ENDPOINT, ENV_OPENAI_MODEL,
};
use thumbpick::metadata::ffprobe;
use thumbpick::{
    compute_timestamps, save_thumbnails, AnalysisOptions, FfmpegExtractor, FrameExtractor,
    FrameQuality, OpenAiConfig, OpenAiOracle, OutputFormat, OutputOptions, RecommendOptions,
    Recommendation, Recommender, SamplingOptions,
};

#[derive(Parser)]
#[command(name = "thumbpick")]
#[command(about = "Thumbpick - pick the best thumbnail frames from a video", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where and how densely to sample
#[derive(clap::Args, Debug, Clone)]
struct SamplingArgs {
    /// Maximum frames to examine
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: usize,
    /// Fixed step between samples in seconds (default: spread evenly)
    #[arg(long)]
    interval: Option<f64>,
    /// Window start in seconds
    #[arg(long)]
    start: Option<f64>,
    /// Window end in seconds
    #[arg(long)]
    end: Option<f64>,
}

impl SamplingArgs {
    fn to_options(&self) -> SamplingOptions {
        SamplingOptions {
            max_frames: self.max_frames,
            start_time: self.start,
            end_time: self.end,
            interval_seconds: self.interval,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend thumbnail frames for a video
    Recommend {
        /// Video file
        video: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// How many thumbnails to return
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
        /// Extraction quality: low, medium or high
        #[arg(long, default_value = "medium")]
        quality: FrameQuality,
        /// Skip object counting
        #[arg(long)]
        no_objects: bool,
        /// Skip face counting
        #[arg(long)]
        no_faces: bool,
        /// Skip text detection
        #[arg(long)]
        no_text: bool,
        /// Skip description and tags
        #[arg(long)]
        no_description: bool,
        /// Replace the built-in analysis prompt
        #[arg(long)]
        prompt: Option<String>,
        /// Vision model
        #[arg(long, env = ENV_OPENAI_MODEL, default_value = DEFAULT_OPENAI_MODEL)]
        model: String,
        /// API key for the vision endpoint
        #[arg(long, env = ENV_OPENAI_API_KEY, hide_env_values = true)]
        api_key: Option<String>,
        /// Chat-completions endpoint
        #[arg(long, env = ENV_OPENAI_ENDPOINT, default_value = DEFAULT_OPENAI_ENDPOINT)]
        endpoint: String,
        /// Save the picked frames into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Image format for saved frames: png or jpg
        #[arg(long, default_value = DEFAULT_OUTPUT_FORMAT)]
        format: OutputFormat,
        /// File name prefix for saved frames
        #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
        prefix: String,
        /// JPEG quality 1-100
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        jpeg_quality: u32,
        /// Print the recommendation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what ffprobe reports for a video
    Probe {
        /// Video file
        video: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the timestamps that would be examined, without analyzing anything
    Plan {
        /// Video file
        video: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !ffprobe::is_available() {
        anyhow::bail!(
            "ffprobe not found. Install FFmpeg or set {}",
            thumbpick::constants::ENV_FFPROBE_PATH
        );
    }

    match cli.command {
        Commands::Recommend {
            video,
            sampling,
            top,
            quality,
            no_objects,
            no_faces,
            no_text,
            no_description,
            prompt,
            model,
            api_key,
            endpoint,
            output_dir,
            format,
            prefix,
            jpeg_quality,
            json,
        } => {
            let options = RecommendOptions {
                sampling: sampling.to_options(),
                top_n: top,
                quality,
                analysis: AnalysisOptions {
                    include_objects: !no_objects,
                    include_faces: !no_faces,
                    include_text: !no_text,
                    include_description: !no_description,
                    custom_prompt: prompt,
                },
            };

            let api_key = api_key
                .with_context(|| format!("No API key. Pass --api-key or set {}", ENV_OPENAI_API_KEY))?;
            let config = OpenAiConfig::new(api_key)
                .with_model(model)
                .with_endpoint(endpoint);

            let output = output_dir.map(|dir| OutputOptions {
                format,
                name_prefix: prefix,
                jpeg_quality,
                ..OutputOptions::new(dir)
            });

            cmd_recommend(&video, config, &options, output.as_ref(), json)
        }
        Commands::Probe { video, json } => cmd_probe(&video, json),
        Commands::Plan { video, sampling } => cmd_plan(&video, &sampling.to_options()),
    }
}

/// RUST_LOG wins when set; otherwise -v flags pick the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn cmd_recommend(
    video: &Path,
    config: OpenAiConfig,
    options: &RecommendOptions,
    output: Option<&OutputOptions>,
    json: bool,
) -> Result<()> {
    let oracle = OpenAiOracle::new(config)?;
    let recommender = Recommender::with_oracle(Box::new(FfmpegExtractor::new()), Box::new(oracle));

    let recommendation = recommender.recommend(video, options)?;

    let saved = match output {
        Some(opts) => Some(save_thumbnails(&recommendation.top_candidates, opts)?),
        None => None,
    };

    if json {
        let mut value = serde_json::to_value(&recommendation)?;
        if let Some(saved) = &saved {
            value["saved"] = serde_json::to_value(saved)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_recommendation(video, &recommendation);

    if let Some(saved) = saved {
        println!();
        println!("Saved {} files to {} ({} bytes):", saved.paths.len(), saved.directory.display(), saved.total_bytes);
        for path in &saved.paths {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

fn print_recommendation(video: &Path, rec: &Recommendation) {
    let w = &rec.video_window;

    println!("Video:       {}", video.display());
    println!("Duration:    {}", format_seconds(w.duration));
    if w.width > 0 && w.height > 0 {
        println!("Resolution:  {}x{}", w.width, w.height);
    }
    println!("Oracle:      {}", rec.oracle_name);
    println!("Time:        {}ms", rec.processing_time_ms);
    println!();

    if rec.top_candidates.is_empty() {
        println!("No candidates.");
        return;
    }

    println!("{:>4}  {:>10}  {:>6}  {:>10}  {}", "Rank", "Time", "Score", "Confidence", "Description");
    println!("{}", "-".repeat(70));

    for (i, c) in rec.top_candidates.iter().enumerate() {
        let description = c.analysis.description.as_deref().unwrap_or("-");
        let description = if description.chars().count() > 40 {
            format!("{}...", description.chars().take(37).collect::<String>())
        } else {
            description.to_string()
        };

        println!("{:>4}  {:>10}  {:>6.3}  {:>10.3}  {}",
            i + 1,
            format_seconds(c.frame.timestamp),
            c.score,
            c.confidence,
            description
        );
    }
}

fn cmd_probe(video: &Path, json: bool) -> Result<()> {
    let window = ffprobe::probe(video)
        .with_context(|| format!("Failed to probe {}", video.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&window)?);
        return Ok(());
    }

    println!("File:        {}", video.display());
    println!("Container:   {}", window.container_format);
    println!("Duration:    {}", format_seconds(window.duration));
    println!("Resolution:  {}x{}", window.width, window.height);
    println!("FPS:         {:.2}", window.frame_rate);
    println!("Size:        {} bytes", window.size_bytes);

    Ok(())
}

fn cmd_plan(video: &Path, sampling: &SamplingOptions) -> Result<()> {
    let extractor = FfmpegExtractor::new();
    let window = extractor.metadata(video)?;
    let timestamps = compute_timestamps(&window, sampling);

    println!("{} of {} would be sampled at {} points:", video.display(), format_seconds(window.duration), timestamps.len());
    for (i, t) in timestamps.iter().enumerate() {
        println!("  {:>3}. {} ({:.3}s)", i + 1, format_seconds(*t), t);
    }

    Ok(())
}

fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
