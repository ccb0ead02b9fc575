// Thumbnail persistence
//
// Writes the selected frames to disk as <prefix>_<rank>[_<t>s][_<pct>pct].<ext>.
// Frames already in the target format are written as-is; anything else
// is re-encoded through ffmpeg.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use serde::Serialize;

use crate::constants::{DEFAULT_FILE_PREFIX, DEFAULT_JPEG_QUALITY};
use crate::error::{Result, ThumbError};
use crate::extract::RawFrame;
use crate::recommender::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[default]
    Jpg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ThumbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            other => Err(ThumbError::InvalidOptions(format!(
                "Unknown output format '{}', expected png or jpg",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub directory: PathBuf,
    pub format: OutputFormat,
    pub name_prefix: String,
    pub include_timestamp_in_name: bool,
    pub include_score_in_name: bool,
    /// 1-100, only used for JPEG
    pub jpeg_quality: u32,
}

impl OutputOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            format: OutputFormat::default(),
            name_prefix: DEFAULT_FILE_PREFIX.to_string(),
            include_timestamp_in_name: true,
            include_score_in_name: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// What `save_thumbnails` wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedThumbnails {
    pub paths: Vec<PathBuf>,
    pub directory: PathBuf,
    pub format: OutputFormat,
    pub total_bytes: u64,
}

/// Write one image per candidate, in rank order.
pub fn save_thumbnails(candidates: &[Candidate], options: &OutputOptions) -> Result<SavedThumbnails> {
    std::fs::create_dir_all(&options.directory)?;

    let mut paths = Vec::with_capacity(candidates.len());
    let mut total_bytes = 0u64;

    for (i, candidate) in candidates.iter().enumerate() {
        let name = generate_filename(candidate, i + 1, options);
        let path = options.directory.join(name);

        if matches_format(&candidate.frame.encoding, options.format) {
            write_atomic(&path, &candidate.frame.pixel_bytes)?;
        } else {
            transcode_frame(&candidate.frame, &path, options.format, options.jpeg_quality)?;
        }

        let size = std::fs::metadata(&path)?.len();
        log::debug!("Saved {} ({} bytes)", path.display(), size);

        total_bytes += size;
        paths.push(path);
    }

    log::info!(
        "Saved {} thumbnails to {} ({} bytes)",
        paths.len(),
        options.directory.display(),
        total_bytes
    );

    Ok(SavedThumbnails {
        paths,
        directory: options.directory.clone(),
        format: options.format,
        total_bytes,
    })
}

/// `<prefix>_<rank>[_<t>s][_<pct>pct].<ext>`, rank starting at 1.
pub fn generate_filename(candidate: &Candidate, rank: usize, options: &OutputOptions) -> String {
    let mut name = format!("{}_{}", options.name_prefix, rank);

    if options.include_timestamp_in_name {
        let t = (candidate.frame.timestamp * 10.0).round() / 10.0;
        name.push_str(&format!("_{}s", t));
    }

    if options.include_score_in_name {
        let pct = (candidate.score * 100.0).round() as u32;
        name.push_str(&format!("_{}pct", pct));
    }

    format!("{}.{}", name, options.format.extension())
}

/// True when the frame bytes are already in the requested format.
fn matches_format(encoding: &str, format: OutputFormat) -> bool {
    match (encoding.to_ascii_lowercase().as_str(), format) {
        ("png", OutputFormat::Png) => true,
        ("jpg" | "jpeg", OutputFormat::Jpg) => true,
        _ => false,
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = tmp_path_for(path);
    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("bin");
    path.with_extension(format!("tmp.{}", ext))
}

/// FFmpeg quality scale is 1-31 where 1 is best
fn jpeg_q_value(quality: u32) -> u32 {
    let quality = quality.clamp(1, 100);
    ((100 - quality) as f32 / 100.0 * 30.0 + 1.0) as u32
}

/// Re-encode through ffmpeg; the output extension picks the codec.
fn transcode_frame(frame: &RawFrame, output_path: &Path, format: OutputFormat, quality: u32) -> Result<()> {
    let work_dir = tempfile::Builder::new().prefix("thumbpick-out-").tempdir()?;
    let input_path = work_dir.path().join(format!("frame.{}", frame.encoding));
    std::fs::write(&input_path, &frame.pixel_bytes)?;

    let tmp_path = tmp_path_for(output_path);

    let mut cmd = Command::new(crate::tools::ffmpeg_path());
    cmd.arg("-y").args(["-v", "error"]).arg("-i").arg(&input_path);
    if format == OutputFormat::Jpg {
        cmd.args(["-q:v", &jpeg_q_value(quality).to_string()]);
    }
    cmd.arg(&tmp_path);

    let output = cmd
        .output()
        .map_err(|e| ThumbError::FFmpeg(format!("Failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        let _ = std::fs::remove_file(&tmp_path);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ThumbError::FFmpeg(format!(
            "{} encoding failed: {}",
            format.extension().to_uppercase(),
            stderr.trim()
        )));
    }

    // Atomic rename
    std::fs::rename(&tmp_path, output_path)?;
    Ok(())
}
