// External tool resolver for ffmpeg/ffprobe
//
// Resolution order:
// 1) Environment variable override (THUMBPICK_FFMPEG_PATH, THUMBPICK_FFPROBE_PATH)
// 2) Sidecar next to the executable (or in a bin/ subdirectory)
// 3) PATH fallback

use std::env;
use std::path::PathBuf;

use crate::constants::{ENV_FFMPEG_PATH, ENV_FFPROBE_PATH};

/// Get the directory containing the current executable
fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

/// Resolve a tool path, preferring explicit overrides over PATH lookup.
fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        log::warn!("{} points at missing file {}, ignoring", env_key, v);
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    if let Some(dir) = exe_dir() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return candidate;
        }

        let bin_candidate = dir.join("bin").join(&filename);
        if bin_candidate.exists() {
            return bin_candidate;
        }
    }

    PathBuf::from(default_name)
}

/// Get path to ffprobe binary
pub fn ffprobe_path() -> PathBuf {
    resolve_tool(ENV_FFPROBE_PATH, "ffprobe")
}

/// Get path to ffmpeg binary
pub fn ffmpeg_path() -> PathBuf {
    resolve_tool(ENV_FFMPEG_PATH, "ffmpeg")
}

/// Check if a tool is available at the resolved path
pub fn is_tool_available(tool: &str) -> bool {
    let path = match tool {
        "ffprobe" => ffprobe_path(),
        "ffmpeg" => ffmpeg_path(),
        _ => return false,
    };

    if path.exists() {
        return true;
    }

    std::process::Command::new(&path)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tool_fallback() {
        let path = resolve_tool("THUMBPICK_TEST_NONEXISTENT", "testcmd");
        assert_eq!(path, PathBuf::from("testcmd"));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("thumbpick_test_tool");
        std::fs::write(&temp_file, "test").unwrap();

        std::env::set_var("THUMBPICK_TEST_TOOL", temp_file.to_str().unwrap());
        let path = resolve_tool("THUMBPICK_TEST_TOOL", "default");
        assert_eq!(path, temp_file);

        std::env::remove_var("THUMBPICK_TEST_TOOL");
    }

    #[test]
    fn test_env_override_missing_file_falls_back() {
        std::env::set_var("THUMBPICK_TEST_MISSING", "/definitely/not/here/tool");
        let path = resolve_tool("THUMBPICK_TEST_MISSING", "fallbackcmd");
        assert_eq!(path, PathBuf::from("fallbackcmd"));
        std::env::remove_var("THUMBPICK_TEST_MISSING");
    }

    #[test]
    fn test_unknown_tool_not_available() {
        assert!(!is_tool_available("exiftool"));
    }
}
