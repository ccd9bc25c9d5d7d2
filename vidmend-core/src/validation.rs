//! Checks on user-supplied file paths and output name generation.

use std::path::{Path, PathBuf};

/// Extensions accepted as video input, lower case without the dot.
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 10] = [
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "m3u8", "ts", "webm", "3gp",
];

/// Name used when sanitising leaves nothing.
const FALLBACK_FILE_NAME: &str = "output";

/// Highest suffix tried by [`unique_output_path`].
const MAX_NAME_SUFFIX: u32 = 999;

/// Whether `path` is an existing file with a supported video extension.
#[must_use]
pub fn is_supported_video_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `path` names a file inside an existing directory.
#[must_use]
pub fn is_valid_output_path(path: &Path) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    if file_name.is_empty() {
        return false;
    }
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => true,
        Some(parent) => parent.is_dir(),
        None => false,
    }
}

/// Replaces characters that are not allowed in file names with `_`.
///
/// Runs of invalid characters collapse into one separator and leading or
/// trailing separators are dropped. An empty result becomes `"output"`.
#[must_use]
pub fn safe_file_name(name: &str) -> String {
    let safe = name
        .split(is_invalid_file_name_char)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if safe.trim().is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        safe
    }
}

fn is_invalid_file_name_char(c: char) -> bool {
    c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}

/// `dir/base.ext`, or the first free `dir/base_N.ext` for N in 1..=999.
///
/// When every candidate exists the last one is returned.
#[must_use]
pub fn unique_output_path(dir: &Path, base: &str, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    let candidate = dir.join(format!("{base}.{extension}"));
    if !dir.is_dir() || !candidate.exists() {
        return candidate;
    }

    let mut path = candidate;
    for counter in 1..=MAX_NAME_SUFFIX {
        path = dir.join(format!("{base}_{counter}.{extension}"));
        if !path.exists() {
            break;
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn supported_video_files() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.MKV");
        let text = dir.path().join("notes.txt");
        fs::write(&clip, b"").unwrap();
        fs::write(&text, b"").unwrap();

        assert!(is_supported_video_file(&clip));
        assert!(!is_supported_video_file(&text));
        assert!(!is_supported_video_file(&dir.path().join("missing.mp4")));
        assert!(!is_supported_video_file(dir.path()));
    }

    #[test]
    fn output_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_valid_output_path(&dir.path().join("out.mp4")));
        assert!(is_valid_output_path(Path::new("out.mp4")));
        assert!(!is_valid_output_path(&dir.path().join("missing/out.mp4")));
        assert!(!is_valid_output_path(Path::new("/")));
        assert!(!is_valid_output_path(Path::new("")));
    }

    #[test]
    fn safe_names() {
        assert_eq!(safe_file_name("my:video?.mp4"), "my_video_.mp4");
        assert_eq!(safe_file_name("a/b\\c"), "a_b_c");
        assert_eq!(safe_file_name("plain name"), "plain name");
        assert_eq!(safe_file_name(""), "output");
        assert_eq!(safe_file_name("***"), "output");
    }

    #[test]
    fn unique_paths() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_output_path(dir.path(), "shot", "png");
        assert_eq!(first, dir.path().join("shot.png"));

        fs::write(&first, b"").unwrap();
        let second = unique_output_path(dir.path(), "shot", ".png");
        assert_eq!(second, dir.path().join("shot_1.png"));

        fs::write(&second, b"").unwrap();
        assert_eq!(
            unique_output_path(dir.path(), "shot", "png"),
            dir.path().join("shot_2.png")
        );
    }

    #[test]
    fn unique_path_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(
            unique_output_path(&missing, "shot", "png"),
            missing.join("shot.png")
        );
    }
}
