//! Asset directory conventions.
//!
//! Every asset is optional. The library only answers "where would it be" and "is it there";
//! substitution of missing media happens in [`crate::media::resolve`].

use std::path::{Path, PathBuf};

use crate::foundation::error::{SpotDiffError, SpotDiffResult};

pub const OPENING: &str = "opening.mp4";
pub const ENDING: &str = "ending.mp4";
pub const COUNT10: &str = "count10.mp4";
pub const ALARM: &str = "alarm.mp4";
pub const MAIN_BGM: &str = "main_bgm.mp3";
pub const DESCRIPTION: &str = "description.mp3";
pub const CUE_60S: &str = "60s.mp3";
pub const CUE_30S: &str = "30s.mp3";
pub const ANSWER: &str = "answer.mp3";
pub const CHEER: &str = "cheer.mp3";
pub const QUESTION_TITLE: &str = "question_title.png";

/// Background pool file name prefix (`S*.mp4`).
pub const BACKGROUND_PREFIX: &str = "S";
pub const BACKGROUND_EXT: &str = "mp4";

/// `question{n}.mp4`, 1-based.
pub fn question_bumper(n: usize) -> String {
    format!("question{n}.mp4")
}

/// `answer{n}.mp3`, 1-based.
pub fn answer_callout(n: usize) -> String {
    format!("answer{n}.mp3")
}

/// Normalize and validate asset-relative paths.
///
/// The result uses `/` separators with `.` segments removed. Absolute paths and parent
/// traversals (`..`) are rejected.
pub fn normalize_rel_path(source: &str) -> SpotDiffResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SpotDiffError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(SpotDiffError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SpotDiffError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SpotDiffError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// A directory of optional media fragments.
#[derive(Clone, Debug)]
pub struct AssetLibrary {
    root: PathBuf,
}

impl AssetLibrary {
    /// Create a library rooted at `root`. The directory need not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of `rel` inside the library.
    pub fn path(&self, rel: &str) -> SpotDiffResult<PathBuf> {
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(norm))
    }

    /// `true` when `rel` names an existing regular file.
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Background pool file names, sorted. A missing directory yields an empty pool.
    pub fn background_candidates(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| is_background_name(name))
            .collect();
        names.sort();
        names
    }
}

fn is_background_name(name: &str) -> bool {
    let Some(stem) = name.strip_prefix(BACKGROUND_PREFIX) else {
        return false;
    };
    match stem.rsplit_once('.') {
        Some((_, ext)) => ext == BACKGROUND_EXT,
        None => false,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/library.rs"]
mod tests;
