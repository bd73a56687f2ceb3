//! Filesystem-based asset source for loading piece SVGs.

use gpui::{AssetSource, SharedString};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-based asset source that looks next to the executable first,
/// then in the working directory
pub struct FileAssets {
    base_path: PathBuf,
    working_dir: Option<PathBuf>,
}

impl FileAssets {
    pub fn new() -> Self {
        let working_dir = std::env::current_dir().ok();
        let base_path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .or_else(|| working_dir.clone())
            .unwrap_or_default();
        Self {
            base_path,
            working_dir,
        }
    }

    /// Directory that holds `dir`, for checking which piece images exist
    pub fn root_for(&self, dir: &str) -> &Path {
        if self.base_path.join(dir).is_dir() {
            return &self.base_path;
        }
        self.working_dir.as_deref().unwrap_or(&self.base_path)
    }

    fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.base_path.join(path), PathBuf::from(path)];
        if let Some(dir) = &self.working_dir {
            paths.push(dir.join(path));
        }
        paths
    }
}

impl Default for FileAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSource for FileAssets {
    fn load(&self, path: &str) -> gpui::Result<Option<Cow<'static, [u8]>>> {
        for p in self.candidates(path) {
            if let Ok(data) = fs::read(&p) {
                return Ok(Some(Cow::Owned(data)));
            }
        }
        Ok(None)
    }

    fn list(&self, path: &str) -> gpui::Result<Vec<SharedString>> {
        let dir_path = self.root_for(path).join(path);
        let mut results = Vec::new();

        if let Ok(entries) = fs::read_dir(&dir_path) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    results.push(SharedString::from(name.to_string()));
                }
            }
        }
        Ok(results)
    }
}
