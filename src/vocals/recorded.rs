use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Most recently modified `.wav` anywhere below `root`, if any.
pub fn find_latest_recorded_vocal(root: &Path) -> Option<PathBuf> {
    if !root.exists() {
        return None;
    }

    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, e.into_path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}
