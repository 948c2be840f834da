//! Local file discovery: the user's home folders stand in for an uploaded
//! document library.

use crate::collab::{CollabError, FileEntry, FileSource};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Cap on announced files, matching what a numbered spoken list can carry.
const SCAN_CAP: usize = 20;

fn type_for_extension(ext: &str) -> Option<(&'static str, &'static str)> {
    match ext {
        "pdf" => Some(("PDF", "📄")),
        "docx" => Some(("Word Document", "📝")),
        "epub" => Some(("ePub", "📚")),
        "txt" => Some(("Text", "📃")),
        _ => None,
    }
}

/// `science_chapter` -> `Science Chapter`.
fn prettify(stem: &str) -> String {
    stem.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn squash(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Scans a set of root directories (by default the user's Downloads,
/// Documents, and Desktop) one level deep for readable documents.
pub struct LocalLibrary {
    roots: Vec<PathBuf>,
}

impl LocalLibrary {
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn from_home() -> Self {
        let roots = dirs::home_dir()
            .map(|home| {
                ["Downloads", "Documents", "Desktop"]
                    .iter()
                    .map(|folder| home.join(folder))
                    .collect()
            })
            .unwrap_or_default();
        Self { roots }
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(root)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();
                if path.is_file() && extension(path).and_then(type_for_extension).is_some() {
                    found.push(path.to_path_buf());
                }
            }
        }
        found
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

#[async_trait]
impl FileSource for LocalLibrary {
    async fn scan(&self) -> Result<Vec<FileEntry>, CollabError> {
        let entries: Vec<FileEntry> = self
            .candidates()
            .iter()
            .filter_map(|path| {
                let (kind, icon) = extension(path).and_then(type_for_extension)?;
                Some(FileEntry {
                    name: prettify(stem(path)),
                    kind: kind.to_string(),
                    icon: icon.to_string(),
                })
            })
            .take(SCAN_CAP)
            .collect();
        debug!(count = entries.len(), "local library scan");
        Ok(entries)
    }

    async fn load_text(&self, name: &str) -> Result<String, CollabError> {
        let wanted = squash(name);
        let mut matched: Option<PathBuf> = None;
        for path in self.candidates() {
            let candidate = squash(stem(&path));
            if candidate == wanted {
                matched = Some(path);
                break;
            }
            if candidate.contains(&wanted) && matched.is_none() {
                matched = Some(path);
            }
        }
        let path = matched.ok_or_else(|| CollabError::NotFound(name.to_string()))?;
        match extension(&path) {
            Some("txt") => tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| CollabError::Unavailable(e.to_string())),
            other => Err(CollabError::Unavailable(format!(
                "no text extraction for {} files",
                other.unwrap_or("unknown")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prettify_titles_words() {
        assert_eq!(prettify("science_chapter"), "Science Chapter");
        assert_eq!(prettify("maths notes"), "Maths Notes");
    }

    #[tokio::test]
    async fn scan_and_load_from_a_temp_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("science_chapter.txt"), "Leaves are green.").unwrap();
        std::fs::write(dir.path().join("notes.pdf"), b"%PDF-").unwrap();
        std::fs::write(dir.path().join("ignored.bin"), b"\x00").unwrap();

        let library = LocalLibrary::with_roots(vec![dir.path().to_path_buf()]);
        let files = library.scan().await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"Science Chapter"));
        assert!(names.contains(&"Notes"));
        assert_eq!(files.len(), 2);

        let text = library.load_text("Science Chapter").await.unwrap();
        assert_eq!(text, "Leaves are green.");

        // A PDF is discoverable but not locally extractable.
        assert!(library.load_text("Notes").await.is_err());
        assert!(matches!(
            library.load_text("Unknown Book").await,
            Err(CollabError::NotFound(_))
        ));
    }
}
