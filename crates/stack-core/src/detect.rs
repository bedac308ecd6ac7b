//! Project type detection from marker files at a repository root.

use crate::types::ProjectKind;
use std::path::Path;

/// Marker files in probe order. The first marker present wins, so a repo
/// with both a `justfile` and a `package.json` is a task-runner project.
const MARKERS: &[(&str, ProjectKind)] = &[
    ("justfile", ProjectKind::Just),
    ("package.json", ProjectKind::Pnpm),
    ("pyproject.toml", ProjectKind::Uv),
];

/// Classify the repository at `repo`. Never fails: no marker means `Unknown`.
pub fn detect_kind(repo: &Path) -> ProjectKind {
    for (marker, kind) in MARKERS {
        if repo.join(marker).exists() {
            tracing::debug!(repo = %repo.display(), marker, "project marker found");
            return *kind;
        }
    }
    ProjectKind::Unknown
}
