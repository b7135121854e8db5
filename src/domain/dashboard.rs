// Dashboard domain model - the minimal identity needed to sync a dashboard to disk
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const DASHBOARD_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub title: String,
    pub uid: String,
    /// Empty for dashboards living in the General folder.
    pub folder_title: String,
    /// Path relative to the sync root.
    pub filename: PathBuf,
}

#[derive(Debug, Error)]
pub enum DashboardParseError {
    #[error("invalid dashboard JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dashboard has no uid")]
    MissingUid,
}

/// A remote folder title that would place files outside the sync root
#[derive(Debug, Error)]
#[error("folder title {title:?} is not a relative path inside the sync root")]
pub struct UnsafeFolderTitle {
    pub title: String,
}

/// Identity fields read from a dashboard file body
#[derive(Debug, Deserialize)]
struct DashboardIdentity {
    #[serde(default)]
    title: String,
    #[serde(default)]
    uid: String,
}

impl Dashboard {
    pub fn new(title: String, uid: String, folder_title: String, filename: PathBuf) -> Self {
        Self {
            title,
            uid,
            folder_title,
            filename,
        }
    }

    /// Build the record for a dashboard reported by the remote search API.
    /// The filename is derived from the folder title and the URL slug.
    pub fn remote(
        title: String,
        uid: String,
        folder_title: String,
        url: &str,
    ) -> Result<Self, UnsafeFolderTitle> {
        let slug = dashboard_slug(url, &title, &uid);
        let filename = dashboard_filename(&folder_title, &slug)?;
        Ok(Self::new(title, uid, folder_title, filename))
    }

    /// Build the record for a file found under the sync root.
    ///
    /// `relative_path` is the file's path relative to the root; its parent
    /// directory becomes the folder title. Title and UID come from the body.
    pub fn local(relative_path: PathBuf, contents: &[u8]) -> Result<Self, DashboardParseError> {
        let identity: DashboardIdentity = serde_json::from_slice(contents)?;
        if identity.uid.is_empty() {
            return Err(DashboardParseError::MissingUid);
        }

        let folder_title = relative_path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(
            identity.title,
            identity.uid,
            folder_title,
            relative_path,
        ))
    }
}

/// `<folder_title>/<slug>.json`, or just `<slug>.json` in the General folder.
///
/// The result only ever contains plain path segments: absolute titles,
/// drive prefixes and `.`/`..` are rejected.
pub fn dashboard_filename(folder_title: &str, slug: &str) -> Result<PathBuf, UnsafeFolderTitle> {
    let file = format!("{}.{}", slug, DASHBOARD_EXTENSION);
    let filename = if folder_title.is_empty() {
        PathBuf::from(file)
    } else {
        Path::new(folder_title).join(file)
    };

    if filename.components().all(|c| matches!(c, Component::Normal(_))) {
        Ok(filename)
    } else {
        Err(UnsafeFolderTitle {
            title: folder_title.to_string(),
        })
    }
}

/// Pick the slug for a remote dashboard: the last segment of its URL
/// (`/d/<uid>/<slug>`), falling back to a slugified title, then the UID.
pub fn dashboard_slug(url: &str, title: &str, uid: &str) -> String {
    if let Some(segment) = url.trim_end_matches('/').rsplit('/').next() {
        if !segment.is_empty() {
            return segment.to_string();
        }
    }

    let slug = slugify(title);
    if slug.is_empty() { uid.to_string() } else { slug }
}

/// Lowercase ASCII alphanumerics, everything else collapsed into single dashes
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
