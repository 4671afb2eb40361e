//! Routes backed by a local directory tree.
//!
//! # Responsibilities
//! - Resolve the `to` template to a path under the configured root
//! - Serve a static page file, or generate a page from a directory listing
//! - Serve distribution files from the resolved directory
//!
//! # Design Decisions
//! - Substituted values are untrusted: the path is normalized lexically and
//!   re-checked after canonicalization, so neither `..` nor symlinks can
//!   leave the root
//! - Every failure becomes a 404; nothing is raised to the transport

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::dist::{self, ProjectName};
use crate::http::response::{IndexResponse, TEXT_HTML};
use crate::index;
use crate::routing::template::{Params, Template};

/// Path parameter used to filter shared directories by project.
pub const PROJECT_PARAM: &str = "project";

const MEDIA_TAR: &str = "application/x-tar";
const MEDIA_ZIP: &str = "application/zip";
const MEDIA_OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct PathRoute {
    root: PathBuf,
    to: Template,
}

impl PathRoute {
    /// Create a route serving `to` below `root`.
    ///
    /// The root is canonicalized when it exists.
    pub fn new(root: impl Into<PathBuf>, to: Template) -> Self {
        let root = root.into();
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        Self { root, to }
    }

    pub fn to(&self) -> &Template {
        &self.to
    }

    pub async fn resolve_page(&self, params: &Params) -> IndexResponse {
        let Some(path) = self.resolve(params).await else {
            return IndexResponse::not_found();
        };
        let Ok(meta) = tokio::fs::metadata(&path).await else {
            return IndexResponse::not_found();
        };

        if meta.is_file() {
            return match tokio::fs::read(&path).await {
                Ok(content) => IndexResponse::buffered(content, TEXT_HTML),
                Err(e) => not_found_after(&path, e),
            };
        }
        if meta.is_dir() {
            let project = match params.get(PROJECT_PARAM) {
                Some(raw) => match ProjectName::parse(raw) {
                    Some(name) => Some(name),
                    None => {
                        tracing::debug!(project = %raw, "Invalid project name matches nothing");
                        return IndexResponse::html(index::render_page(None, &[]));
                    }
                },
                None => None,
            };
            return match index::render_index(&path, project.as_ref()).await {
                Ok(response) => response,
                Err(e) => not_found_after(&path, e),
            };
        }
        IndexResponse::not_found()
    }

    pub async fn resolve_file(&self, params: &Params, filename: &str) -> IndexResponse {
        if !is_plain_filename(filename) || !dist::is_distribution(filename) {
            return IndexResponse::not_found();
        }
        let Some(dir) = self.resolve(params).await else {
            return IndexResponse::not_found();
        };
        if !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            return IndexResponse::not_found();
        }

        let path = dir.join(filename);
        match tokio::fs::canonicalize(&path).await {
            Ok(real) if real.starts_with(&self.root) => {}
            _ => return IndexResponse::not_found(),
        }
        if !tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            return IndexResponse::not_found();
        }

        match tokio::fs::read(&path).await {
            Ok(content) => IndexResponse::buffered(content, media_type_for(filename)),
            Err(e) => not_found_after(&path, e),
        }
    }

    /// Substitute `params` and return the canonical target, if it exists
    /// and stays under the root.
    async fn resolve(&self, params: &Params) -> Option<PathBuf> {
        let relative = self.to.render(params).ok()?;
        let Some(joined) = join_within(&self.root, &relative) else {
            tracing::warn!(to = %self.to, path = %relative, "Rejected path outside route root");
            return None;
        };
        let real = tokio::fs::canonicalize(&joined).await.ok()?;
        if !real.starts_with(&self.root) {
            tracing::warn!(path = %real.display(), "Rejected symlink outside route root");
            return None;
        }
        Some(real)
    }
}

/// Join `relative` onto `root` without leaving it.
///
/// Returns `None` for absolute paths or `..` climbing above the root.
pub fn join_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut depth = 0usize;
    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth.checked_sub(1)?;
                path.pop();
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(path)
}

fn is_plain_filename(filename: &str) -> bool {
    matches!(
        Path::new(filename).components().collect::<Vec<_>>().as_slice(),
        [Component::Normal(_)]
    ) && !filename.contains(['/', '\\'])
}

/// Media type for a served distribution file.
pub fn media_type_for(filename: &str) -> &'static str {
    if filename.ends_with(".tar.gz") {
        MEDIA_TAR
    } else if filename.ends_with(".whl") || filename.ends_with(".zip") {
        MEDIA_ZIP
    } else {
        MEDIA_OCTET_STREAM
    }
}

fn not_found_after(path: &Path, error: io::Error) -> IndexResponse {
    tracing::debug!(path = %path.display(), error = %error, "Filesystem error mapped to 404");
    IndexResponse::not_found()
}
