//! Simple Repository (PEP 503) project pages built from a directory listing.
//!
//! # Responsibilities
//! - List a directory (one level, no recursion)
//! - Keep entries that classify as distributions of the requested project
//! - Render one anchor per artifact inside a minimal HTML document
//!
//! # Design Decisions
//! - Output order is fixed for a given directory state: source
//!   distributions first, then wheels, each sorted by file name
//! - An empty listing is still a valid page (200, zero anchors)

use std::fmt::Write;
use std::io;
use std::path::Path;

use crate::dist::{self, DistKind, ProjectName};
use crate::http::response::IndexResponse;

/// A distribution file found in a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub kind: DistKind,
}

/// Collect the distribution files directly under `dir`.
///
/// With `project` set, files belonging to other projects are skipped.
pub async fn list_artifacts(
    dir: &Path,
    project: Option<&ProjectName>,
) -> io::Result<Vec<Artifact>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut artifacts = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Ok(filename) = entry.file_name().into_string() else {
            continue;
        };
        let Some(dist) = dist::classify(&filename) else {
            continue;
        };
        if project.is_some_and(|project| *project != dist.project) {
            continue;
        }
        // follows symlinks; dangling links and directories are skipped
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => {}
            _ => continue,
        }
        artifacts.push(Artifact {
            filename,
            kind: dist.kind,
        });
    }

    artifacts.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.filename.cmp(&b.filename)));
    Ok(artifacts)
}

/// Render the HTML document for a project page.
pub fn render_page(project: Option<&ProjectName>, artifacts: &[Artifact]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"pypi:repository-version\" content=\"1.0\">\n",
    );
    if let Some(project) = project {
        // normalized names contain no markup characters
        let _ = writeln!(html, "<title>Links for {project}</title>");
    }
    html.push_str("</head>\n<body>\n");
    for artifact in artifacts {
        // classified file names are restricted to [A-Za-z0-9._+!-]
        let _ = writeln!(html, "<a href=\"{0}\">{0}</a>", artifact.filename);
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// List `dir` and build the project page response.
pub async fn render_index(
    dir: &Path,
    project: Option<&ProjectName>,
) -> io::Result<IndexResponse> {
    let artifacts = list_artifacts(dir, project).await?;
    tracing::debug!(
        dir = %dir.display(),
        artifacts = artifacts.len(),
        "Rendered project index"
    );
    Ok(IndexResponse::html(render_page(project, &artifacts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tempfile::TempDir;

    fn anchors(html: &str) -> Vec<String> {
        html.lines()
            .filter(|line| line.starts_with("<a href="))
            .map(str::to_string)
            .collect()
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[tokio::test]
    async fn test_one_anchor_per_artifact() {
        let tmp = TempDir::new().unwrap();
        touch(
            tmp.path(),
            &["pkg-1.0-py3-none-any.whl", "pkg-1.0.tar.gz", "pkg-0.9.tar.gz"],
        );

        let response = render_index(tmp.path(), None).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.media_type, "text/html");

        let html = String::from_utf8(response.content().unwrap().to_vec()).unwrap();
        assert_eq!(
            anchors(&html),
            vec![
                "<a href=\"pkg-0.9.tar.gz\">pkg-0.9.tar.gz</a>",
                "<a href=\"pkg-1.0.tar.gz\">pkg-1.0.tar.gz</a>",
                "<a href=\"pkg-1.0-py3-none-any.whl\">pkg-1.0-py3-none-any.whl</a>",
            ]
        );
    }

    #[tokio::test]
    async fn test_skips_non_distributions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), &["README.md", "index.html", "pkg-1.0.tar.gz"]);
        std::fs::create_dir(tmp.path().join("pkg-2.0.tar.gz")).unwrap();

        let artifacts = list_artifacts(tmp.path(), None).await.unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["pkg-1.0.tar.gz"]);
    }

    #[tokio::test]
    async fn test_project_filter() {
        let tmp = TempDir::new().unwrap();
        touch(
            tmp.path(),
            &["My_Pkg-1.0.tar.gz", "other-1.0.tar.gz", "my.pkg-1.1-py3-none-any.whl"],
        );

        let project = ProjectName::parse("my-pkg").unwrap();
        let artifacts = list_artifacts(tmp.path(), Some(&project)).await.unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["My_Pkg-1.0.tar.gz", "my.pkg-1.1-py3-none-any.whl"]);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let response = render_index(tmp.path(), None).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);

        let html = String::from_utf8(response.content().unwrap().to_vec()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(anchors(&html).is_empty());
    }

    #[tokio::test]
    async fn test_rendering_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), &["b-1.0.zip", "a-1.0.tar.gz", "a-1.0-py3-none-any.whl"]);

        let first = render_index(tmp.path(), None).await.unwrap();
        let second = render_index(tmp.path(), None).await.unwrap();
        assert_eq!(first.content(), second.content());
    }

    #[test]
    fn test_title_uses_project() {
        let project = ProjectName::parse("Foo_Bar").unwrap();
        let html = render_page(Some(&project), &[]);
        assert!(html.contains("<title>Links for foo-bar</title>"));
    }
}
