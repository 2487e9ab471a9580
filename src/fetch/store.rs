// src/fetch/store.rs
// =============================================================================
// This module writes crawled pages to disk.
//
// Layout under the output directory:
//   https://example.com/                -> example.com/index.html
//   https://example.com/docs/intro      -> example.com/docs/intro.html
//   https://example.com/docs/guide/     -> example.com/docs/guide/index.html
//   https://example.com/css/site.css    -> example.com/css/site.css
//   https://example.com/search?q=rust   -> example.com/search_q_rust.html
//   http://localhost:8080/a             -> localhost_8080/a.html
//
// A page name can also be needed as a directory: "/a.b" and "/a.b/c".
// Whichever comes second, the page file ends up inside the directory as
// index.<ext> (example.com/a.b/index.b), so both pages are kept.
//
// Every path component is sanitized so a URL can never escape the output
// directory or produce a name the filesystem rejects.
// =============================================================================

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{CrawlError, CrawlResult};

#[async_trait]
pub trait PageStore: Send + Sync {
    /// Persists `body` for `url` and returns where it went
    async fn save(&self, url: &str, body: &[u8]) -> CrawlResult<PathBuf>;
}

/// Mirrors pages into a directory tree rooted at `root`
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl PageStore for FsPageStore {
    async fn save(&self, url: &str, body: &[u8]) -> CrawlResult<PathBuf> {
        let persist_error = |source: io::Error| CrawlError::Persist {
            url: url.to_string(),
            source,
        };

        let relative = page_path(url).ok_or_else(|| {
            persist_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "URL has no host to store it under",
            ))
        })?;
        if let Some(parent) = relative.parent() {
            create_page_dirs(&self.root, parent)
                .await
                .map_err(persist_error)?;
        }

        let mut target = self.root.join(relative);
        if tokio::fs::metadata(&target)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
        {
            target = target.join(index_name(&target));
        }
        tokio::fs::write(&target, body).await.map_err(persist_error)?;

        Ok(target)
    }
}

// create_dir_all, except that a page file sitting where a directory is
// needed gets moved into that directory first
async fn create_page_dirs(root: &Path, relative: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(root).await?;

    let mut dir = root.to_path_buf();
    for component in relative.components() {
        dir.push(component);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => move_into_own_dir(&dir).await?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match tokio::fs::create_dir(&dir).await {
                    // Another task got there first
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                    other => other?,
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// example.com/a.b (a file) -> example.com/a.b/index.b
async fn move_into_own_dir(file: &Path) -> io::Result<()> {
    let mut parked = file.as_os_str().to_owned();
    parked.push(".moving");
    let parked = PathBuf::from(parked);

    tokio::fs::rename(file, &parked).await?;
    tokio::fs::create_dir(file).await?;
    tokio::fs::rename(&parked, file.join(index_name(file))).await
}

fn index_name(page: &Path) -> String {
    match page.extension() {
        Some(ext) => format!("index.{}", ext.to_string_lossy()),
        None => "index.html".to_string(),
    }
}

/// Discards everything; used with --no-save
pub struct NullStore;

#[async_trait]
impl PageStore for NullStore {
    async fn save(&self, _url: &str, _body: &[u8]) -> CrawlResult<PathBuf> {
        Ok(PathBuf::new())
    }
}

// Maps a URL to a relative file path: host, then one directory per path
// segment, then a file named after the last segment.
fn page_path(url: &str) -> Option<PathBuf> {
    let url = Url::parse(url).ok()?;
    let host = url.host_str()?;

    let mut path = PathBuf::from(match url.port() {
        Some(port) => sanitize(&format!("{}_{}", host, port)),
        None => sanitize(host),
    });

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    // A trailing slash leaves an empty last segment
    let (dirs, last) = match segments.split_last() {
        Some((last, dirs)) if !last.is_empty() => (dirs, Some(*last)),
        _ => (segments.as_slice(), None),
    };

    for dir in dirs.iter().filter(|dir| !dir.is_empty()) {
        path.push(sanitize(dir));
    }

    let mut file_name = match last {
        Some(last) => sanitize(last),
        None => "index".to_string(),
    };
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        file_name = match Path::new(&file_name).extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().into_owned();
                let stem = &file_name[..file_name.len() - ext.len() - 1];
                format!("{}_{}.{}", stem, sanitize(query), ext)
            }
            None => format!("{}_{}", file_name, sanitize(query)),
        };
    }
    if Path::new(&file_name).extension().is_none() {
        file_name.push_str(".html");
    }

    path.push(file_name);
    Some(path)
}

// Keeps ASCII letters, digits, '-', '_' and '.'; everything else becomes '_'.
// Names made only of dots ("." / "..") are replaced outright.
fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}
