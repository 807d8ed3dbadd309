//! Injected I/O collaborators: file system and remote fetcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use url::Url;

/// Reads local files for `file:` URLs.
pub trait FileSystem {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Fetches `http(s):` URLs. Must be idempotent and free of side effects
/// other than network I/O.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why a document could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read `{url}`: {source}")]
    Read {
        url: Url,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot fetch `{url}`: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: FetchError,
    },

    #[error("unsupported URL scheme `{scheme}` in `{url}`")]
    UnsupportedScheme { scheme: String, url: Url },

    #[error("`{0}` is not valid UTF-8")]
    NotUtf8(Url),

    #[error("invalid document location `{0}`")]
    InvalidLocation(String),
}

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Rejects every remote reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

impl Fetcher for NoFetcher {
    fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::new("remote references are disabled"))
    }
}

/// In-memory files and remote documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: HashMap<PathBuf, Vec<u8>>,
    remote: HashMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn remote(mut self, url: &str, content: impl Into<Vec<u8>>) -> Self {
        self.remote.insert(url.to_string(), content.into());
        self
    }
}

impl FileSystem for MemoryFs {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file `{}`", path.display()),
            )
        })
    }
}

impl Fetcher for MemoryFs {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.remote
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::new("404 Not Found"))
    }
}

/// Interpret a command-line location as an absolute URL.
///
/// `file:` and `http(s):` URLs are taken verbatim; anything else is a file
/// path, relative paths being resolved against `cwd`.
pub fn location_to_url(location: &str, cwd: &Path) -> Result<Url, LoadError> {
    if let Ok(url) = Url::parse(location)
        && matches!(url.scheme(), "file" | "http" | "https")
    {
        return Ok(url);
    }

    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    Url::from_file_path(&absolute).map_err(|()| LoadError::InvalidLocation(location.to_string()))
}
