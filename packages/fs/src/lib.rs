//! Local filesystem handler, bound to the `file` protocol.
//!
//! Paths are used verbatim: `file:///var/data/report.txt` addresses
//! `/var/data/report.txt`. All operations go straight to `std::fs` with
//! one handle per operation; OS not-found errors map to the taxonomy's
//! `NotFound`, everything else to `Io`.
//!
//! # Example
//!
//! ```rust
//! use anywhere_core::Registry;
//! use anywhere_fs::FsHandler;
//!
//! let registry = Registry::new();
//! FsHandler::register(&registry);
//! assert!(registry.resolve("file:///tmp").is_ok());
//! ```

use std::fs;
use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

use anywhere_core::{
    Error, Handler, HandlerFactory, Listable, Metadata, Readable, Registry, ResourceKind, Url,
    Writable,
};

pub const PROTOCOL: &str = "file";

/// Stateless handler over the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsHandler;

impl FsHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn factory() -> HandlerFactory {
        Arc::new(|_url: &Url| Ok(Arc::new(FsHandler) as Arc<dyn Handler>))
    }

    /// Bind this handler to the `file` protocol in `registry`.
    pub fn register(registry: &Registry) {
        registry.register(PROTOCOL, Self::factory());
    }

    fn url(path: &str) -> String {
        format!("{}://{}", PROTOCOL, path)
    }
}

impl Readable for FsHandler {
    fn metadata(&self, path: &str) -> Result<Option<Metadata>, Error> {
        let md = match fs::metadata(path) {
            Ok(md) => md,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::from_io(Self::url(path), e)),
        };

        let kind = if md.is_dir() {
            ResourceKind::Directory
        } else {
            ResourceKind::File
        };
        // created() is unsupported on some filesystems; fall back to the
        // modification time rather than failing the probe
        let mtime = md.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(Some(Metadata {
            kind,
            size: md.len(),
            atime: md.accessed().unwrap_or(mtime),
            mtime,
            ctime: md.created().unwrap_or(mtime),
        }))
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, Error> {
        log::debug!("opening {}", path);
        let file = fs::File::open(path).map_err(|e| Error::from_io(Self::url(path), e))?;
        Ok(Box::new(file))
    }
}

impl Writable for FsHandler {
    fn replace(&self, path: &str, data: &[u8]) -> Result<(), Error> {
        log::debug!("writing {} byte(s) to {}", data.len(), path);
        fs::write(path, data).map_err(|e| Error::from_io(Self::url(path), e))
    }

    fn create_dir(&self, path: &str) -> Result<(), Error> {
        log::debug!("creating directory {}", path);
        fs::create_dir_all(path).map_err(|e| Error::from_io(Self::url(path), e))
    }

    fn remove(&self, path: &str) -> Result<(), Error> {
        let md = fs::metadata(path).map_err(|e| Error::from_io(Self::url(path), e))?;
        log::debug!("removing {}", path);
        if md.is_dir() {
            fs::remove_dir_all(path).map_err(|e| Error::from_io(Self::url(path), e))
        } else {
            fs::remove_file(path).map_err(|e| Error::from_io(Self::url(path), e))
        }
    }
}

impl Listable for FsHandler {
    fn list(&self, path: &str) -> Result<Vec<String>, Error> {
        let entries = fs::read_dir(path).map_err(|e| Error::from_io(Self::url(path), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::from_io(Self::url(path), e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn join(&self, base: &str, name: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), name)
    }
}
