//! The Resource base contract.
//!
//! A Resource is one addressed item: identity is the (protocol, path) pair
//! and nothing else. It holds a non-owning reference to the handler that
//! performs actual I/O and never caches content state beyond the file
//! write buffer. Two Resources built from the same URL are independent
//! proxies to the same external item.

use std::fmt;
use std::io::Read;
use std::time::SystemTime;

use bytes::Bytes;

use crate::handler::{Handler, Metadata, ResourceKind};
use crate::{DirectoryResource, Error, FileResource, Registry, Url};

use std::sync::Arc;

/// A URL bound to its resolved handler, plus the registry that produced
/// it (needed to resolve copy destinations under other protocols).
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) registry: Registry,
    pub(crate) url: Url,
    pub(crate) handler: Arc<dyn Handler>,
}

impl Binding {
    pub(crate) fn new(registry: Registry, url: Url, handler: Arc<dyn Handler>) -> Self {
        Self {
            registry,
            url,
            handler,
        }
    }

    pub(crate) fn metadata(&self) -> Result<Option<Metadata>, Error> {
        self.handler.metadata(self.url.path())
    }

    pub(crate) fn require_metadata(&self) -> Result<Metadata, Error> {
        self.metadata()?.ok_or_else(|| Error::NotFound {
            url: self.url.to_string(),
        })
    }

    pub(crate) fn exists(&self) -> Result<bool, Error> {
        Ok(self.metadata()?.is_some())
    }

    pub(crate) fn open(&self) -> Result<Box<dyn Read + Send>, Error> {
        self.handler.open(self.url.path())
    }

    /// Committed content, optionally bounded to the first `limit` bytes.
    pub(crate) fn read_bytes(&self, limit: Option<usize>) -> Result<Bytes, Error> {
        let reader = self.open()?;
        let mut data = Vec::new();
        let result = match limit {
            Some(limit) => reader.take(limit as u64).read_to_end(&mut data),
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut data)
            }
        };
        result.map_err(|e| Error::from_io(self.url.to_string(), e))?;
        Ok(Bytes::from(data))
    }

    pub(crate) fn read_string(&self) -> Result<String, Error> {
        let data = self.read_bytes(None)?;
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::io_message(self.url.to_string(), e.to_string()))
    }

    /// A child binding under the same handler, joined in the store's own
    /// path syntax.
    pub(crate) fn child(&self, name: &str) -> Binding {
        let path = self.handler.join(self.url.path(), name);
        Binding {
            registry: self.registry.clone(),
            url: self.url.with_path(path),
            handler: self.handler.clone(),
        }
    }
}

/// An addressed item, file or directory.
///
/// The kind is fixed at resolution time and never changes for the lifetime
/// of the value, even if the backing item's kind is later altered
/// out-of-band.
#[derive(Clone)]
pub enum Resource {
    File(FileResource),
    Directory(DirectoryResource),
}

impl Resource {
    pub(crate) fn with_kind(binding: Binding, kind: ResourceKind) -> Resource {
        match kind {
            ResourceKind::File => Resource::File(FileResource::from_binding(binding)),
            ResourceKind::Directory => {
                Resource::Directory(DirectoryResource::from_binding(binding))
            }
        }
    }

    pub(crate) fn binding(&self) -> &Binding {
        match self {
            Resource::File(f) => &f.binding,
            Resource::Directory(d) => &d.binding,
        }
    }

    pub fn url(&self) -> &Url {
        &self.binding().url
    }

    /// The final path segment.
    pub fn name(&self) -> &str {
        self.binding().url.name()
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::File(_) => ResourceKind::File,
            Resource::Directory(_) => ResourceKind::Directory,
        }
    }

    pub fn as_file(&self) -> Option<&FileResource> {
        match self {
            Resource::File(f) => Some(f),
            Resource::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileResource> {
        match self {
            Resource::File(f) => Some(f),
            Resource::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryResource> {
        match self {
            Resource::File(_) => None,
            Resource::Directory(d) => Some(d),
        }
    }

    /// Whether the backing item currently exists. Checked live, never
    /// cached.
    pub fn exists(&self) -> Result<bool, Error> {
        self.binding().exists()
    }

    pub fn size(&self) -> Result<u64, Error> {
        Ok(self.binding().require_metadata()?.size)
    }

    pub fn atime(&self) -> Result<SystemTime, Error> {
        Ok(self.binding().require_metadata()?.atime)
    }

    pub fn mtime(&self) -> Result<SystemTime, Error> {
        Ok(self.binding().require_metadata()?.mtime)
    }

    pub fn ctime(&self) -> Result<SystemTime, Error> {
        Ok(self.binding().require_metadata()?.ctime)
    }

    /// Content as a string.
    ///
    /// For a file this is the committed content with any unflushed
    /// buffered lines overlaid; for a directory, the newline-joined child
    /// listing. An empty item reads as an empty string, not an error.
    pub fn read(&self) -> Result<String, Error> {
        match self {
            Resource::File(f) => f.read(),
            Resource::Directory(d) => d.read(),
        }
    }

    /// Materialize a copy at `destination` and return the Resource bound
    /// to it.
    ///
    /// The destination may live under a different protocol. With no
    /// destination the copy lands at `file://<temp dir>/<name>`, which
    /// requires the `file` protocol in this registry. Fails with
    /// `NotFound` when the source does not exist.
    pub fn get(&self, destination: Option<&str>) -> Result<Resource, Error> {
        let destination = match destination {
            Some(d) => d.to_string(),
            None => format!("file://{}", std::env::temp_dir().join(self.name()).display()),
        };
        let target = self
            .binding()
            .registry
            .resolve_as(&destination, self.kind())?;
        self.copy(&target)?;
        Ok(target)
    }

    /// Copy current content to a new URL; the inverse of [`get`](Self::get).
    pub fn put(&self, url: &str) -> Result<Resource, Error> {
        self.get(Some(url))
    }

    /// Create an empty item of this Resource's kind at its path.
    ///
    /// Fails with `AlreadyExists` when the item exists and overwrite was
    /// not requested.
    pub fn create(&self, overwrite: bool) -> Result<(), Error> {
        if !overwrite && self.exists()? {
            return Err(Error::AlreadyExists {
                url: self.url().to_string(),
            });
        }
        let binding = self.binding();
        match self.kind() {
            ResourceKind::File => binding.handler.replace(binding.url.path(), b""),
            ResourceKind::Directory => binding.handler.create_dir(binding.url.path()),
        }
    }

    /// Remove the backing item. Fails with `NotFound` when absent; use
    /// [`delete_quiet`](Self::delete_quiet) for the idempotent variant.
    pub fn delete(&self) -> Result<(), Error> {
        let binding = self.binding();
        binding.require_metadata()?;
        binding.handler.remove(binding.url.path())
    }

    /// Remove the backing item if present, reporting whether anything was
    /// removed.
    pub fn delete_quiet(&self) -> Result<bool, Error> {
        match self.delete() {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Commit pending buffered writes. A no-op when nothing is buffered
    /// and for directories.
    pub fn flush(&mut self) -> Result<(), Error> {
        match self {
            Resource::File(f) => f.flush(),
            Resource::Directory(_) => Ok(()),
        }
    }

    /// Stream current committed content into `target`, which may live
    /// under a different protocol. Kinds must match; file-into-directory
    /// insertion is [`DirectoryResource::add`].
    pub fn copy(&self, target: &Resource) -> Result<(), Error> {
        match (self, target) {
            (Resource::File(src), Resource::File(dst)) => src.copy_to(dst),
            (Resource::Directory(src), Resource::Directory(dst)) => src.copy_to(dst),
            _ => Err(Error::io_message(
                self.url().to_string(),
                format!("cannot copy {} into {}", self.kind(), target.kind()),
            )),
        }
    }

    /// True when the item has zero size (file) or zero children
    /// (directory).
    pub fn empty(&self) -> Result<bool, Error> {
        match self {
            Resource::File(f) => f.empty(),
            Resource::Directory(d) => d.empty(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Resource::File(_) => "FileResource",
            Resource::Directory(_) => "DirectoryResource",
        };
        write!(f, "<{} {}>", kind, self.url())
    }
}
