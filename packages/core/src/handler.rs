//! Capability traits implemented by protocol handlers.
//!
//! A handler is the backing-store-specific implementation bound to a
//! protocol. The capability set is split into [`Readable`], [`Writable`],
//! and [`Listable`]; [`Handler`] is the combined contract the registry
//! hands out. Paths passed to handlers never include the protocol prefix.

use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

use crate::{Error, Url};

/// The kind of an addressed item, fixed at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::File => write!(f, "file"),
            ResourceKind::Directory => write!(f, "directory"),
        }
    }
}

/// Live metadata for a backing item, queried on every access, never cached.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub kind: ResourceKind,
    pub size: u64,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
}

/// Read access to a backing store.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Readable>`.
pub trait Readable: Send + Sync {
    /// Probe a path.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No item exists at the path.
    /// * `Ok(Some(metadata))` - The item's live metadata.
    /// * `Err(Error)` - The probe itself failed.
    fn metadata(&self, path: &str) -> Result<Option<Metadata>, Error>;

    /// Open a fresh reader over the item's content.
    ///
    /// Each call acquires its own backing handle; the handle is released
    /// when the returned reader is dropped. Fails with `NotFound` when the
    /// item is absent.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, Error>;
}

/// Write access to a backing store.
pub trait Writable: Send + Sync {
    /// Replace the full content of the file at `path`, creating it if
    /// absent.
    fn replace(&self, path: &str, data: &[u8]) -> Result<(), Error>;

    /// Create an empty directory at `path`, including missing parents.
    /// Existing directories are left untouched.
    fn create_dir(&self, path: &str) -> Result<(), Error>;

    /// Remove the item at `path`, whatever its kind. Fails with `NotFound`
    /// when absent.
    fn remove(&self, path: &str) -> Result<(), Error>;
}

/// Namespace access to a backing store.
pub trait Listable: Send + Sync {
    /// Child names currently present under `path`, in the store's own
    /// enumeration order. No sorting guarantee beyond what the store
    /// provides.
    fn list(&self, path: &str) -> Result<Vec<String>, Error>;

    /// Join a child name onto a directory path, in the store's own path
    /// syntax.
    fn join(&self, base: &str, name: &str) -> String;
}

/// The full handler contract: readable, writable, and listable.
pub trait Handler: Readable + Writable + Listable {}
impl<T: Readable + Writable + Listable> Handler for T {}

/// Factory producing a handler for a resolved URL.
///
/// Factories are registered per protocol; the URL is passed so a factory
/// can key shared state off a host component embedded in the path.
pub type HandlerFactory = Arc<dyn Fn(&Url) -> Result<Arc<dyn Handler>, Error> + Send + Sync>;

// Forwarding implementations so handler stacks can be composed.

impl<T: Readable + ?Sized> Readable for Box<T> {
    fn metadata(&self, path: &str) -> Result<Option<Metadata>, Error> {
        self.as_ref().metadata(path)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, Error> {
        self.as_ref().open(path)
    }
}

impl<T: Writable + ?Sized> Writable for Box<T> {
    fn replace(&self, path: &str, data: &[u8]) -> Result<(), Error> {
        self.as_ref().replace(path, data)
    }

    fn create_dir(&self, path: &str) -> Result<(), Error> {
        self.as_ref().create_dir(path)
    }

    fn remove(&self, path: &str) -> Result<(), Error> {
        self.as_ref().remove(path)
    }
}

impl<T: Listable + ?Sized> Listable for Box<T> {
    fn list(&self, path: &str) -> Result<Vec<String>, Error> {
        self.as_ref().list(path)
    }

    fn join(&self, base: &str, name: &str) -> String {
        self.as_ref().join(base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Flat single-level store for exercising the traits.
    struct FlatStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl FlatStore {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
            }
        }
    }

    impl Readable for FlatStore {
        fn metadata(&self, path: &str) -> Result<Option<Metadata>, Error> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.get(path).map(|data| Metadata {
                kind: ResourceKind::File,
                size: data.len() as u64,
                atime: SystemTime::now(),
                mtime: SystemTime::now(),
                ctime: SystemTime::now(),
            }))
        }

        fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, Error> {
            let entries = self.entries.lock().unwrap();
            match entries.get(path) {
                Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
                None => Err(Error::NotFound {
                    url: format!("flat://{}", path),
                }),
            }
        }
    }

    impl Writable for FlatStore {
        fn replace(&self, path: &str, data: &[u8]) -> Result<(), Error> {
            self.entries
                .lock()
                .unwrap()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn create_dir(&self, _path: &str) -> Result<(), Error> {
            Ok(())
        }

        fn remove(&self, path: &str) -> Result<(), Error> {
            match self.entries.lock().unwrap().remove(path) {
                Some(_) => Ok(()),
                None => Err(Error::NotFound {
                    url: format!("flat://{}", path),
                }),
            }
        }
    }

    impl Listable for FlatStore {
        fn list(&self, _path: &str) -> Result<Vec<String>, Error> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.keys().cloned().collect())
        }

        fn join(&self, base: &str, name: &str) -> String {
            format!("{}/{}", base.trim_end_matches('/'), name)
        }
    }

    #[test]
    fn object_safety_works() {
        let store = FlatStore::new();
        let handler: &dyn Handler = &store;

        handler.replace("a", b"hello").unwrap();
        let metadata = handler.metadata("a").unwrap().unwrap();
        assert_eq!(metadata.kind, ResourceKind::File);
        assert_eq!(metadata.size, 5);

        let mut content = String::new();
        handler.open("a").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn boxed_handler_forwards() {
        let boxed: Box<dyn Handler> = Box::new(FlatStore::new());
        boxed.replace("x", b"1").unwrap();
        assert!(boxed.metadata("x").unwrap().is_some());
        boxed.remove("x").unwrap();
        assert!(boxed.metadata("x").unwrap().is_none());
    }

    #[test]
    fn absent_probe_is_none_not_error() {
        let store = FlatStore::new();
        assert!(store.metadata("missing").unwrap().is_none());
        assert!(store.open("missing").is_err());
    }
}
