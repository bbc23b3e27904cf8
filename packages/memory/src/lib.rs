//! In-memory handler keeping resources in a process-local tree.
//!
//! Each [`MemoryStore`] owns one tree of named nodes; handlers produced
//! from the same store share it, so every resource resolved against the
//! store's protocol sees the same contents. [`MemoryStore::shared`]
//! returns a process-wide store for the common case of a single `mem`
//! namespace.
//!
//! Content never leaves the process and timestamps are synthetic: the
//! store reports the probe time, not a recorded modification time.
//!
//! # Example
//!
//! ```rust
//! use anywhere_core::{Registry, Resource};
//! use anywhere_memory::MemoryStore;
//!
//! let registry = Registry::new();
//! MemoryStore::new().register(&registry, "mem");
//!
//! let mut resource = registry.resolve("mem://notes/today").unwrap();
//! if let Resource::File(f) = &mut resource {
//!     f.write("remember the milk").unwrap();
//!     assert_eq!(f.read().unwrap(), "remember the milk");
//! }
//! ```

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use anywhere_core::{
    Error, Handler, HandlerFactory, Listable, Metadata, Readable, Registry, ResourceKind, Url,
    Writable,
};

enum Node {
    File(Vec<u8>),
    Directory(BTreeMap<String, Node>),
}

impl Node {
    fn kind(&self) -> ResourceKind {
        match self {
            Node::File(_) => ResourceKind::File,
            Node::Directory(_) => ResourceKind::Directory,
        }
    }
}

/// A self-contained in-memory tree of resources.
#[derive(Clone)]
pub struct MemoryStore {
    root: Arc<Mutex<Node>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    static ref SHARED: MemoryStore = MemoryStore::new();
}

impl MemoryStore {
    /// A fresh, empty store.
    pub fn new() -> Self {
        Self {
            root: Arc::new(Mutex::new(Node::Directory(BTreeMap::new()))),
        }
    }

    /// The process-wide store. Every caller gets a handle onto the same
    /// tree; contents persist for the lifetime of the process.
    pub fn shared() -> Self {
        SHARED.clone()
    }

    /// A factory producing handlers over this store's tree. The handler
    /// labels its errors with the protocol of the URL being resolved.
    pub fn factory(&self) -> HandlerFactory {
        let root = self.root.clone();
        Arc::new(move |url: &Url| {
            Ok(Arc::new(MemoryHandler {
                root: root.clone(),
                protocol: url.protocol().to_string(),
            }) as Arc<dyn Handler>)
        })
    }

    /// Bind this store to `protocol` in `registry`.
    pub fn register(&self, registry: &Registry, protocol: &str) {
        registry.register(protocol, self.factory());
    }
}

/// Handler over a [`MemoryStore`] tree.
pub struct MemoryHandler {
    root: Arc<Mutex<Node>>,
    protocol: String,
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl MemoryHandler {
    fn url(&self, path: &str) -> String {
        format!("{}://{}", self.protocol, path)
    }

    fn lock(&self) -> MutexGuard<'_, Node> {
        self.root.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Walk to the node at `path`, or `None` if any step is absent or
    /// crosses a file.
    fn find<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
        let mut node = root;
        for segment in segments(path) {
            node = match node {
                Node::Directory(children) => children.get(segment)?,
                Node::File(_) => return None,
            };
        }
        Some(node)
    }

    /// Walk to the directory containing the final segment of `path`,
    /// creating missing intermediate directories. Fails when an
    /// intermediate node is a file or when `path` names the root.
    fn parent_mut<'a>(
        &self,
        root: &'a mut Node,
        path: &str,
    ) -> Result<(&'a mut BTreeMap<String, Node>, String), Error> {
        let mut parts = segments(path);
        let leaf = match parts.pop() {
            Some(leaf) => leaf.to_string(),
            None => return Err(Error::io_message(self.url(path), "path names the root")),
        };

        let mut node = root;
        for segment in parts {
            let children = match node {
                Node::Directory(children) => children,
                Node::File(_) => {
                    return Err(Error::io_message(
                        self.url(path),
                        format!("'{}' is a file, not a directory", segment),
                    ))
                }
            };
            node = children
                .entry(segment.to_string())
                .or_insert_with(|| Node::Directory(BTreeMap::new()));
        }
        match node {
            Node::Directory(children) => Ok((children, leaf)),
            Node::File(_) => Err(Error::io_message(
                self.url(path),
                "parent is a file, not a directory",
            )),
        }
    }
}

impl Readable for MemoryHandler {
    fn metadata(&self, path: &str) -> Result<Option<Metadata>, Error> {
        let root = self.lock();
        let now = SystemTime::now();
        Ok(Self::find(&root, path).map(|node| Metadata {
            kind: node.kind(),
            size: match node {
                Node::File(data) => data.len() as u64,
                Node::Directory(children) => children.len() as u64,
            },
            atime: now,
            mtime: now,
            ctime: now,
        }))
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, Error> {
        let root = self.lock();
        match Self::find(&root, path) {
            Some(Node::File(data)) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(Node::Directory(_)) => Err(Error::io_message(
                self.url(path),
                "cannot open a directory for reading",
            )),
            None => Err(Error::NotFound {
                url: self.url(path),
            }),
        }
    }
}

impl Writable for MemoryHandler {
    fn replace(&self, path: &str, data: &[u8]) -> Result<(), Error> {
        log::debug!("storing {} byte(s) at {}", data.len(), self.url(path));
        let mut root = self.lock();
        let (children, leaf) = self.parent_mut(&mut root, path)?;
        if let Some(Node::Directory(_)) = children.get(&leaf) {
            return Err(Error::io_message(
                self.url(path),
                "a directory exists at this path",
            ));
        }
        children.insert(leaf, Node::File(data.to_vec()));
        Ok(())
    }

    fn create_dir(&self, path: &str) -> Result<(), Error> {
        log::debug!("creating directory {}", self.url(path));
        let mut root = self.lock();
        if segments(path).is_empty() {
            return Ok(());
        }
        let (children, leaf) = self.parent_mut(&mut root, path)?;
        match children.get(&leaf) {
            Some(Node::File(_)) => Err(Error::io_message(
                self.url(path),
                "a file exists at this path",
            )),
            Some(Node::Directory(_)) => Ok(()),
            None => {
                children.insert(leaf, Node::Directory(BTreeMap::new()));
                Ok(())
            }
        }
    }

    fn remove(&self, path: &str) -> Result<(), Error> {
        log::debug!("removing {}", self.url(path));
        let mut root = self.lock();
        let (children, leaf) = self.parent_mut(&mut root, path)?;
        match children.remove(&leaf) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound {
                url: self.url(path),
            }),
        }
    }
}

impl Listable for MemoryHandler {
    fn list(&self, path: &str) -> Result<Vec<String>, Error> {
        let root = self.lock();
        match Self::find(&root, path) {
            Some(Node::Directory(children)) => Ok(children.keys().cloned().collect()),
            Some(Node::File(_)) => Err(Error::io_message(
                self.url(path),
                "not a directory",
            )),
            None => Err(Error::NotFound {
                url: self.url(path),
            }),
        }
    }

    fn join(&self, base: &str, name: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), name)
    }
}
