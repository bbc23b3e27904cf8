//! Minimal in-memory handler for exercising the resource layer in unit
//! tests. Real backing stores live in their own crates.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::handler::{Handler, HandlerFactory, Listable, Metadata, Readable, ResourceKind, Writable};
use crate::{Error, Registry, Url};

#[derive(Default)]
struct State {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
}

/// Flat path-keyed store: files are full paths, directories are an
/// explicit path set, membership is a parent-prefix check.
#[derive(Clone, Default)]
pub(crate) struct TestHandler {
    state: Arc<Mutex<State>>,
}

impl TestHandler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn factory(&self) -> HandlerFactory {
        let handler = self.clone();
        Arc::new(move |_url: &Url| Ok(Arc::new(handler.clone()) as Arc<dyn Handler>))
    }

    /// A fresh registry with this handler bound to the `test` protocol.
    pub(crate) fn registry(&self) -> Registry {
        let registry = Registry::new();
        registry.register("test", self.factory());
        registry
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn parent_of(path: &str) -> Option<&str> {
        path.rsplit_once('/').map(|(parent, _)| parent)
    }
}

impl Readable for TestHandler {
    fn metadata(&self, path: &str) -> Result<Option<Metadata>, Error> {
        let path = path.trim_end_matches('/');
        let state = self.lock();
        let now = SystemTime::now();
        if let Some(data) = state.files.get(path) {
            return Ok(Some(Metadata {
                kind: ResourceKind::File,
                size: data.len() as u64,
                atime: now,
                mtime: now,
                ctime: now,
            }));
        }
        if state.dirs.contains(path) {
            return Ok(Some(Metadata {
                kind: ResourceKind::Directory,
                size: 0,
                atime: now,
                mtime: now,
                ctime: now,
            }));
        }
        Ok(None)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, Error> {
        let state = self.lock();
        match state.files.get(path) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(Error::NotFound {
                url: format!("test://{}", path),
            }),
        }
    }
}

impl Writable for TestHandler {
    fn replace(&self, path: &str, data: &[u8]) -> Result<(), Error> {
        self.lock().files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn create_dir(&self, path: &str) -> Result<(), Error> {
        self.lock().dirs.insert(path.trim_end_matches('/').to_string());
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), Error> {
        let path = path.trim_end_matches('/');
        let mut state = self.lock();
        if state.files.remove(path).is_some() {
            return Ok(());
        }
        if state.dirs.remove(path) {
            state.files.retain(|p, _| !p.starts_with(&format!("{}/", path)));
            return Ok(());
        }
        Err(Error::NotFound {
            url: format!("test://{}", path),
        })
    }
}

impl Listable for TestHandler {
    fn list(&self, path: &str) -> Result<Vec<String>, Error> {
        let path = path.trim_end_matches('/');
        let state = self.lock();
        if !state.dirs.contains(path) {
            return Err(Error::NotFound {
                url: format!("test://{}", path),
            });
        }
        let mut names: Vec<String> = state
            .files
            .keys()
            .filter(|p| TestHandler::parent_of(p) == Some(path))
            .map(|p| p.rsplit('/').next().unwrap_or(p).to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn join(&self, base: &str, name: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), name)
    }
}
