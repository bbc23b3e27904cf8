//! Process-wide protocol registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::handler::{HandlerFactory, ResourceKind};
use crate::resource::{Binding, Resource};
use crate::{Error, Url};

/// Mapping from protocol name to handler factory.
///
/// The registry is the single point of polymorphic dispatch: every
/// backing-store variant is reached through the handler object returned
/// here. It is initialized empty and extended explicitly via
/// [`Registry::register`]; later registration for an existing protocol
/// overrides the earlier one. Clones share the same underlying table, so a
/// registry can be handed to every Resource it resolves.
///
/// Registration is write-rare and lookup read-mostly; both are safe to
/// call from multiple threads.
///
/// # Examples
///
/// ```rust,ignore
/// use anywhere_core::Registry;
///
/// let registry = Registry::new();
/// registry.register("file", FsHandler::factory());
/// let resource = registry.resolve("file:///tmp/report.txt")?;
/// ```
#[derive(Clone)]
pub struct Registry {
    factories: Arc<RwLock<HashMap<String, HandlerFactory>>>,
}

impl Registry {
    /// An empty registry with no protocols bound.
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Bind a factory to a protocol, replacing any earlier binding.
    pub fn register(&self, protocol: &str, factory: HandlerFactory) {
        log::debug!("registering handler for protocol '{}'", protocol);
        self.factories
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(protocol.to_string(), factory);
    }

    /// The protocols currently bound, in no particular order.
    pub fn protocols(&self) -> Vec<String> {
        self.factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    fn factory(&self, protocol: &str) -> Result<HandlerFactory, Error> {
        self.factories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(protocol)
            .cloned()
            .ok_or_else(|| Error::UnsupportedProtocol {
                protocol: protocol.to_string(),
            })
    }

    /// Parse a URL and bind it to a handler from the table, without
    /// deciding the Resource kind.
    pub(crate) fn bind(&self, url: &str) -> Result<Binding, Error> {
        let url = Url::parse(url)?;
        let factory = self.factory(url.protocol())?;
        let handler = factory(&url)?;
        Ok(Binding::new(self.clone(), url, handler))
    }

    /// Resolve a URL string into a Resource bound to its handler.
    ///
    /// The kind is fixed here and never re-examined: an existing backing
    /// item contributes its stored kind; for an absent item a trailing
    /// slash selects a directory, anything else a file. Existence itself
    /// is not required — operations check it lazily.
    pub fn resolve(&self, url: &str) -> Result<Resource, Error> {
        let binding = self.bind(url)?;

        let kind = match binding.metadata()? {
            Some(metadata) => metadata.kind,
            None if binding.url.has_dir_hint() => ResourceKind::Directory,
            None => ResourceKind::File,
        };
        log::trace!("resolved {} as {}", binding.url, kind);

        Ok(Resource::with_kind(binding, kind))
    }

    /// Resolve a URL string, forcing the Resource kind.
    ///
    /// Used for copy destinations, where the target usually does not exist
    /// yet and must take the source's kind rather than the hint the URL
    /// spelling would give.
    pub fn resolve_as(&self, url: &str, kind: ResourceKind) -> Result<Resource, Error> {
        Ok(Resource::with_kind(self.bind(url)?, kind))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
