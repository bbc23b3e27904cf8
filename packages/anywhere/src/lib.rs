//! Uniform resource access over `protocol://path` URLs.
//!
//! One operation set for any addressable item, wherever it lives: local
//! disk, process memory, or any backing store with a registered handler.
//! Resolve a URL into a [`Resource`], then read, buffer-append, flush,
//! copy, and delete through the same calls regardless of protocol.
//!
//! # Example
//!
//! ```rust
//! use anywhere::{default_registry, Resource};
//!
//! let registry = default_registry();
//! let mut resource = registry.resolve("mem://scratch/notes").unwrap();
//! if let Resource::File(f) = &mut resource {
//!     f.append("first line");
//!     f.flush().unwrap();
//!     assert_eq!(f.read().unwrap(), "first line");
//! }
//! ```

pub use anywhere_core::{
    Children, Codec, DirectoryResource, Error, FileResource, Handler, HandlerFactory, Lines,
    Listable, Metadata, Readable, Registry, Resource, ResourceKind, Url, Writable, WriteBuffer,
};
pub use anywhere_fs::FsHandler;
pub use anywhere_gzip::GzipCodec;
pub use anywhere_memory::MemoryStore;

mod config;
pub use config::{HandlerConfig, RegistryConfig};

/// A registry with the stock protocols bound: `file` for the local
/// filesystem and `mem` for the process-wide in-memory store.
pub fn default_registry() -> Registry {
    let registry = Registry::new();
    FsHandler::register(&registry);
    MemoryStore::shared().register(&registry, "mem");
    registry
}
