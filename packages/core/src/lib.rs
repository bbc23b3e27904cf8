//! Core anywhere: handler dispatch and resource abstraction.
//!
//! Any storage item — local file, directory, or remote object — is
//! addressed through a `protocol://path` URL and one operation set,
//! regardless of which backing store holds the data:
//! - [`Url`]: the parsed (protocol, path) identity
//! - [`Registry`]: protocol → handler-factory dispatch table
//! - [`Resource`] / [`FileResource`] / [`DirectoryResource`]: the
//!   addressed items, forwarding all I/O to their resolved handler
//! - [`Readable`] / [`Writable`] / [`Listable`]: the capability contract
//!   backing stores implement
//! - [`Codec`]: external transcoder seam producing encoded siblings
//!
//! All I/O is synchronous and blocking; backing handles are scoped per
//! operation. The core coordinates nothing across Resource instances: two
//! writers to the same URL may race, by design.
//!
//! # Example
//!
//! ```rust,ignore
//! use anywhere_core::Registry;
//!
//! let registry = Registry::new();
//! registry.register("file", FsHandler::factory());
//!
//! let mut resource = registry.resolve("file:///tmp/notes.txt")?;
//! if let anywhere_core::Resource::File(file) = &mut resource {
//!     file.append("first line");
//!     file.flush()?;
//! }
//! ```

mod buffer;
mod codec;
mod directory;
mod error;
mod file;
mod handler;
mod registry;
mod resource;
mod url;

pub use buffer::WriteBuffer;
pub use codec::Codec;
pub use directory::{Children, DirectoryResource};
pub use error::Error;
pub use file::{FileResource, Lines};
pub use handler::{Handler, HandlerFactory, Listable, Metadata, Readable, ResourceKind, Writable};
pub use registry::Registry;
pub use resource::Resource;
pub use url::Url;

#[cfg(test)]
pub(crate) mod testing;
