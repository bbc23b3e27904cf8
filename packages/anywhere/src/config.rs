//! Declarative registry construction.
//!
//! A [`RegistryConfig`] maps protocol names to handler choices and can be
//! read from JSON, so an application can wire its protocol table from a
//! config file instead of code:
//!
//! ```json
//! {
//!   "handlers": {
//!     "file": { "type": "file" },
//!     "mem": { "type": "memory" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use anywhere_core::Registry;
use anywhere_fs::FsHandler;
use anywhere_memory::MemoryStore;

/// Which handler backs a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HandlerConfig {
    /// The local filesystem.
    File,
    /// A fresh in-memory tree private to the built registry.
    Memory,
    /// The process-wide in-memory tree.
    #[serde(rename = "shared-memory")]
    SharedMemory,
}

/// Protocol table in declarative form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub handlers: BTreeMap<String, HandlerConfig>,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a registry with every configured protocol bound.
    pub fn build(&self) -> Registry {
        let registry = Registry::new();
        for (protocol, handler) in &self.handlers {
            match handler {
                HandlerConfig::File => registry.register(protocol, FsHandler::factory()),
                HandlerConfig::Memory => MemoryStore::new().register(&registry, protocol),
                HandlerConfig::SharedMemory => {
                    MemoryStore::shared().register(&registry, protocol)
                }
            }
        }
        registry
    }
}
