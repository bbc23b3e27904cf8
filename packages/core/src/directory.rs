//! Directory resources: membership, listing, add/remove with overwrite
//! control.

use std::time::SystemTime;

use crate::resource::Binding;
use crate::{Error, Resource, Url};

/// A container resource: a set of named children.
///
/// A directory conceptually owns its children but never holds them:
/// children live in the backing namespace and are re-resolved by name on
/// every access. Membership is name equality within that namespace — the
/// core keeps no index of its own.
///
/// A child reference obtained from [`add`](DirectoryResource::add) or
/// [`child`](DirectoryResource::child) is a weak alias: it stays a valid
/// (protocol, path) pair after the underlying item is deleted, and using
/// it then fails with `NotFound` at access time rather than eagerly at
/// removal time.
#[derive(Clone)]
pub struct DirectoryResource {
    pub(crate) binding: Binding,
}

impl DirectoryResource {
    pub(crate) fn from_binding(binding: Binding) -> Self {
        Self { binding }
    }

    pub fn url(&self) -> &Url {
        &self.binding.url
    }

    pub fn name(&self) -> &str {
        self.binding.url.name()
    }

    pub fn exists(&self) -> Result<bool, Error> {
        self.binding.exists()
    }

    pub fn size(&self) -> Result<u64, Error> {
        Ok(self.binding.require_metadata()?.size)
    }

    pub fn atime(&self) -> Result<SystemTime, Error> {
        Ok(self.binding.require_metadata()?.atime)
    }

    pub fn mtime(&self) -> Result<SystemTime, Error> {
        Ok(self.binding.require_metadata()?.mtime)
    }

    pub fn ctime(&self) -> Result<SystemTime, Error> {
        Ok(self.binding.require_metadata()?.ctime)
    }

    /// Child names currently present in the backing namespace, in the
    /// store's own enumeration order.
    pub fn list(&self) -> Result<Vec<String>, Error> {
        self.binding.handler.list(self.binding.url.path())
    }

    /// The child-name listing, newline-joined. An empty directory reads
    /// as an empty string, not an error.
    pub fn read(&self) -> Result<String, Error> {
        Ok(self.list()?.join("\n"))
    }

    /// True when the directory has no children.
    pub fn empty(&self) -> Result<bool, Error> {
        Ok(self.list()?.is_empty())
    }

    /// Whether a child of that name exists right now. Re-checked on every
    /// call, never cached.
    pub fn contains(&self, name: &str) -> Result<bool, Error> {
        self.binding.child(name).exists()
    }

    /// An alias to the named child.
    ///
    /// Always succeeds for a resolvable name: existence is a backing-store
    /// concern checked when the alias is used. An absent child resolves as
    /// a file.
    pub fn child(&self, name: &str) -> Result<Resource, Error> {
        let binding = self.binding.child(name);
        let kind = match binding.metadata()? {
            Some(metadata) => metadata.kind,
            None => crate::handler::ResourceKind::File,
        };
        Ok(Resource::with_kind(binding, kind))
    }

    /// A lazy sequence of child Resources, one per name in
    /// [`list`](DirectoryResource::list). Names are snapshotted at the
    /// call; each child is re-resolved when the iterator reaches it.
    pub fn children(&self) -> Result<Children, Error> {
        Ok(Children {
            dir: self.clone(),
            names: self.list()?.into_iter(),
        })
    }

    /// Copy `resource`'s committed content into this directory under its
    /// name, returning an alias to the new child.
    ///
    /// With `overwrite` disabled an existing same-named child makes this
    /// fail with `AlreadyExists`, leaving the child untouched. The
    /// existence check and the write are not atomic against a concurrent
    /// writer; callers needing stronger consistency must coordinate
    /// outside this layer.
    pub fn add(&self, resource: &Resource, overwrite: bool) -> Result<Resource, Error> {
        let name = resource.name().to_string();
        let child = self.binding.child(&name);

        if !overwrite && child.exists()? {
            return Err(Error::AlreadyExists {
                url: child.url.to_string(),
            });
        }

        log::debug!("adding '{}' to {}", name, self.url());
        let target = Resource::with_kind(child, resource.kind());
        resource.copy(&target)?;
        Ok(target)
    }

    /// Delete the child named after `resource` from the backing
    /// namespace. Fails with `NotFound` when absent. Aliases to the child
    /// keep their URL and fail only when next used.
    pub fn remove(&self, resource: &Resource) -> Result<(), Error> {
        self.remove_name(resource.name())
    }

    /// Delete the named child; see [`remove`](DirectoryResource::remove).
    pub fn remove_name(&self, name: &str) -> Result<(), Error> {
        let child = self.binding.child(name);
        child.require_metadata()?;
        log::debug!("removing '{}' from {}", name, self.url());
        child.handler.remove(child.url.path())
    }

    /// Create an empty directory at this path. Fails with
    /// `AlreadyExists` when one exists and overwrite was not requested.
    pub fn create(&self, overwrite: bool) -> Result<(), Error> {
        if !overwrite && self.exists()? {
            return Err(Error::AlreadyExists {
                url: self.url().to_string(),
            });
        }
        self.binding.handler.create_dir(self.binding.url.path())
    }

    /// Remove the backing directory. Fails with `NotFound` when absent.
    pub fn delete(&self) -> Result<(), Error> {
        self.binding.require_metadata()?;
        self.binding.handler.remove(self.binding.url.path())
    }

    /// Remove the backing directory if present.
    pub fn delete_quiet(&self) -> Result<bool, Error> {
        match self.delete() {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Copy children into `target`, which may live under a different
    /// protocol. Children are re-resolved by name at copy time;
    /// subdirectories recurse.
    pub fn copy_to(&self, target: &DirectoryResource) -> Result<(), Error> {
        if !target.exists()? {
            target
                .binding
                .handler
                .create_dir(target.binding.url.path())?;
        }
        for name in self.list()? {
            let child = self.child(&name)?;
            let destination = Resource::with_kind(target.binding.child(&name), child.kind());
            child.copy(&destination)?;
        }
        Ok(())
    }

    /// Materialize a copy at `destination`; see [`Resource::get`].
    pub fn get(&self, destination: Option<&str>) -> Result<Resource, Error> {
        Resource::Directory(self.clone()).get(destination)
    }

    /// Copy children to a new URL; see [`Resource::put`].
    pub fn put(&self, url: &str) -> Result<Resource, Error> {
        Resource::Directory(self.clone()).put(url)
    }
}

impl std::fmt::Display for DirectoryResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}

impl std::fmt::Debug for DirectoryResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<DirectoryResource {}>", self.url())
    }
}

impl From<DirectoryResource> for Resource {
    fn from(dir: DirectoryResource) -> Self {
        Resource::Directory(dir)
    }
}

/// Iterator over child Resources; see [`DirectoryResource::children`].
pub struct Children {
    dir: DirectoryResource,
    names: std::vec::IntoIter<String>,
}

impl Iterator for Children {
    type Item = Result<Resource, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.names.next().map(|name| self.dir.child(&name))
    }
}
