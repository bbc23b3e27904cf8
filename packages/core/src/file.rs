//! File resources: buffered writes, line iteration, codec siblings.

use std::io::{BufRead, BufReader, Read};
use std::time::SystemTime;

use bytes::Bytes;

use crate::buffer::WriteBuffer;
use crate::resource::Binding;
use crate::{Codec, Error, Resource, Url};

/// A leaf resource: a sequence of lines.
///
/// Appended lines accumulate in an in-memory write buffer and reach the
/// backing store only on [`flush`](FileResource::flush). Buffered lines
/// are visible to [`read`](FileResource::read) on this instance but not
/// to any other Resource pointing at the same URL until flushed.
///
/// Backing handles are scoped per operation: every read reopens the
/// store, so nothing here goes stale when the item changes underneath —
/// operations simply observe whatever the store holds at call time.
#[derive(Clone)]
pub struct FileResource {
    pub(crate) binding: Binding,
    buffer: WriteBuffer,
}

impl FileResource {
    pub(crate) fn from_binding(binding: Binding) -> Self {
        Self {
            binding,
            buffer: WriteBuffer::new(),
        }
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

    /// Committed size in bytes, queried live. Pending buffered lines do
    /// not count until flushed.
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

    /// Enqueue one line into the write buffer. Not yet persisted.
    pub fn append(&mut self, line: impl Into<String>) {
        self.buffer.append(line);
    }

    /// Enqueue an ordered sequence of lines, preserving call order.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buffer.extend(lines);
    }

    /// True when unflushed lines are pending.
    pub fn is_dirty(&self) -> bool {
        !self.buffer.is_clean()
    }

    /// Buffered-and-committed content, newline-joined.
    ///
    /// A clean buffer over an absent backing item fails with `NotFound`
    /// (the stale-alias rule); a dirty buffer over an absent item yields
    /// the pending lines, so appending before the first flush works.
    pub fn read(&self) -> Result<String, Error> {
        let committed = match self.binding.read_string() {
            Ok(content) => content,
            Err(e) if e.is_not_found() && self.is_dirty() => String::new(),
            Err(e) => return Err(e),
        };

        if self.buffer.is_clean() {
            return Ok(committed);
        }

        let mut content = committed;
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&self.buffer.pending().join("\n"));
        Ok(content)
    }

    /// Committed bytes, optionally bounded to the first `limit` bytes.
    /// Pending buffered lines are not included.
    pub fn read_bytes(&self, limit: Option<usize>) -> Result<Bytes, Error> {
        self.binding.read_bytes(limit)
    }

    /// Commit pending buffered lines to the backing store. A no-op when
    /// nothing is buffered; creates the backing item when absent.
    pub fn flush(&mut self) -> Result<(), Error> {
        if self.buffer.is_clean() {
            return Ok(());
        }

        let committed = match self.binding.read_string() {
            Ok(content) => content,
            Err(e) if e.is_not_found() => String::new(),
            Err(e) => return Err(e),
        };

        let mut content = committed;
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&self.buffer.pending().join("\n"));

        log::debug!("flushing {} pending line(s) to {}", self.buffer.pending().len(), self.url());
        self.binding
            .handler
            .replace(self.binding.url.path(), content.as_bytes())?;
        self.buffer.reset();
        Ok(())
    }

    /// Discard the write buffer, reverting to the last committed content.
    /// Does not undo a flush already performed.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    /// Overwrite the full committed content.
    ///
    /// Rejected while buffered lines are pending: flush or reset first.
    pub fn write(&mut self, content: &str) -> Result<(), Error> {
        if self.is_dirty() {
            return Err(Error::io_message(
                self.url().to_string(),
                "pending buffered lines: flush or reset before writing",
            ));
        }
        self.binding
            .handler
            .replace(self.binding.url.path(), content.as_bytes())
    }

    /// Create an empty file at this path. Fails with `AlreadyExists` when
    /// one exists and overwrite was not requested.
    pub fn create(&self, overwrite: bool) -> Result<(), Error> {
        if !overwrite && self.exists()? {
            return Err(Error::AlreadyExists {
                url: self.url().to_string(),
            });
        }
        self.binding.handler.replace(self.binding.url.path(), b"")
    }

    /// Remove the backing file. Fails with `NotFound` when absent.
    pub fn delete(&self) -> Result<(), Error> {
        self.binding.require_metadata()?;
        self.binding.handler.remove(self.binding.url.path())
    }

    /// Remove the backing file if present.
    pub fn delete_quiet(&self) -> Result<bool, Error> {
        match self.delete() {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// True when the committed size is zero.
    pub fn empty(&self) -> Result<bool, Error> {
        Ok(self.size()? == 0)
    }

    /// A lazy, restartable sequence of committed lines.
    ///
    /// Each call reopens the backing store, so two concurrent iterations
    /// do not interfere and a finished iteration can simply be restarted
    /// by calling this again.
    pub fn lines(&self) -> Result<Lines, Error> {
        let reader = self.binding.open()?;
        Ok(Lines {
            inner: BufReader::new(reader).lines(),
            url: self.url().to_string(),
        })
    }

    /// Stream committed content into `target`, which may live under a
    /// different protocol.
    pub fn copy_to(&self, target: &FileResource) -> Result<(), Error> {
        let data = self.binding.read_bytes(None)?;
        log::debug!("copying {} -> {}", self.url(), target.url());
        target
            .binding
            .handler
            .replace(target.binding.url.path(), &data)
    }

    /// Materialize a copy at `destination`; see [`Resource::get`].
    pub fn get(&self, destination: Option<&str>) -> Result<Resource, Error> {
        Resource::File(self.clone()).get(destination)
    }

    /// Copy committed content to a new URL; see [`Resource::put`].
    pub fn put(&self, url: &str) -> Result<Resource, Error> {
        Resource::File(self.clone()).put(url)
    }

    /// Produce the encoded sibling of this file through `codec`.
    ///
    /// With no destination the sibling lands next to this file with the
    /// codec's extension appended to the URL.
    pub fn encode_with(
        &self,
        codec: &dyn Codec,
        destination: Option<&str>,
    ) -> Result<FileResource, Error> {
        let destination = match destination {
            Some(d) => d.to_string(),
            None => format!("{}{}", self.url(), codec.extension()),
        };
        let mut input = self.binding.open()?;
        let mut encoded = Vec::new();
        codec
            .encode(&mut input, &mut encoded)
            .map_err(|e| Error::from_io(self.url().to_string(), e))?;
        self.write_sibling(&destination, &encoded)
    }

    /// Produce the decoded sibling of this file through `codec`.
    ///
    /// With no destination the codec's extension is stripped from the URL;
    /// fails when the URL does not carry it.
    pub fn decode_with(
        &self,
        codec: &dyn Codec,
        destination: Option<&str>,
    ) -> Result<FileResource, Error> {
        let destination = match destination {
            Some(d) => d.to_string(),
            None => {
                let url = self.url().to_string();
                match url.strip_suffix(codec.extension()) {
                    Some(stripped) if !stripped.ends_with("://") => stripped.to_string(),
                    _ => {
                        return Err(Error::io_message(
                            url,
                            format!("url does not end with '{}'", codec.extension()),
                        ))
                    }
                }
            }
        };
        let mut input = self.binding.open()?;
        let mut decoded = Vec::new();
        codec
            .decode(&mut input, &mut decoded)
            .map_err(|e| Error::from_io(self.url().to_string(), e))?;
        self.write_sibling(&destination, &decoded)
    }

    fn write_sibling(&self, destination: &str, data: &[u8]) -> Result<FileResource, Error> {
        let binding = self.binding.registry.bind(destination)?;
        binding.handler.replace(binding.url.path(), data)?;
        Ok(FileResource::from_binding(binding))
    }
}

impl std::fmt::Display for FileResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}

impl std::fmt::Debug for FileResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<FileResource {}>", self.url())
    }
}

impl From<FileResource> for Resource {
    fn from(file: FileResource) -> Self {
        Resource::File(file)
    }
}

/// Iterator over committed lines; see [`FileResource::lines`].
pub struct Lines {
    inner: std::io::Lines<BufReader<Box<dyn Read + Send>>>,
    url: String,
}

impl Iterator for Lines {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|line| line.map_err(|e| Error::from_io(self.url.clone(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHandler;
    use crate::Registry;

    fn file(registry: &Registry, url: &str) -> FileResource {
        match registry.resolve(url).unwrap() {
            Resource::File(f) => f,
            Resource::Directory(_) => panic!("expected a file resource"),
        }
    }

    #[test]
    fn append_then_read() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f1");
        f.create(false).unwrap();

        f.append("a");
        assert_eq!(f.read().unwrap(), "a");

        f.extend(["b", "c"]);
        assert_eq!(f.read().unwrap(), "a\nb\nc");
    }

    #[test]
    fn buffered_lines_are_instance_local_until_flush() {
        let handler = TestHandler::new();
        let registry = handler.registry();
        let mut writer = file(&registry, "test://shared");
        writer.create(false).unwrap();
        writer.append("pending");

        let reader = file(&registry, "test://shared");
        assert_eq!(reader.read().unwrap(), "");

        writer.flush().unwrap();
        assert_eq!(reader.read().unwrap(), "pending");
    }

    #[test]
    fn reset_discards_unflushed_lines() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f2");
        f.create(false).unwrap();
        f.append("committed");
        f.flush().unwrap();

        f.extend(["x", "y"]);
        assert!(f.is_dirty());
        f.reset();
        assert!(!f.is_dirty());
        assert_eq!(f.read().unwrap(), "committed");
    }

    #[test]
    fn reset_does_not_undo_flush() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f3");
        f.append("kept");
        f.flush().unwrap();
        f.reset();
        assert_eq!(f.read().unwrap(), "kept");
    }

    #[test]
    fn flush_is_noop_when_clean() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f4");
        f.flush().unwrap();
        assert!(!f.exists().unwrap());
    }

    #[test]
    fn empty_and_size_track_flushes() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f5");
        f.create(false).unwrap();
        assert!(f.empty().unwrap());
        assert_eq!(f.size().unwrap(), 0);

        f.append("x");
        f.flush().unwrap();
        assert!(!f.empty().unwrap());
        assert!(f.size().unwrap() > 0);
    }

    #[test]
    fn write_rejected_while_dirty() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f6");
        f.append("pending");
        let err = f.write("replacement").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));

        f.reset();
        f.write("replacement").unwrap();
        assert_eq!(f.read().unwrap(), "replacement");
    }

    #[test]
    fn read_on_absent_file_is_not_found() {
        let registry = TestHandler::new().registry();
        let f = file(&registry, "test://missing");
        assert!(f.read().unwrap_err().is_not_found());
    }

    #[test]
    fn read_on_absent_file_with_pending_lines_shows_them() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://unborn");
        f.append("first");
        assert_eq!(f.read().unwrap(), "first");
    }

    #[test]
    fn read_bytes_honors_limit() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f7");
        f.write("0123456789").unwrap();
        assert_eq!(&f.read_bytes(Some(4)).unwrap()[..], b"0123");
        assert_eq!(&f.read_bytes(None).unwrap()[..], b"0123456789");
    }

    #[test]
    fn lines_are_restartable_and_independent() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f8");
        f.extend(["a", "b", "c"]);
        f.flush().unwrap();

        let mut first = f.lines().unwrap();
        let mut second = f.lines().unwrap();
        assert_eq!(first.next().unwrap().unwrap(), "a");
        assert_eq!(first.next().unwrap().unwrap(), "b");
        assert_eq!(second.next().unwrap().unwrap(), "a");

        let collected: Vec<String> = f.lines().unwrap().map(Result::unwrap).collect();
        assert_eq!(collected, ["a", "b", "c"]);
    }

    #[test]
    fn create_without_overwrite_fails_on_existing() {
        let registry = TestHandler::new().registry();
        let mut f = file(&registry, "test://f9");
        f.write("content").unwrap();

        let err = f.create(false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert_eq!(f.read().unwrap(), "content");

        f.create(true).unwrap();
        assert_eq!(f.read().unwrap(), "");
    }

    #[test]
    fn delete_and_quiet_variant() {
        let registry = TestHandler::new().registry();
        let f = file(&registry, "test://f10");
        assert!(f.delete().unwrap_err().is_not_found());
        assert!(!f.delete_quiet().unwrap());

        f.create(false).unwrap();
        f.delete().unwrap();
        assert!(!f.exists().unwrap());
    }
}
