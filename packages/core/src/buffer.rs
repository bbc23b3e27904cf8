//! Buffered-writer state machine for file resources.

/// Ordered pending lines not yet committed to the backing store.
///
/// The lifecycle is an explicit two-state machine: `clean` (no pending
/// lines) becomes `dirty` on [`append`](WriteBuffer::append) /
/// [`extend`](WriteBuffer::extend), and returns to `clean` either by
/// committing ([`take`](WriteBuffer::take), driven by the resource's
/// `flush`) or by discarding ([`reset`](WriteBuffer::reset)). A reset
/// never undoes a flush already performed.
#[derive(Debug, Default, Clone)]
pub struct WriteBuffer {
    lines: Vec<String>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no lines are pending.
    pub fn is_clean(&self) -> bool {
        self.lines.is_empty()
    }

    /// Enqueue one line.
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Enqueue a sequence of lines, preserving order.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// The pending lines, for read overlays.
    pub fn pending(&self) -> &[String] {
        &self.lines
    }

    /// Drain the pending lines for committing, leaving the buffer clean.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Discard the pending lines without committing them.
    pub fn reset(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        assert!(WriteBuffer::new().is_clean());
    }

    #[test]
    fn append_and_extend_preserve_order() {
        let mut buffer = WriteBuffer::new();
        buffer.append("a");
        buffer.extend(["b", "c"]);
        assert!(!buffer.is_clean());
        assert_eq!(buffer.pending(), ["a", "b", "c"]);
    }

    #[test]
    fn take_leaves_clean() {
        let mut buffer = WriteBuffer::new();
        buffer.append("a");
        assert_eq!(buffer.take(), vec!["a".to_string()]);
        assert!(buffer.is_clean());
    }

    #[test]
    fn reset_discards() {
        let mut buffer = WriteBuffer::new();
        buffer.extend(["a", "b"]);
        buffer.reset();
        assert!(buffer.is_clean());
        assert!(buffer.take().is_empty());
    }
}
