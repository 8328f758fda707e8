//! In-memory stream replaying scripted server replies

use std::{
    io::{self, Cursor, Read, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

type MockCursor = Cursor<Vec<u8>>;

/// A stream whose reads come from a fixed script and whose writes are kept
///
/// Clones share the same buffers, so a test can keep one handle while the
/// connection owns another.
#[derive(Clone, Debug, Default)]
pub struct MockStream {
    reader: Arc<Mutex<MockCursor>>,
    writer: Arc<Mutex<MockCursor>>,
    closed: Arc<AtomicBool>,
}

fn lock(cursor: &Mutex<MockCursor>) -> MutexGuard<'_, MockCursor> {
    cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockStream {
    /// Creates a stream with nothing to read
    pub fn new() -> MockStream {
        MockStream::default()
    }

    /// Creates a stream which reads `replies` back to back
    pub fn with_replies(replies: &[&str]) -> MockStream {
        let stream = MockStream::new();
        lock(&stream.reader)
            .get_mut()
            .extend_from_slice(replies.concat().as_bytes());
        stream
    }

    /// Everything written so far
    pub fn written(&self) -> Vec<u8> {
        lock(&self.writer).get_ref().clone()
    }

    /// Takes everything written so far, leaving the buffer empty
    pub fn take_vec(&self) -> Vec<u8> {
        let mut cursor = lock(&self.writer);
        let vec = cursor.get_ref().clone();
        cursor.set_position(0);
        cursor.get_mut().clear();
        vec
    }

    /// Whether the connection was shut down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Write for MockStream {
    fn write(&mut self, msg: &[u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Err(io::ErrorKind::NotConnected.into());
        }
        lock(&self.writer).write(msg)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Err(io::ErrorKind::NotConnected.into());
        }
        lock(&self.reader).read(buf)
    }
}
