//! Output sinks and input sources.
//!
//! PRINT writes rendered bytes to an [`OutputSink`]; STDIN pulls lines
//! from any `BufRead`. The default sink on Unix issues the write syscall
//! directly, skipping stdio buffering; other platforms go through
//! `std::io`. Tests swap in [`CaptureSink`] and a byte-slice reader.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// A byte-oriented, in-order output sink.
///
/// Write failures are not surfaced to the running program: a program
/// cannot observe or recover from a broken stdout, so the sink absorbs
/// the error the same way a C `printf` would.
pub trait OutputSink {
    /// Write all of `bytes` to the sink.
    fn write(&mut self, bytes: &[u8]);
}

/// Sink writing straight to file descriptor 1 via the write syscall.
#[cfg(unix)]
#[derive(Debug)]
pub struct RawFdSink {
    fd: i32,
}

#[cfg(unix)]
impl RawFdSink {
    /// Sink for standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self { fd: 1 }
    }
}

#[cfg(unix)]
impl OutputSink for RawFdSink {
    fn write(&mut self, bytes: &[u8]) {
        let mut remaining = bytes;
        while !remaining.is_empty() {
            // SAFETY: the pointer and length come from a live slice.
            let written = unsafe {
                libc::write(
                    self.fd,
                    remaining.as_ptr() as *const libc::c_void,
                    remaining.len(),
                )
            };
            if written < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return;
            }
            if written == 0 {
                return;
            }
            remaining = &remaining[written as usize..];
        }
    }
}

/// Portable sink over `std::io::stdout`.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, bytes: &[u8]) {
        let _ = io::stdout().write_all(bytes);
    }
}

/// In-memory sink for tests. The handle returned by [`CaptureSink::new`]
/// stays readable after the sink is boxed into a VM.
#[derive(Debug, Default)]
pub struct CaptureSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl CaptureSink {
    /// Create a sink and a shared handle onto its buffer.
    #[must_use]
    pub fn new() -> (Self, CaptureHandle) {
        let buf = Rc::new(RefCell::new(Vec::new()));
        let handle = CaptureHandle { buf: Rc::clone(&buf) };
        (Self { buf }, handle)
    }
}

impl OutputSink for CaptureSink {
    fn write(&mut self, bytes: &[u8]) {
        self.buf.borrow_mut().extend_from_slice(bytes);
    }
}

/// Read-side handle onto a [`CaptureSink`] buffer.
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl CaptureHandle {
    /// Captured bytes so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Captured bytes as a string (lossy).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

/// The platform's preferred sink for standard output.
#[must_use]
pub fn default_sink() -> Box<dyn OutputSink> {
    #[cfg(unix)]
    {
        Box::new(RawFdSink::stdout())
    }
    #[cfg(not(unix))]
    {
        Box::new(StdoutSink)
    }
}

/// Initial line-buffer capacity for STDIN reads.
pub const STDIN_BUF_CAPACITY: usize = 1024;

/// Read one line from `input`, up to and excluding `\n`. A trailing `\r`
/// is stripped so CRLF input behaves as LF. The bytes are returned
/// verbatim — input is not required to be UTF-8. EOF and read errors
/// yield an empty line.
pub fn read_line(input: &mut dyn BufRead) -> Vec<u8> {
    let mut buf = Vec::with_capacity(STDIN_BUF_CAPACITY);
    if input.read_until(b'\n', &mut buf).is_err() {
        return Vec::new();
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    buf
}
