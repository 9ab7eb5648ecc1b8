//! The output channel is the destination for the direct textual output of
//! running code, and supports temporarily redirecting that output into memory.
//!
//! Redirection works by opening an [`OutputCapture`] on the channel. While a
//! capture is open every write to the channel lands in the capture's frame
//! rather than in the underlying sink. Captures nest, with writes always going
//! to the innermost one, and borrowing guarantees that a capture is the
//! innermost one for as long as it is usable.
//!
//! Closing a capture releases its frame. This happens on every exit path: by
//! [`OutputCapture::finish`] when the captured text is wanted, by
//! [`OutputCapture::discard`] when it is not, and by dropping the capture
//! otherwise (which includes unwinding out of a panic). A channel can thus
//! never be left redirecting into a frame that nobody is going to read.
//!
//! For the common case of capturing everything a single function writes, use
//! [`catch_output`] and its variants.

use std::{
    fmt::{Debug, Formatter},
    io::{self, Write},
    ops::{Deref, DerefMut},
};

use diagshim_errors::output::Result;
use tracing::debug;

/// Where output ends up when no capture is open.
enum Sink {
    /// An in-memory sink, retaining everything written to it.
    Buffer(Vec<u8>),

    /// An arbitrary writer.
    Writer(Box<dyn Write>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Buffer(bytes) => bytes.write(buf),
            Self::Writer(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Buffer(_) => Ok(()),
            Self::Writer(writer) => writer.flush(),
        }
    }
}

/// The destination for the direct output of running code.
pub struct OutputChannel {
    /// The destination of writes made while no capture is open.
    sink: Sink,

    /// The frames of the currently open captures, innermost last.
    frames: Vec<Vec<u8>>,
}

impl OutputChannel {
    /// Creates a channel that writes through to `sink` when nothing is being
    /// captured.
    #[must_use]
    pub fn new(sink: impl Write + 'static) -> Self {
        Self::with_sink(Sink::Writer(Box::new(sink)))
    }

    /// Creates a channel that writes through to the process' standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Creates a channel backed by an in-memory buffer, whose contents can be
    /// retrieved with [`Self::written`].
    #[must_use]
    pub fn buffer() -> Self {
        Self::with_sink(Sink::Buffer(Vec::new()))
    }

    fn with_sink(sink: Sink) -> Self {
        let frames = Vec::new();
        Self { sink, frames }
    }

    /// Gets everything that reached the in-memory sink of a channel created by
    /// [`Self::buffer`], returning [`None`] for any other kind of channel.
    #[must_use]
    pub fn written(&self) -> Option<&[u8]> {
        match &self.sink {
            Sink::Buffer(bytes) => Some(bytes),
            Sink::Writer(_) => None,
        }
    }

    /// Writes `text` to the channel.
    ///
    /// # Errors
    ///
    /// - [`diagshim_errors::output::Error::Io`] if writing to the sink fails.
    pub fn print(&mut self, text: impl AsRef<str>) -> Result<()> {
        self.write_all(text.as_ref().as_bytes())?;
        Ok(())
    }

    /// Opens a new capture, redirecting all writes to the channel into it
    /// until it is closed.
    pub fn begin_capture(&mut self) -> OutputCapture<'_> {
        self.frames.push(Vec::new());
        let depth = self.frames.len();
        debug!(depth, "Began output capture");

        OutputCapture {
            channel: self,
            depth,
            released: false,
        }
    }

    /// Gets the number of captures currently open on the channel.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Checks whether any capture is currently open on the channel.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        !self.frames.is_empty()
    }
}

impl Default for OutputChannel {
    /// Returns a channel writing to standard output.
    fn default() -> Self {
        Self::stdout()
    }
}

impl Debug for OutputChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sink = match self.sink {
            Sink::Buffer(_) => "buffer",
            Sink::Writer(_) => "writer",
        };
        f.debug_struct("OutputChannel")
            .field("sink", &sink)
            .field("depth", &self.depth())
            .finish()
    }
}

impl Write for OutputChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => self.sink.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.is_capturing() {
            Ok(())
        } else {
            self.sink.flush()
        }
    }
}

/// A scoped redirection of an [`OutputChannel`] into memory.
///
/// The capture derefs to the channel it was opened on, so code that expects a
/// channel can be handed the capture directly.
#[derive(Debug)]
#[must_use = "dropping a capture immediately discards anything it would capture"]
pub struct OutputCapture<'a> {
    channel: &'a mut OutputChannel,

    /// The number of frames on the channel once this capture's frame was
    /// pushed.
    depth: usize,

    released: bool,
}

impl OutputCapture<'_> {
    /// Closes the capture, returning everything written while it was open.
    ///
    /// # Errors
    ///
    /// - [`diagshim_errors::output::Error::NonUtf8Output`] if the captured
    ///   bytes are not valid UTF-8. The frame is released regardless.
    pub fn finish(mut self) -> Result<String> {
        let bytes = self.release();
        debug!(depth = self.depth, len = bytes.len(), "Finished output capture");
        Ok(String::from_utf8(bytes)?)
    }

    /// Closes the capture, throwing away everything written while it was open.
    pub fn discard(mut self) {
        let bytes = self.release();
        debug!(depth = self.depth, len = bytes.len(), "Discarded output capture");
    }

    /// Pops this capture's frame off the channel.
    ///
    /// Any frame left above ours belongs to a nested capture that was leaked
    /// rather than closed, and is discarded along with it.
    fn release(&mut self) -> Vec<u8> {
        self.released = true;
        self.channel.frames.truncate(self.depth);
        self.channel.frames.pop().unwrap_or_default()
    }
}

impl Deref for OutputCapture<'_> {
    type Target = OutputChannel;

    fn deref(&self) -> &Self::Target {
        &*self.channel
    }
}

impl DerefMut for OutputCapture<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.channel
    }
}

impl Write for OutputCapture<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel.flush()
    }
}

impl Drop for OutputCapture<'_> {
    fn drop(&mut self) {
        if !self.released {
            let bytes = self.release();
            debug!(depth = self.depth, len = bytes.len(), "Dropped output capture");
        }
    }
}

/// Runs `f` while capturing its output on `channel`, returning what it wrote.
///
/// The value that `f` succeeds with is discarded. If `f` fails, the failure is
/// returned unchanged and whatever `f` wrote before failing is discarded. The
/// channel is restored to the state it was in before the call on every exit
/// path, including when `f` panics.
///
/// ```
/// use std::io::Write;
///
/// use diagshim::{catch_output, errors::output, OutputChannel};
///
/// let mut channel = OutputChannel::buffer();
/// let text = catch_output(&mut channel, |out| -> output::Result<()> {
///     write!(out, "abc")?;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(text, "abc");
/// assert_eq!(channel.written(), Some(&b""[..]));
/// ```
///
/// # Errors
///
/// - `E` if `f` fails.
/// - `E` converted from [`diagshim_errors::output::Error::NonUtf8Output`] if
///   `f` wrote bytes that are not valid UTF-8.
pub fn catch_output<F, T, E>(channel: &mut OutputChannel, f: F) -> std::result::Result<String, E>
where
    F: FnOnce(&mut OutputChannel) -> std::result::Result<T, E>,
    E: From<diagshim_errors::output::Error>,
{
    catch_output_with(channel, |out, ()| f(out), ())
}

/// Runs `f` with the provided `args` while capturing its output on `channel`,
/// returning what it wrote.
///
/// The `args` are forwarded to `f` unchanged. Otherwise this behaves exactly
/// like [`catch_output`].
///
/// # Errors
///
/// - `E` if `f` fails.
/// - `E` converted from [`diagshim_errors::output::Error::NonUtf8Output`] if
///   `f` wrote bytes that are not valid UTF-8.
pub fn catch_output_with<A, F, T, E>(
    channel: &mut OutputChannel,
    f: F,
    args: A,
) -> std::result::Result<String, E>
where
    F: FnOnce(&mut OutputChannel, A) -> std::result::Result<T, E>,
    E: From<diagshim_errors::output::Error>,
{
    let mut capture = channel.begin_capture();
    f(&mut *capture, args)?;
    Ok(capture.finish()?)
}

#[cfg(test)]
mod test {
    use std::{
        io::Write,
        panic::{catch_unwind, AssertUnwindSafe},
    };

    use diagshim_errors::output;

    use crate::output::{catch_output, catch_output_with, OutputChannel};

    #[test]
    fn captures_exactly_what_was_written() -> anyhow::Result<()> {
        let mut channel = OutputChannel::buffer();
        let text = catch_output(&mut channel, |out| out.print("abc"))?;

        assert_eq!(text, "abc");
        assert_eq!(channel.depth(), 0);
        assert_eq!(channel.written(), Some(&b""[..]));

        Ok(())
    }

    #[test]
    fn forwards_arguments_and_discards_the_return_value() -> anyhow::Result<()> {
        let mut channel = OutputChannel::buffer();
        let mut seen = None;
        let text = catch_output_with(
            &mut channel,
            |out, (a, b): (i32, i32)| -> output::Result<&'static str> {
                seen = Some((a, b));
                write!(out, "{}", a + b)?;
                Ok("ignored")
            },
            (1, 2),
        )?;

        assert_eq!(seen, Some((1, 2)));
        assert_eq!(text, "3");

        Ok(())
    }

    #[test]
    fn output_outside_a_capture_reaches_the_sink() -> anyhow::Result<()> {
        let mut channel = OutputChannel::buffer();
        channel.print("before ")?;
        let text = catch_output(&mut channel, |out| out.print("inside"))?;
        channel.print("after")?;

        assert_eq!(text, "inside");
        assert_eq!(channel.written(), Some(&b"before after"[..]));

        Ok(())
    }

    #[test]
    fn nested_captures_only_see_their_own_output() -> anyhow::Result<()> {
        let mut channel = OutputChannel::buffer();
        let mut inner = String::new();
        let outer = catch_output(&mut channel, |out| -> output::Result<()> {
            out.print("a")?;
            inner = catch_output(out, |out| out.print("b"))?;
            assert_eq!(out.depth(), 1);
            out.print("c")
        })?;

        assert_eq!(inner, "b");
        assert_eq!(outer, "ac");
        assert_eq!(channel.depth(), 0);

        Ok(())
    }

    #[test]
    fn failures_release_the_capture_and_propagate() {
        let mut channel = OutputChannel::buffer();
        let result = catch_output(&mut channel, |out| -> anyhow::Result<()> {
            out.print("partial")?;
            anyhow::bail!("the function failed")
        });

        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "the function failed");
        assert_eq!(channel.depth(), 0);
        assert_eq!(channel.written(), Some(&b""[..]));
    }

    #[test]
    fn panics_release_the_capture() {
        let mut channel = OutputChannel::buffer();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            catch_output(&mut channel, |out| -> output::Result<()> {
                out.print("doomed")?;
                panic!("the function panicked")
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(channel.depth(), 0);
        assert!(!channel.is_capturing());
    }

    #[test]
    fn captures_can_be_driven_by_hand() -> anyhow::Result<()> {
        let mut channel = OutputChannel::buffer();

        let mut capture = channel.begin_capture();
        capture.print("kept")?;
        let kept = capture.finish()?;

        let mut capture = channel.begin_capture();
        capture.print("thrown away")?;
        capture.discard();

        {
            let mut capture = channel.begin_capture();
            capture.print("dropped")?;
        }

        assert_eq!(kept, "kept");
        assert_eq!(channel.depth(), 0);
        assert_eq!(channel.written(), Some(&b""[..]));

        Ok(())
    }

    #[test]
    fn leaked_inner_captures_are_cleaned_up_by_the_outer_one() -> anyhow::Result<()> {
        let mut channel = OutputChannel::buffer();
        let mut outer = channel.begin_capture();
        outer.print("outer")?;
        std::mem::forget(outer.begin_capture());
        assert_eq!(outer.depth(), 2);

        let text = outer.finish()?;

        assert_eq!(text, "outer");
        assert_eq!(channel.depth(), 0);

        Ok(())
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut channel = OutputChannel::buffer();
        let result = catch_output(&mut channel, |out| {
            out.write_all(&[0xff, 0xfe]).map_err(output::Error::from)
        });

        let error = result.unwrap_err();
        assert_eq!(error.captured_bytes(), Some(&[0xff, 0xfe][..]));
        assert_eq!(channel.depth(), 0);
    }
}
