use crate::protocol::{WriteError, WriterState};
use bytes::{BufMut, BytesMut};
use std::io::Write;

use tokio_util::codec::Encoder;
use tracing::trace;

/// One unit of a chunked body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// A data chunk, framed as `<hex len>\r\n<data>\r\n`
    Data(&'a [u8]),
    /// The terminating zero-length chunk, `0\r\n`
    Last,
}

/// Frames body bytes with chunked transfer encoding.
///
/// The terminating chunk is written without the closing blank line: the
/// trailer section, even when empty, is responsible for that line. Once it
/// has been written every further chunk fails with [`WriteError::InvalidState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: usize,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Total payload bytes framed so far, excluding chunk framing.
    pub fn send_size(&self) -> usize {
        self.send_size
    }
}

impl Encoder<Chunk<'_>> for ChunkedEncoder {
    type Error = WriteError;

    fn encode(&mut self, item: Chunk<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            let operation = match item {
                Chunk::Data(_) => "write chunked body",
                Chunk::Last => "write chunked body done",
            };
            return Err(WriteError::invalid_state(operation, WriterState::Trailers));
        }

        match item {
            Chunk::Data(bytes) => {
                write!(helper::Writer(dst), "{:x}\r\n", bytes.len())?;
                dst.reserve(bytes.len() + 2);
                dst.put_slice(bytes);
                dst.put_slice(b"\r\n");
                self.send_size += bytes.len();
                Ok(())
            }
            Chunk::Last => {
                trace!(send_size = self.send_size, "finished chunked body");
                self.eof = true;
                dst.put_slice(b"0\r\n");
                Ok(())
            }
        }
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
