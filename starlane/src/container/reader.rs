//! Streaming container reader.

use std::io::{self, Read};

use crate::schema::{self, Message, MessageKind};

use super::header::{ContainerHeader, MAGIC, SIZE_PREFIX_LEN};
use super::ContainerError;

/// Record buffers grow in multiples of this many bytes.
pub const BUFFER_STEP: usize = 4096;

const INITIAL_BUFFER: usize = 256;

/// Reads the records of one container from any byte source.
///
/// The magic, header and kind are validated by [`open`](Self::open) before
/// any record is touched.
#[derive(Debug)]
pub struct ContainerReader<R> {
    source: R,
    kind: MessageKind,
    sizes: Vec<u32>,
    buffer: Vec<u8>,
}

impl<R: Read> ContainerReader<R> {
    pub fn open(mut source: R) -> Result<Self, ContainerError> {
        let mut magic = [0u8; 4];
        source.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ContainerError::BadMagic(magic));
        }

        let mut prefix = [0u8; SIZE_PREFIX_LEN];
        source.read_exact(&mut prefix)?;
        let header_len = ContainerHeader::parse_size_prefix(&prefix)?;

        let mut header_bytes = Vec::new();
        let read = source
            .by_ref()
            .take(u64::from(header_len))
            .read_to_end(&mut header_bytes)?;
        if read < header_len as usize {
            return Err(ContainerError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("container header truncated after {read} of {header_len} bytes"),
            )));
        }
        let header: ContainerHeader =
            schema::decode(&header_bytes).map_err(ContainerError::Header)?;
        let kind = header.message_kind()?;

        Ok(Self {
            source,
            kind,
            sizes: header.sizes,
            buffer: vec![0u8; INITIAL_BUFFER],
        })
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Number of records the header declares.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Current size of the reusable record buffer.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Decode every record in order, passing `(message, index)` to `consumer`.
    ///
    /// Stops at the first read, decode or consumer error. Returns the number
    /// of records consumed.
    pub fn read<E, F>(&mut self, mut consumer: F) -> Result<usize, E>
    where
        E: From<ContainerError>,
        F: FnMut(Message, usize) -> Result<(), E>,
    {
        for index in 0..self.sizes.len() {
            let message = self.next_record(index)?;
            consumer(message, index)?;
        }
        Ok(self.sizes.len())
    }

    /// Read every record into memory.
    pub fn load(&mut self) -> Result<Vec<Message>, ContainerError> {
        let mut messages = Vec::with_capacity(self.sizes.len());
        self.read(|message, _| {
            messages.push(message);
            Ok::<(), ContainerError>(())
        })?;
        Ok(messages)
    }

    fn next_record(&mut self, index: usize) -> Result<Message, ContainerError> {
        let size = self.sizes[index];
        let len = size as usize;
        self.fill_buffer(len).map_err(|source| {
            tracing::debug!(entry = index + 1, error = %source, "Container read failed");
            ContainerError::ShortRead {
                index,
                expected: size,
                source,
            }
        })?;

        Message::decode(self.kind, &self.buffer[..len])
            .map_err(|source| ContainerError::Record { index, source })
    }

    /// Read `len` bytes into the front of the buffer.
    ///
    /// The buffer grows one step at a time and only once the bytes already
    /// read have filled it, so a declared size never allocates ahead of the
    /// data actually present.
    fn fill_buffer(&mut self, len: usize) -> io::Result<()> {
        let target = len.div_ceil(BUFFER_STEP) * BUFFER_STEP;
        let mut filled = 0;
        while filled < len {
            if filled == self.buffer.len() {
                let grown = (self.buffer.len() / BUFFER_STEP + 1) * BUFFER_STEP;
                self.buffer.resize(grown.min(target), 0);
            }
            let end = len.min(self.buffer.len());
            match self.source.read(&mut self.buffer[filled..end]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "unexpected end of container",
                    ))
                }
                Ok(read) => filled += read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
