//! Container writer.

use std::io::Write;

use crate::schema::{self, Message, MessageKind, SchemaMessage};

use super::header::{ContainerHeader, MAGIC};
use super::ContainerError;

/// Collects encoded records of one kind and writes them as a container.
#[derive(Debug, Clone)]
pub struct ContainerWriter {
    kind: MessageKind,
    records: Vec<Vec<u8>>,
}

impl ContainerWriter {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push<M: SchemaMessage>(&mut self, message: &M) -> Result<(), ContainerError> {
        self.check_kind(M::KIND)?;
        self.append(message.encode())
    }

    pub fn push_message(&mut self, message: &Message) -> Result<(), ContainerError> {
        self.check_kind(message.kind())?;
        self.append(message.encode())
    }

    /// Write magic, header and records to `sink`.
    pub fn write_to<W: Write>(&self, mut sink: W) -> Result<(), ContainerError> {
        let sizes = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| record_size(index, record.len()))
            .collect::<Result<Vec<_>, _>>()?;
        let header = schema::encode(&ContainerHeader::new(self.kind, sizes))
            .map_err(ContainerError::Header)?;

        sink.write_all(MAGIC)?;
        sink.write_all(&ContainerHeader::size_prefix(header.len())?)?;
        sink.write_all(&header)?;
        for record in &self.records {
            sink.write_all(record)?;
        }
        sink.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ContainerError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    fn check_kind(&self, found: MessageKind) -> Result<(), ContainerError> {
        if found == self.kind {
            Ok(())
        } else {
            Err(ContainerError::KindMismatch {
                expected: self.kind,
                found,
            })
        }
    }

    fn append(&mut self, encoded: Result<Vec<u8>, schema::CodecError>) -> Result<(), ContainerError> {
        let index = self.records.len();
        let record = encoded.map_err(|source| ContainerError::Record { index, source })?;
        self.records.push(record);
        Ok(())
    }
}

fn record_size(index: usize, len: usize) -> Result<u32, ContainerError> {
    u32::try_from(len).map_err(|_| ContainerError::RecordTooLarge { index, len })
}
