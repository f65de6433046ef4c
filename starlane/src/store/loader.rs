//! Typed loaders and load results.

use serde::de::DeserializeOwned;
use std::str::FromStr;
use thiserror::Error;

use crate::error::RegistryError;
use crate::schema::{self, CodecError};

/// Encoding of the values in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderFormat {
    /// bincode schema messages.
    #[default]
    Schema,
    Json,
}

impl FromStr for LoaderFormat {
    type Err = RegistryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gom" | "proto" | "schema" => Ok(LoaderFormat::Schema),
            "json" => Ok(LoaderFormat::Json),
            _ => Err(RegistryError::UnknownLoader(name.to_string())),
        }
    }
}

type Decoder<T> = fn(&[u8]) -> Result<T, CodecError>;

/// Decodes stored bytes into `T` and hands each value to a callback.
pub struct TypedLoader<'a, T> {
    decode: Decoder<T>,
    callback: Box<dyn FnMut(T) -> Result<(), RegistryError> + 'a>,
}

impl<'a, T: DeserializeOwned> TypedLoader<'a, T> {
    pub fn new(
        decode: Decoder<T>,
        callback: impl FnMut(T) -> Result<(), RegistryError> + 'a,
    ) -> Self {
        Self {
            decode,
            callback: Box::new(callback),
        }
    }

    /// Loader for bincode schema values.
    pub fn schema(callback: impl FnMut(T) -> Result<(), RegistryError> + 'a) -> Self {
        Self::new(schema::decode::<T>, callback)
    }

    pub fn json(callback: impl FnMut(T) -> Result<(), RegistryError> + 'a) -> Self {
        Self::new(schema::decode_json::<T>, callback)
    }

    pub fn with_format(
        format: LoaderFormat,
        callback: impl FnMut(T) -> Result<(), RegistryError> + 'a,
    ) -> Self {
        match format {
            LoaderFormat::Schema => Self::schema(callback),
            LoaderFormat::Json => Self::json(callback),
        }
    }

    /// Decode one stored value and pass it on.
    pub fn load(&mut self, data: &[u8]) -> Result<(), RegistryError> {
        let value = (self.decode)(data)?;
        (self.callback)(value)
    }
}

/// Outcome of a completed table load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: String,
    pub loaded: usize,
    /// Records whose error was demoted by the filter.
    pub skipped: usize,
}

/// A table load stopped by a fatal record.
#[derive(Debug, Error)]
#[error("{table}: load aborted after {completed} records: {source}")]
pub struct LoadAborted {
    pub table: String,
    pub completed: usize,
    pub source: RegistryError,
}
