//! Container header.

use serde::{Deserialize, Serialize};

use crate::schema::MessageKind;

use super::ContainerError;

/// Leading bytes of every container.
pub const MAGIC: &[u8; 4] = b"GOMD";

/// Width of the hex header-length field.
pub const SIZE_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHeader {
    /// [`MessageKind::code`] of every record.
    pub kind: u32,
    /// Byte length of each record, in order.
    pub sizes: Vec<u32>,
}

impl ContainerHeader {
    pub fn new(kind: MessageKind, sizes: Vec<u32>) -> Self {
        Self {
            kind: kind.code(),
            sizes,
        }
    }

    pub fn message_kind(&self) -> Result<MessageKind, ContainerError> {
        MessageKind::from_code(self.kind).ok_or(ContainerError::UnknownKind(self.kind))
    }

    /// The zero-padded hex length field for a header of `len` bytes.
    pub fn size_prefix(len: usize) -> Result<[u8; SIZE_PREFIX_LEN], ContainerError> {
        let len = u32::try_from(len).map_err(|_| ContainerError::HeaderTooLarge(len))?;
        let mut prefix = [0u8; SIZE_PREFIX_LEN];
        prefix.copy_from_slice(format!("{:08x}", len).as_bytes());
        Ok(prefix)
    }

    /// Parse the length field. Exactly eight hex digits, no sign.
    pub fn parse_size_prefix(prefix: &[u8; SIZE_PREFIX_LEN]) -> Result<u32, ContainerError> {
        let text = String::from_utf8_lossy(prefix);
        if !prefix.iter().all(u8::is_ascii_hexdigit) {
            return Err(ContainerError::BadSizePrefix(text.into_owned()));
        }
        u32::from_str_radix(&text, 16).map_err(|_| ContainerError::BadSizePrefix(text.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_prefix_is_zero_padded_hex() {
        assert_eq!(&ContainerHeader::size_prefix(0x1a2).unwrap(), b"000001a2");
        assert_eq!(ContainerHeader::parse_size_prefix(b"000001a2").unwrap(), 0x1a2);
        assert_eq!(ContainerHeader::parse_size_prefix(b"FFFFFFFF").unwrap(), u32::MAX);
    }

    #[test]
    fn test_bad_size_prefix() {
        let err = ContainerHeader::parse_size_prefix(b"00zz0001").unwrap_err();
        assert!(matches!(err, ContainerError::BadSizePrefix(ref s) if s == "00zz0001"));
    }

    #[test]
    fn test_signed_size_prefix_rejected() {
        for prefix in [b"+00001a2", b"-00001a2", b" 00001a2"] {
            let err = ContainerHeader::parse_size_prefix(prefix).unwrap_err();
            assert!(matches!(err, ContainerError::BadSizePrefix(_)), "{err}");
        }
    }

    #[test]
    fn test_unknown_kind() {
        let header = ContainerHeader {
            kind: 77,
            sizes: vec![],
        };
        assert!(matches!(
            header.message_kind(),
            Err(ContainerError::UnknownKind(77))
        ));
    }
}
