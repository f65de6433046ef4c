//! Wire schema: typed messages and their binary codec.
//!
//! Messages are plain serde structs encoded with bincode. The same encoding
//! is used for store values and container records. [`Message`] is the tagged
//! union the import path dispatches on.

mod codec;
mod messages;

pub use codec::{decode, decode_json, encode, encode_json, CodecError};
pub use messages::{
    CommodityMessage, FacilityListingMessage, FacilityMessage, ListingMessage, Message,
    MessageKind, SchemaMessage, SystemMessage,
};
