//! RADIUS attribute type system and packet codec
//!
//! This crate implements the attribute layer of RFC 2865, 2866 and 2869:
//! typed attribute-value pairs, the recursive Vendor-Specific container and
//! the 20-byte packet header framing. Attribute semantics (names, data kinds,
//! named constants) come from a caller-supplied [`Dictionary`].
//!
//! Authenticator computation and password hiding are not part of this crate;
//! packets carry whatever authenticator the caller provides.
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{
//!     AttributeHolder, Code, MemoryDictionary, Packet, RadiusAttribute,
//!     generate_request_authenticator, NO_VENDOR,
//! };
//!
//! let dictionary = MemoryDictionary::standard();
//! let mut packet = Packet::new(Code::AccessRequest, 1, generate_request_authenticator());
//!
//! packet
//!     .add_attribute(RadiusAttribute::from_name(&dictionary, "User-Name", "alice").unwrap())
//!     .unwrap();
//! packet
//!     .add_attribute(RadiusAttribute::from_name(&dictionary, "Service-Type", "Framed-User").unwrap())
//!     .unwrap();
//!
//! let bytes = packet.encode().unwrap();
//! let decoded = Packet::decode(&dictionary, &bytes).unwrap();
//! let service = decoded.find_attribute(NO_VENDOR, 6).unwrap();
//! assert_eq!(service.value_string(), "Framed-User");
//! ```

pub mod attributes;
pub mod dictionary;
pub mod packet;

pub use attributes::{
    AttributeError, AttributeHolder, AttributeKind, AttributeResult, AttributeTemplate,
    AttributeType, IntegerAttribute, IpAttribute, OctetsAttribute, RadiusAttribute,
    StringAttribute, VendorSpecificAttribute,
};
pub use dictionary::{Dictionary, MemoryDictionary, NO_VENDOR};
pub use packet::{Code, Packet, PacketError, generate_request_authenticator};
