//! RADIUS attribute type system
//!
//! Attributes are decoded through a [`Dictionary`](crate::Dictionary) that
//! decides how the value octets of each `(vendor ID, type)` pair are
//! interpreted. See [`codec`] for the wire format.

pub mod attribute;
pub mod codec;
pub mod error;
pub mod holder;
pub mod integer;
pub mod ip;
pub mod octets;
pub mod template;
pub mod types;
pub mod vendor_specific;

pub use attribute::RadiusAttribute;
pub use error::{AttributeError, AttributeResult};
pub use holder::AttributeHolder;
pub use integer::IntegerAttribute;
pub use ip::IpAttribute;
pub use octets::{OctetsAttribute, StringAttribute};
pub use template::{AttributeKind, AttributeTemplate};
pub use types::AttributeType;
pub use vendor_specific::VendorSpecificAttribute;
