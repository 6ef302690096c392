//! Attribute TLV codec
//!
//! ```text
//!  0                   1                   2
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |    Length     |  Value ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Length covers the two header octets. A top-level attribute of type 26 is
//! a Vendor-Specific container whose value is a 4-octet vendor ID followed
//! by sub-attributes in this same format (RFC 2865 Section 5.26).

use super::attribute::RadiusAttribute;
use super::error::{AttributeError, AttributeResult};
use crate::dictionary::{Dictionary, NO_VENDOR};
use std::ops::RangeInclusive;

/// Attribute type of the Vendor-Specific container
pub const VENDOR_SPECIFIC: u8 = 26;
/// Type and length octets
pub const HEADER_LENGTH: usize = 2;
/// Largest encodable attribute, header included
pub const MAX_LENGTH: usize = 255;
/// Largest value carried by a single attribute
pub const MAX_VALUE_LENGTH: usize = MAX_LENGTH - HEADER_LENGTH;
/// Valid encoded lengths of a Vendor-Specific attribute: header, vendor ID
/// and at least one octet of sub-attribute data
pub const VENDOR_SPECIFIC_LENGTH: RangeInclusive<usize> = 7..=255;

/// Whether a rendered Vendor-Specific attribute length is representable
pub fn is_valid_vendor_specific_length(length: usize) -> bool {
    VENDOR_SPECIFIC_LENGTH.contains(&length)
}

/// Render a single TLV, computing the length octet from the value
pub fn encode_tlv(attr_type: u8, value: &[u8]) -> AttributeResult<Vec<u8>> {
    let length = HEADER_LENGTH + value.len();
    if length > MAX_LENGTH {
        return Err(AttributeError::EncodeOverflow {
            length,
            limit: MAX_LENGTH,
        });
    }

    let mut buffer = Vec::with_capacity(length);
    buffer.push(attr_type);
    buffer.push(length as u8);
    buffer.extend_from_slice(value);
    Ok(buffer)
}

/// Encode one attribute, recursing into Vendor-Specific containers
pub fn encode(attribute: &RadiusAttribute) -> AttributeResult<Vec<u8>> {
    attribute.to_bytes()
}

/// Encode a sequence of attributes back to back
pub fn encode_all<'a, I>(attributes: I) -> AttributeResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a RadiusAttribute>,
{
    let mut buffer = Vec::new();
    for attribute in attributes {
        buffer.extend_from_slice(&attribute.to_bytes()?);
    }
    Ok(buffer)
}

/// Decode the attribute starting at `offset`
///
/// Returns the attribute and the number of bytes it occupied. `vendor_id`
/// scopes the type lookup: [`NO_VENDOR`] for packet-level attributes, the
/// enclosing vendor for sub-attributes of a Vendor-Specific container.
pub fn decode(
    dictionary: &dyn Dictionary,
    vendor_id: u32,
    data: &[u8],
    offset: usize,
) -> AttributeResult<(RadiusAttribute, usize)> {
    let remaining = data.get(offset..).unwrap_or_default();
    if remaining.len() < HEADER_LENGTH {
        return Err(AttributeError::Malformed(format!(
            "Attribute header truncated: {} bytes at offset {}",
            remaining.len(),
            offset
        )));
    }

    let attr_type = remaining[0];
    let length = remaining[1] as usize;

    if length < HEADER_LENGTH {
        return Err(AttributeError::Malformed(format!(
            "Invalid attribute length {} for type {} at offset {}",
            length, attr_type, offset
        )));
    }

    if length > remaining.len() {
        return Err(AttributeError::Malformed(format!(
            "Attribute type {} declares {} bytes, only {} available at offset {}",
            attr_type,
            length,
            remaining.len(),
            offset
        )));
    }

    if vendor_id == NO_VENDOR
        && attr_type == VENDOR_SPECIFIC
        && !is_valid_vendor_specific_length(length)
    {
        return Err(AttributeError::Malformed(format!(
            "Vendor-Specific attribute length out of range: {} bytes (expected 7..=255)",
            length
        )));
    }

    let value = &remaining[HEADER_LENGTH..length];
    let attribute = RadiusAttribute::create(dictionary, vendor_id, attr_type, value)?;
    Ok((attribute, length))
}

/// Decode every attribute from `offset` to the end of `data`
///
/// Fails as a whole on the first malformed attribute.
pub fn decode_all(
    dictionary: &dyn Dictionary,
    vendor_id: u32,
    data: &[u8],
    mut offset: usize,
) -> AttributeResult<Vec<RadiusAttribute>> {
    let mut attributes = Vec::new();
    while offset < data.len() {
        let (attribute, consumed) = decode(dictionary, vendor_id, data, offset)?;
        attributes.push(attribute);
        offset += consumed;
    }
    Ok(attributes)
}
