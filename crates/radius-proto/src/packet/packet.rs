use super::Code;
use crate::attributes::codec;
use crate::attributes::{AttributeError, AttributeHolder, RadiusAttribute, VendorSpecificAttribute};
use crate::dictionary::{Dictionary, NO_VENDOR};
use std::fmt;
use std::io::{self, Cursor, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("Invalid packet length: {0}")]
    InvalidLength(usize),
    #[error("Invalid packet code: {0}")]
    InvalidCode(u8),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),
}

/// RADIUS Packet structure as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// The authenticator is carried as given; computing or verifying it is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub code: Code,
    /// Matches requests with responses (1 byte)
    pub identifier: u8,
    pub authenticator: [u8; 16],
    attributes: Vec<RadiusAttribute>,
}

impl Packet {
    /// Code, identifier, length and authenticator
    pub const HEADER_SIZE: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes as per RFC 2865)
    pub const MAX_PACKET_SIZE: usize = 4096;

    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Packet {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
        }
    }

    /// Peek at the identifier of an encoded packet without decoding it
    pub fn peek_identifier(data: &[u8]) -> Option<u8> {
        if data.len() < Self::HEADER_SIZE {
            return None;
        }
        Some(data[1])
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let mut buffer = Vec::with_capacity(Self::HEADER_SIZE);
        buffer.push(self.code.as_u8());
        buffer.push(self.identifier);
        buffer.extend_from_slice(&[0, 0]); // length, patched below
        buffer.extend_from_slice(&self.authenticator);
        buffer.extend_from_slice(&codec::encode_all(&self.attributes)?);

        let total_length = buffer.len();
        if total_length > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(total_length));
        }
        buffer[2..4].copy_from_slice(&(total_length as u16).to_be_bytes());

        Ok(buffer)
    }

    /// Decode packet from bytes, resolving attributes through `dictionary`
    ///
    /// Bytes beyond the length declared in the header are ignored, as
    /// RFC 2865 requires.
    pub fn decode(dictionary: &dyn Dictionary, data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < Self::HEADER_SIZE {
            return Err(PacketError::InvalidLength(data.len()));
        }

        let mut cursor = Cursor::new(data);

        let mut header = [0u8; 4];
        cursor.read_exact(&mut header)?;
        let code = Code::from_u8(header[0]).ok_or(PacketError::InvalidCode(header[0]))?;
        let identifier = header[1];
        let length = u16::from_be_bytes([header[2], header[3]]) as usize;

        if !(Self::HEADER_SIZE..=Self::MAX_PACKET_SIZE).contains(&length) || data.len() < length {
            return Err(PacketError::InvalidLength(length));
        }

        let mut authenticator = [0u8; 16];
        cursor.read_exact(&mut authenticator)?;

        let attributes = codec::decode_all(dictionary, NO_VENDOR, &data[..length], Self::HEADER_SIZE)?;

        Ok(Packet {
            code,
            identifier,
            authenticator,
            attributes,
        })
    }

    /// Length of the encoded packet
    pub fn length(&self) -> Result<usize, PacketError> {
        Ok(self.encode()?.len())
    }
}

impl AttributeHolder for Packet {
    fn attributes(&self) -> &[RadiusAttribute] {
        &self.attributes
    }

    /// Add an attribute; vendor sub-attributes are wrapped in a new
    /// Vendor-Specific container for their vendor
    fn add_attribute(&mut self, attribute: RadiusAttribute) -> Result<(), AttributeError> {
        let vendor_id = attribute.vendor_id();
        if vendor_id == NO_VENDOR || attribute.as_vendor_specific().is_some() {
            self.attributes.push(attribute);
            return Ok(());
        }

        let mut vsa = VendorSpecificAttribute::for_attribute(&attribute);
        vsa.add_attribute(attribute)?;
        self.attributes.push(RadiusAttribute::VendorSpecific(vsa));
        Ok(())
    }

    /// Remove an attribute; vendor sub-attributes are removed from their
    /// container, and a container left empty is dropped
    fn remove_attribute(&mut self, attribute: &RadiusAttribute) -> Result<bool, AttributeError> {
        let vendor_id = attribute.vendor_id();
        if vendor_id == NO_VENDOR || attribute.as_vendor_specific().is_some() {
            return Ok(match self.attributes.iter().position(|a| a == attribute) {
                Some(index) => {
                    self.attributes.remove(index);
                    true
                }
                None => false,
            });
        }

        for index in 0..self.attributes.len() {
            let Some(vsa) = self.attributes[index].as_vendor_specific_mut() else {
                continue;
            };
            if vsa.vendor_id() != vendor_id || !vsa.remove_attribute(attribute)? {
                continue;
            }
            if vsa.is_empty() {
                self.attributes.remove(index);
            }
            return Ok(true);
        }
        Ok(false)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}, ID {}", self.code, self.identifier)?;
        for attribute in &self.attributes {
            write!(f, "\n{}", attribute)?;
        }
        Ok(())
    }
}

/// Random Request Authenticator for a new request
///
/// RFC 2865 asks for an unpredictable value; this does not sign anything.
pub fn generate_request_authenticator() -> [u8; 16] {
    rand::random()
}
