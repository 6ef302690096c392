//! Vendor-Specific attribute (type 26)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |  Length       |            Vendor-Id
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!      Vendor-Id (cont)           |  Sub-attributes ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//! ```

use super::attribute::RadiusAttribute;
use super::codec::{self, HEADER_LENGTH, VENDOR_SPECIFIC, is_valid_vendor_specific_length};
use super::error::{AttributeError, AttributeResult};
use super::holder::AttributeHolder;
use crate::dictionary::{Dictionary, NO_VENDOR};
use std::fmt;

/// Size of the vendor ID field
const VENDOR_ID_LENGTH: usize = 4;

/// Container for sub-attributes that all belong to one vendor
///
/// Equality compares the vendor ID and sub-attributes only.
#[derive(Debug, Clone)]
pub struct VendorSpecificAttribute {
    vendor_id: u32,
    vendor_name: Option<String>,
    attributes: Vec<RadiusAttribute>,
}

impl VendorSpecificAttribute {
    /// Create an empty container for an outbound packet
    pub fn new(dictionary: &dyn Dictionary, vendor_id: u32) -> AttributeResult<Self> {
        if vendor_id == NO_VENDOR {
            return Err(AttributeError::InvalidArgument(
                "Vendor-Specific attribute requires a non-zero vendor ID".to_string(),
            ));
        }

        Ok(VendorSpecificAttribute {
            vendor_id,
            vendor_name: dictionary.vendor_name(vendor_id).map(str::to_string),
            attributes: Vec::new(),
        })
    }

    /// Empty container for the vendor of `attribute`, taking the vendor
    /// name the attribute was resolved with
    pub(crate) fn for_attribute(attribute: &RadiusAttribute) -> Self {
        VendorSpecificAttribute {
            vendor_id: attribute.vendor_id(),
            vendor_name: attribute.vendor_name().map(str::to_string),
            attributes: Vec::new(),
        }
    }

    /// Decode the value octets of a Vendor-Specific attribute
    ///
    /// `data` excludes the outer type and length octets. The first four bytes
    /// carry the vendor ID; the rest are sub-attributes resolved against that
    /// vendor.
    pub fn decode(dictionary: &dyn Dictionary, data: &[u8]) -> AttributeResult<Self> {
        let length = HEADER_LENGTH + data.len();
        if !is_valid_vendor_specific_length(length) {
            return Err(AttributeError::Malformed(format!(
                "Vendor-Specific attribute length out of range: {} bytes (expected 7..=255)",
                length
            )));
        }

        let mut vendor_bytes = [0u8; VENDOR_ID_LENGTH];
        vendor_bytes.copy_from_slice(&data[..VENDOR_ID_LENGTH]);
        let vendor_id = u32::from_be_bytes(vendor_bytes);

        if vendor_id == NO_VENDOR {
            return Err(AttributeError::Malformed(
                "Vendor-Specific attribute carries vendor ID 0".to_string(),
            ));
        }

        let attributes = codec::decode_all(dictionary, vendor_id, data, VENDOR_ID_LENGTH)?;

        Ok(VendorSpecificAttribute {
            vendor_id,
            vendor_name: dictionary.vendor_name(vendor_id).map(str::to_string),
            attributes,
        })
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    /// Vendor name as known to the dictionary at construction
    pub fn vendor_name(&self) -> Option<&str> {
        self.vendor_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Render header, vendor ID and sub-attributes
    ///
    /// Fails if the result falls outside 7..=255 bytes.
    pub fn to_bytes(&self) -> AttributeResult<Vec<u8>> {
        let mut buffer = Vec::with_capacity(HEADER_LENGTH + VENDOR_ID_LENGTH);
        buffer.push(VENDOR_SPECIFIC);
        buffer.push(0); // length, patched below
        buffer.extend_from_slice(&self.vendor_id.to_be_bytes());

        for attribute in &self.attributes {
            buffer.extend_from_slice(&attribute.to_bytes()?);
        }

        let length = buffer.len();
        if !is_valid_vendor_specific_length(length) {
            return Err(AttributeError::VendorSpecificLength(length));
        }
        buffer[1] = length as u8;

        Ok(buffer)
    }

    /// Sub-attributes rendered as `Name: value`, comma separated
    pub fn value_string(&self) -> String {
        self.attributes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn check_vendor(&self, attribute: &RadiusAttribute) -> AttributeResult<()> {
        if attribute.vendor_id() != self.vendor_id {
            return Err(AttributeError::VendorMismatch {
                expected: self.vendor_id,
                actual: attribute.vendor_id(),
            });
        }
        Ok(())
    }
}

impl PartialEq for VendorSpecificAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.vendor_id == other.vendor_id && self.attributes == other.attributes
    }
}

impl Eq for VendorSpecificAttribute {}

impl AttributeHolder for VendorSpecificAttribute {
    fn attributes(&self) -> &[RadiusAttribute] {
        &self.attributes
    }

    /// Append a sub-attribute; duplicates are kept in insertion order
    fn add_attribute(&mut self, attribute: RadiusAttribute) -> AttributeResult<()> {
        self.check_vendor(&attribute)?;
        self.attributes.push(attribute);
        Ok(())
    }

    /// Remove the first sub-attribute equal to `attribute`
    fn remove_attribute(&mut self, attribute: &RadiusAttribute) -> AttributeResult<bool> {
        self.check_vendor(attribute)?;
        match self.attributes.iter().position(|a| a == attribute) {
            Some(index) => {
                self.attributes.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Display for VendorSpecificAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vendor-Specific: ")?;
        match &self.vendor_name {
            Some(name) => write!(f, "{} ({})", name, self.vendor_id)?,
            None => write!(f, "vendor ID {}", self.vendor_id)?,
        }
        for attribute in &self.attributes {
            write!(f, "\n  {}", attribute)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::template::{AttributeKind, AttributeTemplate};
    use crate::dictionary::MemoryDictionary;

    const WISPR: u32 = 14122;

    fn dictionary() -> MemoryDictionary {
        MemoryDictionary::standard()
            .with_vendor(WISPR, "WISPr")
            .with_template(AttributeTemplate::new(
                WISPR,
                1,
                "WISPr-Location-ID",
                AttributeKind::String,
            ))
            .with_template(AttributeTemplate::new(
                WISPR,
                7,
                "WISPr-Bandwidth-Min-Up",
                AttributeKind::Integer,
            ))
    }

    fn sub(dictionary: &MemoryDictionary, attr_type: u8, value: &str) -> RadiusAttribute {
        RadiusAttribute::parse(dictionary, WISPR, attr_type, value).unwrap()
    }

    #[test]
    fn test_new_rejects_vendor_zero() {
        let dictionary = dictionary();
        assert!(matches!(
            VendorSpecificAttribute::new(&dictionary, NO_VENDOR),
            Err(AttributeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_rejects_foreign_vendor() {
        let dictionary = dictionary();
        let mut vsa = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        let foreign = RadiusAttribute::parse(&dictionary, 9, 1, "00").unwrap();
        let standard = RadiusAttribute::parse(&dictionary, NO_VENDOR, 1, "bob").unwrap();

        assert_eq!(
            vsa.add_attribute(foreign.clone()),
            Err(AttributeError::VendorMismatch {
                expected: WISPR,
                actual: 9
            })
        );
        assert!(vsa.add_attribute(standard).is_err());
        assert_eq!(
            vsa.remove_attribute(&foreign),
            Err(AttributeError::VendorMismatch {
                expected: WISPR,
                actual: 9
            })
        );
        assert!(vsa.is_empty());
    }

    #[test]
    fn test_duplicates_preserved_and_removed_in_order() {
        let dictionary = dictionary();
        let mut vsa = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        let location = sub(&dictionary, 1, "office");
        let bandwidth = sub(&dictionary, 7, "1000");

        vsa.add_attribute(location.clone()).unwrap();
        vsa.add_attribute(bandwidth.clone()).unwrap();
        vsa.add_attribute(location.clone()).unwrap();
        assert_eq!(vsa.len(), 3);

        assert_eq!(vsa.remove_attribute(&location), Ok(true));
        assert_eq!(vsa.attributes(), &[bandwidth.clone(), location.clone()]);
        assert_eq!(vsa.remove_attribute(&sub(&dictionary, 1, "lab")), Ok(false));
    }

    #[test]
    fn test_encode_layout() {
        let dictionary = dictionary();
        let mut vsa = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        vsa.add_attribute(sub(&dictionary, 1, "ab")).unwrap();
        vsa.add_attribute(sub(&dictionary, 7, "5")).unwrap();

        let bytes = vsa.to_bytes().unwrap();
        assert_eq!(
            bytes,
            vec![26, 16, 0, 0, 0x37, 0x2a, 1, 4, b'a', b'b', 7, 6, 0, 0, 0, 5]
        );
    }

    #[test]
    fn test_decode_threads_vendor_id() {
        let dictionary = dictionary();
        let data = [0, 0, 0x37, 0x2a, 7, 6, 0, 0, 0, 9, 99, 3, 0xee];
        let vsa = VendorSpecificAttribute::decode(&dictionary, &data).unwrap();

        assert_eq!(vsa.vendor_id(), WISPR);
        assert_eq!(vsa.vendor_name(), Some("WISPr"));
        assert_eq!(vsa.len(), 2);
        assert_eq!(vsa.attributes()[0].vendor_id(), WISPR);
        assert_eq!(vsa.attributes()[0].kind(), AttributeKind::Integer);
        assert_eq!(vsa.attributes()[0].value_string(), "9");
        assert_eq!(vsa.attributes()[1].kind(), AttributeKind::Octets);
    }

    #[test]
    fn test_decode_rejects_vendor_zero_and_short_data() {
        let dictionary = dictionary();
        assert!(VendorSpecificAttribute::decode(&dictionary, &[0, 0, 0, 0, 1, 2]).is_err());
        assert!(VendorSpecificAttribute::decode(&dictionary, &[0, 0, 0x37, 0x2a]).is_err());
    }

    #[test]
    fn test_encode_length_bounds() {
        let dictionary = dictionary();

        let empty = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        assert_eq!(empty.to_bytes(), Err(AttributeError::VendorSpecificLength(6)));

        let mut smallest = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        smallest
            .add_attribute(RadiusAttribute::create(&dictionary, WISPR, 99, &[]).unwrap())
            .unwrap();
        assert_eq!(smallest.to_bytes().unwrap().len(), 8);

        let mut largest = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        largest
            .add_attribute(RadiusAttribute::create(&dictionary, WISPR, 99, &[0u8; 247]).unwrap())
            .unwrap();
        let bytes = largest.to_bytes().unwrap();
        assert_eq!(bytes.len(), 255);
        assert_eq!(bytes[1], 255);

        let mut too_large = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        too_large
            .add_attribute(RadiusAttribute::create(&dictionary, WISPR, 99, &[0u8; 248]).unwrap())
            .unwrap();
        assert_eq!(
            too_large.to_bytes(),
            Err(AttributeError::VendorSpecificLength(256))
        );
    }

    #[test]
    fn test_display() {
        let dictionary = dictionary();
        let mut vsa = VendorSpecificAttribute::new(&dictionary, WISPR).unwrap();
        vsa.add_attribute(sub(&dictionary, 1, "office")).unwrap();
        assert_eq!(
            vsa.to_string(),
            "Vendor-Specific: WISPr (14122)\n  WISPr-Location-ID: office"
        );

        let unnamed = VendorSpecificAttribute::new(&dictionary, 4242).unwrap();
        assert_eq!(unnamed.to_string(), "Vendor-Specific: vendor ID 4242");
    }
}
