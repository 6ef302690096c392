use super::attribute::{display_name, resolve_vendor_name};
use super::codec::encode_tlv;
use super::error::{AttributeError, AttributeResult};
use super::template::AttributeTemplate;
use crate::dictionary::Dictionary;
use std::fmt;
use std::sync::Arc;

/// Attribute holding a 32-bit unsigned integer (4 octets, big-endian)
///
/// Named constants from the attribute's template are honoured both when
/// parsing text and when rendering the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerAttribute {
    vendor_id: u32,
    attr_type: u8,
    template: Option<Arc<AttributeTemplate>>,
    /// Vendor name resolved when the attribute was built
    vendor_name: Option<Arc<str>>,
    value: u32,
}

impl IntegerAttribute {
    /// Encoded size of the value
    pub const VALUE_LENGTH: usize = 4;

    pub fn new(dictionary: &dyn Dictionary, vendor_id: u32, attr_type: u8, value: u32) -> Self {
        IntegerAttribute {
            vendor_id,
            attr_type,
            template: dictionary.attribute_template(vendor_id, attr_type),
            vendor_name: resolve_vendor_name(dictionary, vendor_id),
            value,
        }
    }

    /// Build from wire octets; anything other than exactly 4 bytes is rejected
    pub fn from_bytes(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        data: &[u8],
    ) -> AttributeResult<Self> {
        let bytes: [u8; 4] = data.try_into().map_err(|_| {
            AttributeError::InvalidArgument(format!(
                "Integer attribute value should be {} octets, actual: {}",
                Self::VALUE_LENGTH,
                data.len()
            ))
        })?;
        Ok(Self::new(dictionary, vendor_id, attr_type, u32::from_be_bytes(bytes)))
    }

    /// Build from text: an enumeration name if the template defines one,
    /// otherwise an unsigned decimal number
    pub fn parse(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        text: &str,
    ) -> AttributeResult<Self> {
        let named = dictionary
            .attribute_template(vendor_id, attr_type)
            .and_then(|template| template.enumeration_value(text));

        let value = match named {
            Some(value) => value,
            None => text
                .parse::<u32>()
                .map_err(|_| AttributeError::InvalidInteger(text.to_string()))?,
        };

        Ok(Self::new(dictionary, vendor_id, attr_type, value))
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    pub fn attr_type(&self) -> u8 {
        self.attr_type
    }

    pub fn template(&self) -> Option<&AttributeTemplate> {
        self.template.as_deref()
    }

    /// Dictionary name of the owning vendor, if any
    pub fn vendor_name(&self) -> Option<&str> {
        self.vendor_name.as_deref()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Value reinterpreted as a signed 32-bit integer
    pub fn value_int(&self) -> i32 {
        self.value as i32
    }

    /// Value widened to 64 bits, never negative
    pub fn value_long(&self) -> u64 {
        u64::from(self.value)
    }

    pub fn value_string(&self) -> String {
        self.template()
            .and_then(|template| template.enumeration_name(self.value))
            .map(str::to_string)
            .unwrap_or_else(|| self.value.to_string())
    }

    pub fn to_bytes(&self) -> AttributeResult<Vec<u8>> {
        encode_tlv(self.attr_type, &self.value.to_be_bytes())
    }
}

impl fmt::Display for IntegerAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = display_name(self.template(), self.vendor_id, self.attr_type);
        write!(f, "{}: {}", name, self.value_string())
    }
}
