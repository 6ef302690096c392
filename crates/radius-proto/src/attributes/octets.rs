use super::attribute::{check_value_length, display_name, resolve_vendor_name};
use super::codec::encode_tlv;
use super::error::{AttributeError, AttributeResult};
use super::template::AttributeTemplate;
use crate::dictionary::Dictionary;
use std::fmt;
use std::sync::Arc;

/// Attribute holding opaque octets
///
/// Also used for any attribute the dictionary does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetsAttribute {
    vendor_id: u32,
    attr_type: u8,
    template: Option<Arc<AttributeTemplate>>,
    /// Vendor name resolved when the attribute was built
    vendor_name: Option<Arc<str>>,
    value: Vec<u8>,
}

impl OctetsAttribute {
    pub fn new(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        value: impl Into<Vec<u8>>,
    ) -> AttributeResult<Self> {
        let value = value.into();
        check_value_length(value.len())?;
        Ok(OctetsAttribute {
            vendor_id,
            attr_type,
            template: dictionary.attribute_template(vendor_id, attr_type),
            vendor_name: resolve_vendor_name(dictionary, vendor_id),
            value,
        })
    }

    /// Parse a hex string, with or without a leading `0x`
    pub fn parse(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        text: &str,
    ) -> AttributeResult<Self> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        let value = hex::decode(digits).map_err(|e| {
            AttributeError::InvalidArgument(format!("Invalid hex value '{}': {}", text, e))
        })?;
        Self::new(dictionary, vendor_id, attr_type, value)
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

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_string(&self) -> String {
        format!("0x{}", hex::encode(&self.value))
    }

    pub fn to_bytes(&self) -> AttributeResult<Vec<u8>> {
        encode_tlv(self.attr_type, &self.value)
    }
}

impl fmt::Display for OctetsAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = display_name(self.template(), self.vendor_id, self.attr_type);
        write!(f, "{}: {}", name, self.value_string())
    }
}

/// Attribute holding text
///
/// Bytes are kept as received; invalid UTF-8 is replaced only when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringAttribute {
    vendor_id: u32,
    attr_type: u8,
    template: Option<Arc<AttributeTemplate>>,
    /// Vendor name resolved when the attribute was built
    vendor_name: Option<Arc<str>>,
    value: Vec<u8>,
}

impl StringAttribute {
    pub fn new(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        value: &str,
    ) -> AttributeResult<Self> {
        Self::from_bytes(dictionary, vendor_id, attr_type, value.as_bytes())
    }

    pub fn from_bytes(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        value: &[u8],
    ) -> AttributeResult<Self> {
        check_value_length(value.len())?;
        Ok(StringAttribute {
            vendor_id,
            attr_type,
            template: dictionary.attribute_template(vendor_id, attr_type),
            vendor_name: resolve_vendor_name(dictionary, vendor_id),
            value: value.to_vec(),
        })
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

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_string(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }

    pub fn to_bytes(&self) -> AttributeResult<Vec<u8>> {
        encode_tlv(self.attr_type, &self.value)
    }
}

impl fmt::Display for StringAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = display_name(self.template(), self.vendor_id, self.attr_type);
        write!(f, "{}: {}", name, self.value_string())
    }
}
