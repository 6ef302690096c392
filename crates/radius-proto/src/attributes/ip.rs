use super::attribute::{display_name, resolve_vendor_name};
use super::codec::encode_tlv;
use super::error::{AttributeError, AttributeResult};
use super::template::AttributeTemplate;
use crate::dictionary::Dictionary;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Attribute holding an IPv4 address (4 octets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpAttribute {
    vendor_id: u32,
    attr_type: u8,
    template: Option<Arc<AttributeTemplate>>,
    /// Vendor name resolved when the attribute was built
    vendor_name: Option<Arc<str>>,
    address: Ipv4Addr,
}

impl IpAttribute {
    pub fn new(dictionary: &dyn Dictionary, vendor_id: u32, attr_type: u8, address: Ipv4Addr) -> Self {
        IpAttribute {
            vendor_id,
            attr_type,
            template: dictionary.attribute_template(vendor_id, attr_type),
            vendor_name: resolve_vendor_name(dictionary, vendor_id),
            address,
        }
    }

    pub fn from_bytes(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        data: &[u8],
    ) -> AttributeResult<Self> {
        let octets: [u8; 4] = data.try_into().map_err(|_| {
            AttributeError::InvalidArgument(format!(
                "IP address attribute value should be 4 octets, actual: {}",
                data.len()
            ))
        })?;
        Ok(Self::new(dictionary, vendor_id, attr_type, Ipv4Addr::from(octets)))
    }

    /// Parse dotted-quad notation
    pub fn parse(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        text: &str,
    ) -> AttributeResult<Self> {
        let address = text.parse::<Ipv4Addr>().map_err(|e| {
            AttributeError::InvalidArgument(format!("Invalid IPv4 address '{}': {}", text, e))
        })?;
        Ok(Self::new(dictionary, vendor_id, attr_type, address))
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

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Address as an unsigned 32-bit number, widened to 64 bits
    pub fn value_long(&self) -> u64 {
        u64::from(u32::from(self.address))
    }

    pub fn value_string(&self) -> String {
        self.address.to_string()
    }

    pub fn to_bytes(&self) -> AttributeResult<Vec<u8>> {
        encode_tlv(self.attr_type, &self.address.octets())
    }
}

impl fmt::Display for IpAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = display_name(self.template(), self.vendor_id, self.attr_type);
        write!(f, "{}: {}", name, self.value_string())
    }
}
