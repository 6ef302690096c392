use super::codec::{MAX_VALUE_LENGTH, VENDOR_SPECIFIC};
use super::error::{AttributeError, AttributeResult};
use super::integer::IntegerAttribute;
use super::ip::IpAttribute;
use super::octets::{OctetsAttribute, StringAttribute};
use super::template::{AttributeKind, AttributeTemplate};
use super::vendor_specific::VendorSpecificAttribute;
use crate::dictionary::{Dictionary, NO_VENDOR};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A single RADIUS attribute-value pair
///
/// The variant is chosen once, at construction, from the data kind the
/// dictionary declares for `(vendor ID, type)`. Attributes are immutable;
/// a different value means a new attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadiusAttribute {
    Octets(OctetsAttribute),
    String(StringAttribute),
    Integer(IntegerAttribute),
    Ip(IpAttribute),
    VendorSpecific(VendorSpecificAttribute),
}

impl RadiusAttribute {
    /// Build an attribute from its wire value
    ///
    /// Type 26 outside any vendor scope is decoded as a Vendor-Specific
    /// container. Otherwise the template kind selects the variant, falling
    /// back to opaque octets for unknown attributes.
    pub fn create(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        value: &[u8],
    ) -> AttributeResult<Self> {
        if vendor_id == NO_VENDOR && attr_type == VENDOR_SPECIFIC {
            return VendorSpecificAttribute::decode(dictionary, value).map(Self::VendorSpecific);
        }

        let kind = dictionary
            .attribute_template(vendor_id, attr_type)
            .map(|template| template.kind())
            .unwrap_or(AttributeKind::Octets);

        let attribute = match kind {
            AttributeKind::Integer => {
                Self::Integer(IntegerAttribute::from_bytes(dictionary, vendor_id, attr_type, value)?)
            }
            AttributeKind::IpAddr => {
                Self::Ip(IpAttribute::from_bytes(dictionary, vendor_id, attr_type, value)?)
            }
            AttributeKind::String => {
                Self::String(StringAttribute::from_bytes(dictionary, vendor_id, attr_type, value)?)
            }
            AttributeKind::Octets | AttributeKind::VendorSpecific => {
                Self::Octets(OctetsAttribute::new(dictionary, vendor_id, attr_type, value)?)
            }
        };
        Ok(attribute)
    }

    /// Build an attribute from its textual form
    ///
    /// Integers accept enumeration names or decimal numbers, IP addresses
    /// dotted-quad notation, and octets a hex string.
    pub fn parse(
        dictionary: &dyn Dictionary,
        vendor_id: u32,
        attr_type: u8,
        text: &str,
    ) -> AttributeResult<Self> {
        if vendor_id == NO_VENDOR && attr_type == VENDOR_SPECIFIC {
            return Err(AttributeError::InvalidArgument(
                "Vendor-Specific attributes cannot be parsed from text".to_string(),
            ));
        }

        let kind = dictionary
            .attribute_template(vendor_id, attr_type)
            .map(|template| template.kind())
            .unwrap_or(AttributeKind::Octets);

        let attribute = match kind {
            AttributeKind::Integer => {
                Self::Integer(IntegerAttribute::parse(dictionary, vendor_id, attr_type, text)?)
            }
            AttributeKind::IpAddr => {
                Self::Ip(IpAttribute::parse(dictionary, vendor_id, attr_type, text)?)
            }
            AttributeKind::String => {
                Self::String(StringAttribute::new(dictionary, vendor_id, attr_type, text)?)
            }
            AttributeKind::Octets | AttributeKind::VendorSpecific => {
                Self::Octets(OctetsAttribute::parse(dictionary, vendor_id, attr_type, text)?)
            }
        };
        Ok(attribute)
    }

    /// Build an attribute by dictionary name, e.g. `("Service-Type", "Framed-User")`
    pub fn from_name(dictionary: &dyn Dictionary, name: &str, text: &str) -> AttributeResult<Self> {
        let template = dictionary.attribute_template_by_name(name).ok_or_else(|| {
            AttributeError::InvalidArgument(format!("Unknown attribute name: {}", name))
        })?;
        Self::parse(dictionary, template.vendor_id(), template.attr_type(), text)
    }

    pub fn vendor_id(&self) -> u32 {
        match self {
            Self::Octets(a) => a.vendor_id(),
            Self::String(a) => a.vendor_id(),
            Self::Integer(a) => a.vendor_id(),
            Self::Ip(a) => a.vendor_id(),
            Self::VendorSpecific(a) => a.vendor_id(),
        }
    }

    pub fn attr_type(&self) -> u8 {
        match self {
            Self::Octets(a) => a.attr_type(),
            Self::String(a) => a.attr_type(),
            Self::Integer(a) => a.attr_type(),
            Self::Ip(a) => a.attr_type(),
            Self::VendorSpecific(_) => VENDOR_SPECIFIC,
        }
    }

    /// Dictionary name of the vendor, resolved at construction
    pub fn vendor_name(&self) -> Option<&str> {
        match self {
            Self::Octets(a) => a.vendor_name(),
            Self::String(a) => a.vendor_name(),
            Self::Integer(a) => a.vendor_name(),
            Self::Ip(a) => a.vendor_name(),
            Self::VendorSpecific(a) => a.vendor_name(),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Octets(_) => AttributeKind::Octets,
            Self::String(_) => AttributeKind::String,
            Self::Integer(_) => AttributeKind::Integer,
            Self::Ip(_) => AttributeKind::IpAddr,
            Self::VendorSpecific(_) => AttributeKind::VendorSpecific,
        }
    }

    /// Template resolved at construction, if the dictionary knew the attribute
    pub fn template(&self) -> Option<&AttributeTemplate> {
        match self {
            Self::Octets(a) => a.template(),
            Self::String(a) => a.template(),
            Self::Integer(a) => a.template(),
            Self::Ip(a) => a.template(),
            Self::VendorSpecific(_) => None,
        }
    }

    /// Display name: the template name, or a placeholder for unknown types
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::VendorSpecific(_) => Cow::Borrowed("Vendor-Specific"),
            _ => display_name(self.template(), self.vendor_id(), self.attr_type()),
        }
    }

    pub fn value_string(&self) -> String {
        match self {
            Self::Octets(a) => a.value_string(),
            Self::String(a) => a.value_string(),
            Self::Integer(a) => a.value_string(),
            Self::Ip(a) => a.value_string(),
            Self::VendorSpecific(a) => a.value_string(),
        }
    }

    /// Wire form, header included
    pub fn to_bytes(&self) -> AttributeResult<Vec<u8>> {
        match self {
            Self::Octets(a) => a.to_bytes(),
            Self::String(a) => a.to_bytes(),
            Self::Integer(a) => a.to_bytes(),
            Self::Ip(a) => a.to_bytes(),
            Self::VendorSpecific(a) => a.to_bytes(),
        }
    }

    pub fn as_integer(&self) -> Option<&IntegerAttribute> {
        match self {
            Self::Integer(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<&IpAttribute> {
        match self {
            Self::Ip(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_vendor_specific(&self) -> Option<&VendorSpecificAttribute> {
        match self {
            Self::VendorSpecific(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_vendor_specific_mut(&mut self) -> Option<&mut VendorSpecificAttribute> {
        match self {
            Self::VendorSpecific(a) => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for RadiusAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Octets(a) => fmt::Display::fmt(a, f),
            Self::String(a) => fmt::Display::fmt(a, f),
            Self::Integer(a) => fmt::Display::fmt(a, f),
            Self::Ip(a) => fmt::Display::fmt(a, f),
            Self::VendorSpecific(a) => fmt::Display::fmt(a, f),
        }
    }
}

impl From<OctetsAttribute> for RadiusAttribute {
    fn from(attribute: OctetsAttribute) -> Self {
        Self::Octets(attribute)
    }
}

impl From<StringAttribute> for RadiusAttribute {
    fn from(attribute: StringAttribute) -> Self {
        Self::String(attribute)
    }
}

impl From<IntegerAttribute> for RadiusAttribute {
    fn from(attribute: IntegerAttribute) -> Self {
        Self::Integer(attribute)
    }
}

impl From<IpAttribute> for RadiusAttribute {
    fn from(attribute: IpAttribute) -> Self {
        Self::Ip(attribute)
    }
}

impl From<VendorSpecificAttribute> for RadiusAttribute {
    fn from(attribute: VendorSpecificAttribute) -> Self {
        Self::VendorSpecific(attribute)
    }
}

pub(crate) fn check_value_length(length: usize) -> AttributeResult<()> {
    if length > MAX_VALUE_LENGTH {
        return Err(AttributeError::InvalidArgument(format!(
            "Attribute value too long: {} bytes (max {})",
            length, MAX_VALUE_LENGTH
        )));
    }
    Ok(())
}

pub(crate) fn resolve_vendor_name(dictionary: &dyn Dictionary, vendor_id: u32) -> Option<Arc<str>> {
    if vendor_id == NO_VENDOR {
        return None;
    }
    dictionary.vendor_name(vendor_id).map(Arc::from)
}

pub(crate) fn display_name(
    template: Option<&AttributeTemplate>,
    vendor_id: u32,
    attr_type: u8,
) -> Cow<'_, str> {
    match template {
        Some(template) => Cow::Borrowed(template.name()),
        None if vendor_id != NO_VENDOR => Cow::Owned(format!("Unknown-Sub-Attribute-{}", attr_type)),
        None => Cow::Owned(format!("Unknown-Attribute-{}", attr_type)),
    }
}
