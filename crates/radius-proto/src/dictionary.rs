//! Dictionary lookup interface
//!
//! Attribute construction and decoding consult a [`Dictionary`] to resolve the
//! data kind, display name and named constants of an attribute. The dictionary
//! is passed explicitly to every constructor and codec call and is only ever
//! read, so one instance can be shared by any number of concurrent requests.
//!
//! Loading dictionaries from files is left to the embedding application;
//! [`MemoryDictionary`] is a programmatic implementation for that purpose.

use crate::attributes::template::AttributeTemplate;
use crate::attributes::types::AttributeType;
use std::collections::HashMap;
use std::sync::Arc;

/// Vendor ID used for standard (non vendor-specific) attributes
pub const NO_VENDOR: u32 = 0;

/// Read-only registry of attribute templates and vendor names
pub trait Dictionary: Send + Sync {
    /// Template for the given vendor ID and attribute type
    fn attribute_template(&self, vendor_id: u32, attr_type: u8) -> Option<Arc<AttributeTemplate>>;

    /// Template for the given attribute name
    fn attribute_template_by_name(&self, name: &str) -> Option<Arc<AttributeTemplate>>;

    /// Name of the vendor with the given ID
    fn vendor_name(&self, vendor_id: u32) -> Option<&str>;

    /// ID of the vendor with the given name
    fn vendor_id(&self, vendor_name: &str) -> Option<u32>;
}

/// In-memory dictionary populated through a builder API
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    templates: HashMap<(u32, u8), Arc<AttributeTemplate>>,
    names: HashMap<String, Arc<AttributeTemplate>>,
    vendors: HashMap<u32, String>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary containing every [`AttributeType`] plus common named constants
    pub fn standard() -> Self {
        let mut dictionary = MemoryDictionary::new();

        for attr_type in AttributeType::ALL {
            let template = AttributeTemplate::new(
                NO_VENDOR,
                attr_type.as_u8(),
                attr_type.name(),
                attr_type.kind(),
            );
            let template = match attr_type {
                AttributeType::ServiceType => template
                    .with_enumeration("Login-User", 1)
                    .with_enumeration("Framed-User", 2)
                    .with_enumeration("Callback-Login-User", 3)
                    .with_enumeration("Callback-Framed-User", 4)
                    .with_enumeration("Outbound-User", 5)
                    .with_enumeration("Administrative-User", 6)
                    .with_enumeration("NAS-Prompt-User", 7)
                    .with_enumeration("Authenticate-Only", 8)
                    .with_enumeration("Call-Check", 10),
                AttributeType::FramedProtocol => template
                    .with_enumeration("PPP", 1)
                    .with_enumeration("SLIP", 2)
                    .with_enumeration("ARAP", 3)
                    .with_enumeration("Gandalf-SLML", 4)
                    .with_enumeration("Xylogics-IPX-SLIP", 5)
                    .with_enumeration("X.75-Synchronous", 6),
                AttributeType::AcctStatusType => template
                    .with_enumeration("Start", 1)
                    .with_enumeration("Stop", 2)
                    .with_enumeration("Interim-Update", 3)
                    .with_enumeration("Accounting-On", 7)
                    .with_enumeration("Accounting-Off", 8),
                AttributeType::AcctAuthentic => template
                    .with_enumeration("RADIUS", 1)
                    .with_enumeration("Local", 2)
                    .with_enumeration("Remote", 3),
                AttributeType::NasPortType => template
                    .with_enumeration("Async", 0)
                    .with_enumeration("Sync", 1)
                    .with_enumeration("ISDN", 2)
                    .with_enumeration("Virtual", 5)
                    .with_enumeration("Ethernet", 15)
                    .with_enumeration("Wireless-802.11", 19),
                _ => template,
            };
            dictionary.add_template(template);
        }

        dictionary
    }

    /// Register a vendor name
    pub fn add_vendor(&mut self, vendor_id: u32, name: impl Into<String>) -> &mut Self {
        self.vendors.insert(vendor_id, name.into());
        self
    }

    /// Register an attribute template, replacing any previous definition
    /// for the same vendor ID and type
    pub fn add_template(&mut self, template: AttributeTemplate) -> &mut Self {
        let template = Arc::new(template);
        if let Some(previous) = self
            .templates
            .insert((template.vendor_id(), template.attr_type()), Arc::clone(&template))
        {
            self.names.remove(previous.name());
        }
        self.names.insert(template.name().to_string(), template);
        self
    }

    /// Builder-style [`add_vendor`](Self::add_vendor)
    pub fn with_vendor(mut self, vendor_id: u32, name: impl Into<String>) -> Self {
        self.add_vendor(vendor_id, name);
        self
    }

    /// Builder-style [`add_template`](Self::add_template)
    pub fn with_template(mut self, template: AttributeTemplate) -> Self {
        self.add_template(template);
        self
    }

    /// Number of registered attribute templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Dictionary for MemoryDictionary {
    fn attribute_template(&self, vendor_id: u32, attr_type: u8) -> Option<Arc<AttributeTemplate>> {
        self.templates.get(&(vendor_id, attr_type)).cloned()
    }

    fn attribute_template_by_name(&self, name: &str) -> Option<Arc<AttributeTemplate>> {
        self.names.get(name).cloned()
    }

    fn vendor_name(&self, vendor_id: u32) -> Option<&str> {
        self.vendors.get(&vendor_id).map(String::as_str)
    }

    fn vendor_id(&self, vendor_name: &str) -> Option<u32> {
        self.vendors
            .iter()
            .find(|(_, name)| name.as_str() == vendor_name)
            .map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::template::AttributeKind;

    #[test]
    fn test_standard_dictionary_lookup() {
        let dictionary = MemoryDictionary::standard();
        assert_eq!(dictionary.len(), AttributeType::ALL.len());

        let template = dictionary.attribute_template(NO_VENDOR, 6).unwrap();
        assert_eq!(template.name(), "Service-Type");
        assert_eq!(template.kind(), AttributeKind::Integer);
        assert_eq!(template.enumeration_value("Framed-User"), Some(2));

        let by_name = dictionary.attribute_template_by_name("NAS-IP-Address").unwrap();
        assert_eq!(by_name.attr_type(), 4);
        assert_eq!(by_name.kind(), AttributeKind::IpAddr);

        assert!(dictionary.attribute_template(NO_VENDOR, 17).is_none());
        assert!(dictionary.attribute_template(9, 1).is_none());
    }

    #[test]
    fn test_vendor_registration() {
        let dictionary = MemoryDictionary::new()
            .with_vendor(9, "Cisco")
            .with_template(AttributeTemplate::new(9, 1, "Cisco-AVPair", AttributeKind::String));

        assert_eq!(dictionary.vendor_name(9), Some("Cisco"));
        assert_eq!(dictionary.vendor_id("Cisco"), Some(9));
        assert_eq!(dictionary.vendor_name(311), None);
        assert_eq!(
            dictionary.attribute_template(9, 1).unwrap().name(),
            "Cisco-AVPair"
        );
    }

    #[test]
    fn test_template_replacement_drops_old_name() {
        let mut dictionary = MemoryDictionary::new();
        dictionary.add_template(AttributeTemplate::new(0, 200, "Old-Name", AttributeKind::String));
        dictionary.add_template(AttributeTemplate::new(0, 200, "New-Name", AttributeKind::Integer));

        assert!(dictionary.attribute_template_by_name("Old-Name").is_none());
        assert_eq!(
            dictionary.attribute_template(0, 200).unwrap().kind(),
            AttributeKind::Integer
        );
        assert_eq!(dictionary.len(), 1);
    }
}
