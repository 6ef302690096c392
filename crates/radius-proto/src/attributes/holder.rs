//! Attribute container capability
//!
//! Implemented by [`Packet`](crate::Packet) for packet-level attributes and
//! by [`VendorSpecificAttribute`](super::VendorSpecificAttribute) for its
//! sub-attributes.

use super::attribute::RadiusAttribute;
use super::error::AttributeResult;
use std::collections::BTreeMap;

/// A container of attributes with add/remove/lookup
pub trait AttributeHolder {
    /// Directly held attributes, in order
    fn attributes(&self) -> &[RadiusAttribute];

    /// Append an attribute, validating it against the container
    fn add_attribute(&mut self, attribute: RadiusAttribute) -> AttributeResult<()>;

    /// Remove the first attribute equal to `attribute`
    ///
    /// Returns whether anything was removed.
    fn remove_attribute(&mut self, attribute: &RadiusAttribute) -> AttributeResult<bool>;

    /// Held attributes plus the sub-attributes of any Vendor-Specific
    /// containers among them
    fn flattened_attributes(&self) -> Vec<&RadiusAttribute> {
        let mut flattened = Vec::with_capacity(self.attributes().len());
        for attribute in self.attributes() {
            flattened.push(attribute);
            if let RadiusAttribute::VendorSpecific(vsa) = attribute {
                flattened.extend(vsa.attributes());
            }
        }
        flattened
    }

    /// First attribute with the given vendor ID and type
    fn find_attribute(&self, vendor_id: u32, attr_type: u8) -> Option<&RadiusAttribute> {
        self.flattened_attributes()
            .into_iter()
            .find(|a| a.vendor_id() == vendor_id && a.attr_type() == attr_type)
    }

    /// All attributes with the given vendor ID and type
    fn find_all_attributes(&self, vendor_id: u32, attr_type: u8) -> Vec<&RadiusAttribute> {
        self.flattened_attributes()
            .into_iter()
            .filter(|a| a.vendor_id() == vendor_id && a.attr_type() == attr_type)
            .collect()
    }

    /// First attribute whose dictionary name matches
    fn find_attribute_by_name(&self, name: &str) -> Option<&RadiusAttribute> {
        self.flattened_attributes()
            .into_iter()
            .find(|a| a.name() == name)
    }

    /// All attributes whose dictionary name matches
    fn find_all_attributes_by_name(&self, name: &str) -> Vec<&RadiusAttribute> {
        self.flattened_attributes()
            .into_iter()
            .filter(|a| a.name() == name)
            .collect()
    }

    /// Remove every attribute with the given vendor ID and type
    fn remove_attributes(&mut self, vendor_id: u32, attr_type: u8) -> AttributeResult<usize> {
        let matching: Vec<RadiusAttribute> = self
            .find_all_attributes(vendor_id, attr_type)
            .into_iter()
            .cloned()
            .collect();

        let mut removed = 0;
        for attribute in &matching {
            if self.remove_attribute(attribute)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Name to value string, for diagnostics; later duplicates win
    fn attribute_map(&self) -> BTreeMap<String, String> {
        self.flattened_attributes()
            .into_iter()
            .filter(|a| !matches!(a, RadiusAttribute::VendorSpecific(_)))
            .map(|a| (a.name().into_owned(), a.value_string()))
            .collect()
    }
}
