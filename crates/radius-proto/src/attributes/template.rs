//! Attribute templates
//!
//! A template describes one `(vendor ID, attribute type)` definition: its
//! display name, the data kind used to interpret the value octets, and an
//! optional table of named integer constants.

use std::collections::BTreeMap;
use std::fmt;

/// Data kind declared for an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Opaque octets, rendered as hex
    Octets,
    /// Text
    String,
    /// 32-bit unsigned integer, big-endian
    Integer,
    /// IPv4 address
    IpAddr,
    /// Vendor-Specific container (type 26)
    VendorSpecific,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Octets => "octets",
            AttributeKind::String => "string",
            AttributeKind::Integer => "integer",
            AttributeKind::IpAddr => "ipaddr",
            AttributeKind::VendorSpecific => "vsa",
        };
        f.write_str(name)
    }
}

/// Definition of a single attribute, owned by a dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTemplate {
    vendor_id: u32,
    attr_type: u8,
    name: String,
    kind: AttributeKind,
    /// Integer constant -> name used for display
    value_names: BTreeMap<u32, String>,
    /// Every defined name, aliases included -> integer constant
    name_values: BTreeMap<String, u32>,
}

impl AttributeTemplate {
    pub fn new(vendor_id: u32, attr_type: u8, name: impl Into<String>, kind: AttributeKind) -> Self {
        AttributeTemplate {
            vendor_id,
            attr_type,
            name: name.into(),
            kind,
            value_names: BTreeMap::new(),
            name_values: BTreeMap::new(),
        }
    }

    /// Add a named constant for this attribute
    ///
    /// Several names may share a value; all of them parse, and the last
    /// one defined is used for display.
    pub fn with_enumeration(mut self, name: impl Into<String>, value: u32) -> Self {
        let name = name.into();
        self.name_values.insert(name.clone(), value);
        self.value_names.insert(value, name);
        self
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    pub fn attr_type(&self) -> u8 {
        self.attr_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Whether any named constants are defined
    pub fn has_enumerations(&self) -> bool {
        !self.name_values.is_empty()
    }

    /// Resolve an integer constant to its symbolic name
    pub fn enumeration_name(&self, value: u32) -> Option<&str> {
        self.value_names.get(&value).map(String::as_str)
    }

    /// Resolve a symbolic name to its integer constant
    pub fn enumeration_value(&self, name: &str) -> Option<u32> {
        self.name_values.get(name).copied()
    }

    /// All named constants, aliases included, ordered by name
    pub fn enumerations(&self) -> impl Iterator<Item = (u32, &str)> {
        self.name_values.iter().map(|(n, v)| (*v, n.as_str()))
    }
}
