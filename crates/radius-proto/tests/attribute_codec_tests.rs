//! Attribute codec integration tests
//!
//! Exercises the public API with a dictionary built the way an application
//! would: standard attributes plus one vendor with its own sub-attributes.

use radius_proto::attributes::codec;
use radius_proto::{
    AttributeError, AttributeHolder, AttributeKind, AttributeTemplate, Code, IntegerAttribute,
    MemoryDictionary, NO_VENDOR, Packet, PacketError, RadiusAttribute, VendorSpecificAttribute,
};

const VENDOR: u32 = 9;
const OTHER_VENDOR: u32 = 311;

fn dictionary() -> MemoryDictionary {
    MemoryDictionary::standard()
        .with_vendor(VENDOR, "Cisco")
        .with_vendor(OTHER_VENDOR, "Microsoft")
        .with_template(AttributeTemplate::new(VENDOR, 1, "Cisco-AVPair", AttributeKind::String))
        .with_template(
            AttributeTemplate::new(VENDOR, 2, "Cisco-Mode", AttributeKind::Integer)
                .with_enumeration("Foo", 7),
        )
        .with_template(AttributeTemplate::new(VENDOR, 3, "Cisco-Gateway", AttributeKind::IpAddr))
}

#[test]
fn test_every_kind_round_trips() {
    let dictionary = dictionary();
    let attributes = [
        RadiusAttribute::from_name(&dictionary, "User-Name", "alice").unwrap(),
        RadiusAttribute::from_name(&dictionary, "Service-Type", "Framed-User").unwrap(),
        RadiusAttribute::from_name(&dictionary, "Framed-IP-Address", "10.1.2.3").unwrap(),
        RadiusAttribute::from_name(&dictionary, "State", "0xdeadbeef").unwrap(),
        RadiusAttribute::parse(&dictionary, NO_VENDOR, 240, "0102").unwrap(),
    ];

    for attribute in &attributes {
        let encoded = codec::encode(attribute).unwrap();
        let (decoded, consumed) = codec::decode(&dictionary, NO_VENDOR, &encoded, 0).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(&decoded, attribute);
        assert_eq!(decoded.vendor_id(), attribute.vendor_id());
        assert_eq!(decoded.attr_type(), attribute.attr_type());
        assert_eq!(decoded.value_string(), attribute.value_string());
    }
}

#[test]
fn test_vsa_round_trip_preserves_order() {
    let dictionary = dictionary();
    let mut vsa = VendorSpecificAttribute::new(&dictionary, VENDOR).unwrap();
    vsa.add_attribute(RadiusAttribute::parse(&dictionary, VENDOR, 1, "shell:priv-lvl=15").unwrap())
        .unwrap();
    vsa.add_attribute(RadiusAttribute::parse(&dictionary, VENDOR, 2, "Foo").unwrap())
        .unwrap();
    vsa.add_attribute(RadiusAttribute::parse(&dictionary, VENDOR, 1, "ip:addr-pool=a").unwrap())
        .unwrap();
    vsa.add_attribute(RadiusAttribute::parse(&dictionary, VENDOR, 3, "192.0.2.1").unwrap())
        .unwrap();

    let encoded = vsa.to_bytes().unwrap();
    assert_eq!(encoded[0], 26);
    assert_eq!(encoded[1] as usize, encoded.len());
    assert_eq!(&encoded[2..6], &VENDOR.to_be_bytes());

    let (decoded, _) = codec::decode(&dictionary, NO_VENDOR, &encoded, 0).unwrap();
    let decoded = decoded.as_vendor_specific().unwrap();
    assert_eq!(decoded.vendor_id(), VENDOR);
    assert_eq!(decoded.attributes(), vsa.attributes());

    let types: Vec<u8> = decoded.attributes().iter().map(|a| a.attr_type()).collect();
    assert_eq!(types, vec![1, 2, 1, 3]);
    assert!(decoded.attributes().iter().all(|a| a.vendor_id() == VENDOR));
}

#[test]
fn test_integer_requires_four_octets() {
    let dictionary = dictionary();
    for length in [0usize, 1, 3, 5, 8] {
        let value = vec![0u8; length];
        let result = IntegerAttribute::from_bytes(&dictionary, NO_VENDOR, 6, &value);
        assert!(
            matches!(result, Err(AttributeError::InvalidArgument(_))),
            "length {} accepted",
            length
        );
        assert!(RadiusAttribute::create(&dictionary, NO_VENDOR, 6, &value).is_err());
    }
    assert!(IntegerAttribute::from_bytes(&dictionary, NO_VENDOR, 6, &[0, 0, 0, 1]).is_ok());
}

#[test]
fn test_vendor_mismatch_rejected() {
    let dictionary = dictionary();
    let mut vsa = VendorSpecificAttribute::new(&dictionary, VENDOR).unwrap();
    let foreign = RadiusAttribute::parse(&dictionary, OTHER_VENDOR, 1, "00").unwrap();

    assert_eq!(
        vsa.add_attribute(foreign.clone()),
        Err(AttributeError::VendorMismatch {
            expected: VENDOR,
            actual: OTHER_VENDOR
        })
    );
    assert!(matches!(
        vsa.remove_attribute(&foreign),
        Err(AttributeError::VendorMismatch { .. })
    ));
    assert!(vsa.is_empty());
}

#[test]
fn test_vsa_length_bounds() {
    let dictionary = dictionary();
    let mut vsa = VendorSpecificAttribute::new(&dictionary, VENDOR).unwrap();

    // Header and vendor ID only: 6 bytes
    assert!(matches!(
        vsa.to_bytes(),
        Err(AttributeError::VendorSpecificLength(6))
    ));

    // 6 + 2 + 247 = 255
    vsa.add_attribute(RadiusAttribute::parse(&dictionary, VENDOR, 1, &"x".repeat(247)).unwrap())
        .unwrap();
    assert_eq!(vsa.to_bytes().unwrap().len(), 255);

    let mut too_long = VendorSpecificAttribute::new(&dictionary, VENDOR).unwrap();
    too_long
        .add_attribute(RadiusAttribute::parse(&dictionary, VENDOR, 1, &"x".repeat(248)).unwrap())
        .unwrap();
    assert!(matches!(
        too_long.to_bytes(),
        Err(AttributeError::VendorSpecificLength(256))
    ));

    assert!(codec::is_valid_vendor_specific_length(7));
    assert!(codec::is_valid_vendor_specific_length(255));
    assert!(!codec::is_valid_vendor_specific_length(6));
    assert!(!codec::is_valid_vendor_specific_length(256));
}

#[test]
fn test_vsa_length_checked_on_decode() {
    let dictionary = dictionary();
    // Declared length 6: below the Vendor-Specific minimum
    let data = [26u8, 6, 0, 0, 0, 9];
    assert!(matches!(
        codec::decode(&dictionary, NO_VENDOR, &data, 0),
        Err(AttributeError::Malformed(_))
    ));
}

#[test]
fn test_enumeration_resolution() {
    let dictionary = dictionary();

    let named = RadiusAttribute::parse(&dictionary, VENDOR, 2, "Foo").unwrap();
    assert_eq!(named.as_integer().unwrap().value(), 7);
    assert_eq!(named.value_string(), "Foo");

    let raw = RadiusAttribute::parse(&dictionary, VENDOR, 2, "42").unwrap();
    assert_eq!(raw.as_integer().unwrap().value(), 42);
    assert_eq!(raw.value_string(), "42");

    assert!(matches!(
        RadiusAttribute::parse(&dictionary, VENDOR, 2, "Bar"),
        Err(AttributeError::InvalidInteger(_))
    ));
}

#[test]
fn test_malformed_attribute_aborts_packet_decode() {
    let dictionary = dictionary();
    let mut packet = Packet::new(Code::AccessAccept, 4, [0u8; 16]);
    packet
        .add_attribute(RadiusAttribute::from_name(&dictionary, "Reply-Message", "hello").unwrap())
        .unwrap();
    let mut encoded = packet.encode().unwrap();

    // Corrupt the attribute length so it overruns the packet
    encoded[21] = 40;
    assert!(matches!(
        Packet::decode(&dictionary, &encoded),
        Err(PacketError::Attribute(AttributeError::Malformed(_)))
    ));
}

#[test]
fn test_packet_with_vendor_attributes() {
    let dictionary = dictionary();
    let mut packet = Packet::new(Code::AccessAccept, 12, [3u8; 16]);
    packet
        .add_attribute(RadiusAttribute::from_name(&dictionary, "Service-Type", "Login-User").unwrap())
        .unwrap();
    packet
        .add_attribute(RadiusAttribute::from_name(&dictionary, "Cisco-AVPair", "shell:priv-lvl=15").unwrap())
        .unwrap();
    packet
        .add_attribute(RadiusAttribute::from_name(&dictionary, "Cisco-Mode", "Foo").unwrap())
        .unwrap();

    let decoded = Packet::decode(&dictionary, &packet.encode().unwrap()).unwrap();
    assert_eq!(decoded, packet);

    let map = decoded.attribute_map();
    assert_eq!(map.get("Service-Type").map(String::as_str), Some("Login-User"));
    assert_eq!(map.get("Cisco-AVPair").map(String::as_str), Some("shell:priv-lvl=15"));
    assert_eq!(map.get("Cisco-Mode").map(String::as_str), Some("Foo"));

    let vsa = decoded
        .attributes()
        .iter()
        .find_map(|a| a.as_vendor_specific())
        .unwrap();
    assert_eq!(vsa.vendor_name(), Some("Cisco"));
    assert!(vsa.to_string().starts_with("Vendor-Specific: Cisco (9)"));
}
