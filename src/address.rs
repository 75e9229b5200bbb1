// Address classification and matching (MAC vs IPv4 vs IPv6)

use crate::models::{AddressKind, InterfaceAddress};
use std::net::{IpAddr, Ipv6Addr};

/// True if `text` is six 2-hex-digit groups separated by `:` or `-`.
/// Separators may be mixed, case is preserved for later comparison.
pub fn is_mac_addr(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        if i % 3 == 2 {
            *b == b':' || *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Parse an IP literal. A single non-empty IPv6 zone suffix (`fe80::1%eth0`)
/// is ignored; any other `%` makes the text unparseable.
pub fn parse_ip(text: &str) -> Option<IpAddr> {
    match text.split_once('%') {
        None => text.parse().ok(),
        Some((addr, zone)) => {
            if zone.is_empty() || zone.contains('%') {
                return None;
            }
            addr.parse::<Ipv6Addr>().ok().map(IpAddr::V6)
        }
    }
}

/// Classify first, parse only when classification succeeds. Never fails.
pub fn classify(text: &str) -> AddressKind {
    if is_mac_addr(text) {
        return AddressKind::Mac;
    }
    match parse_ip(text) {
        Some(IpAddr::V4(_)) => AddressKind::Ipv4,
        Some(IpAddr::V6(_)) => AddressKind::Ipv6,
        None => AddressKind::Other,
    }
}

impl InterfaceAddress {
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let kind = classify(&raw_text);
        Self { raw_text, kind }
    }

    pub fn is_mac(&self) -> bool {
        self.kind == AddressKind::Mac
    }

    /// Parsed IP value, `None` for MAC and unparseable addresses.
    pub fn ip(&self) -> Option<IpAddr> {
        match self.kind {
            AddressKind::Ipv4 | AddressKind::Ipv6 => parse_ip(&self.raw_text),
            AddressKind::Mac | AddressKind::Other => None,
        }
    }

    /// Whether a connection's local address text denotes this address.
    pub fn matches(&self, candidate: &str) -> bool {
        matches(self, candidate)
    }
}

/// MAC candidates match MAC addresses by exact text; anything else matches
/// IP addresses by parsed value. IPv4 and IPv6 values never compare equal.
pub fn matches(known: &InterfaceAddress, candidate: &str) -> bool {
    if is_mac_addr(candidate) {
        return known.is_mac() && known.raw_text == candidate;
    }
    if known.is_mac() {
        return false;
    }
    match (known.ip(), parse_ip(candidate)) {
        (Some(k), Some(c)) => k == c,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mac_with_either_separator() {
        assert!(is_mac_addr("00:1a:2B:3c:4d:5e"));
        assert!(is_mac_addr("00-1a-2b-3c-4d-5e"));
        assert!(is_mac_addr("00:1a-2b:3c-4d:5e"));
        assert!(!is_mac_addr("00:1a:2b:3c:4d"));
        assert!(!is_mac_addr("00:1a:2b:3c:4d:5g"));
        assert!(!is_mac_addr("001a:2b:3c:4d:5e:"));
    }

    #[test]
    fn classifies_each_family() {
        assert_eq!(classify("aa:bb:cc:dd:ee:ff"), AddressKind::Mac);
        assert_eq!(classify("10.0.0.5"), AddressKind::Ipv4);
        assert_eq!(classify("::1"), AddressKind::Ipv6);
        assert_eq!(classify("fe80::1%eth0"), AddressKind::Ipv6);
        assert_eq!(classify("10.0.0.5%junk"), AddressKind::Other);
        assert_eq!(classify("fe80::1%"), AddressKind::Other);
        assert_eq!(classify("not-an-address"), AddressKind::Other);
        assert_eq!(classify(""), AddressKind::Other);
    }

    #[test]
    fn mac_matches_only_exact_text() {
        let known = InterfaceAddress::new("aa:bb:cc:dd:ee:ff");
        assert!(known.matches("aa:bb:cc:dd:ee:ff"));
        assert!(!known.matches("AA:BB:CC:DD:EE:FF"));
        assert!(!known.matches("aa-bb-cc-dd-ee-ff"));
    }

    #[test]
    fn ip_matches_by_value() {
        let known = InterfaceAddress::new("192.168.1.1");
        assert!(known.matches("192.168.1.1"));
        assert!(!known.matches("192.168.1.2"));
        assert!(!known.matches("::ffff:192.168.1.1"));

        let v6 = InterfaceAddress::new("2001:db8::1");
        assert!(v6.matches("2001:0db8:0000::0001"));

        let mapped = InterfaceAddress::new("::ffff:192.168.1.1");
        assert!(mapped.matches("::ffff:c0a8:101"));
        assert!(!mapped.matches("192.168.1.1"));
    }

    #[test]
    fn never_matches_across_mac_and_ip() {
        let mac = InterfaceAddress::new("aa:bb:cc:dd:ee:ff");
        let ip = InterfaceAddress::new("10.0.0.5");
        assert!(!mac.matches("10.0.0.5"));
        assert!(!ip.matches("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn malformed_candidates_do_not_match() {
        let ip = InterfaceAddress::new("10.0.0.5");
        let mac = InterfaceAddress::new("aa:bb:cc:dd:ee:ff");
        for junk in ["", "*", "10.0.0", "10.0.0.5:80", "zz:zz:zz:zz:zz:zz", "\u{0}"] {
            assert!(!ip.matches(junk), "{junk:?}");
            assert!(!mac.matches(junk), "{junk:?}");
        }
        let v6 = InterfaceAddress::new("fe80::1");
        assert!(v6.matches("fe80::1%eth0"));
        for junk in ["10.0.0.5%eth0", "10.0.0.5%", "fe80::1%", "fe80::1%a%b"] {
            assert!(!ip.matches(junk), "{junk:?}");
            assert!(!v6.matches(junk), "{junk:?}");
        }
        let other = InterfaceAddress::new("garbage");
        assert!(!other.matches("garbage"));
    }
}
