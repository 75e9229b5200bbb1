// Catalog construction and connection classification

mod common;

use common::{FakeProvider, tcp};
use hostwatch::catalog::InterfaceCatalog;
use hostwatch::classifier::classify;
use hostwatch::error::ObserverError;
use hostwatch::models::*;
use std::sync::Arc;

fn iface(name: &str, addresses: &[&str]) -> Arc<Interface> {
    Arc::new(Interface {
        name: name.into(),
        addresses: addresses.iter().map(|a| InterfaceAddress::new(*a)).collect(),
    })
}

#[test]
fn test_only_matching_connections_are_attributed() {
    let interfaces = vec![iface("eth0", &["10.0.0.5"])];
    let conns = vec![tcp("10.0.0.5", 22), tcp("10.0.0.6", 22)];

    let groups = classify(&interfaces, &conns);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].connections, vec![tcp("10.0.0.5", 22)]);
}

#[test]
fn test_groups_follow_catalog_order_and_provider_order() {
    let interfaces = vec![
        iface("lo", &["127.0.0.1", "::1", "00:00:00:00:00:00"]),
        iface("eth0", &["10.0.0.5", "fe80::1%eth0", "aa:bb:cc:dd:ee:ff"]),
    ];
    let conns = vec![
        tcp("10.0.0.5", 443),
        tcp("127.0.0.1", 631),
        tcp("fe80::1", 22),
        tcp("::1", 631),
        tcp("10.0.0.5", 80),
    ];

    let groups = classify(&interfaces, &conns);
    assert_eq!(groups[0].interface.name, "lo");
    assert_eq!(
        groups[0]
            .connections
            .iter()
            .map(|c| c.local_port)
            .collect::<Vec<_>>(),
        vec![631, 631]
    );
    assert_eq!(groups[1].interface.name, "eth0");
    assert_eq!(
        groups[1]
            .connections
            .iter()
            .map(|c| (c.local_address.as_str(), c.local_port))
            .collect::<Vec<_>>(),
        vec![("10.0.0.5", 443), ("fe80::1", 22), ("10.0.0.5", 80)]
    );
}

#[test]
fn test_duplicate_addresses_are_not_deduplicated() {
    let interfaces = vec![iface("a", &["10.0.0.5"]), iface("b", &["10.0.0.5"])];
    let conns = vec![tcp("10.0.0.5", 22)];

    let groups = classify(&interfaces, &conns);
    assert_eq!(groups[0].connections.len(), 1);
    assert_eq!(groups[1].connections.len(), 1);
}

#[test]
fn test_malformed_local_addresses_are_dropped() {
    let interfaces = vec![iface("eth0", &["10.0.0.5", "aa:bb:cc:dd:ee:ff"])];
    let conns = vec![tcp("*", 22), tcp("", 22), tcp("10.0.0.5.1", 22)];

    let groups = classify(&interfaces, &conns);
    assert!(groups[0].connections.is_empty());
}

#[test]
fn test_classification_is_idempotent() {
    let interfaces = vec![iface("lo", &["127.0.0.1"]), iface("eth0", &["10.0.0.5"])];
    let conns = vec![
        tcp("10.0.0.5", 1),
        tcp("127.0.0.1", 2),
        tcp("10.0.0.5", 3),
    ];
    assert_eq!(classify(&interfaces, &conns), classify(&interfaces, &conns));
}

#[test]
fn test_by_address_groups_per_known_address() {
    let interfaces = vec![iface("eth0", &["10.0.0.5", "10.0.0.7", "aa:bb:cc:dd:ee:ff"])];
    let conns = vec![tcp("10.0.0.7", 1), tcp("10.0.0.5", 2), tcp("10.0.0.7", 3)];

    let groups = classify(&interfaces, &conns);
    let by_addr = groups[0].by_address();
    assert_eq!(by_addr.len(), 3);
    assert_eq!(by_addr[0].address.raw_text(), "10.0.0.5");
    assert_eq!(by_addr[0].connections.len(), 1);
    assert_eq!(
        by_addr[1]
            .connections
            .iter()
            .map(|c| c.local_port)
            .collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert!(by_addr[2].connections.is_empty());
}

#[test]
fn test_catalog_keeps_order_and_empty_interfaces() {
    let provider = FakeProvider::new()
        .with_interface("lo", &["127.0.0.1", "00:00:00:00:00:00"])
        .with_interface("tun0", &[]);

    let catalog = InterfaceCatalog::build(&provider).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.interfaces()[0].name, "lo");
    assert_eq!(
        catalog.interfaces()[0].addresses[1].kind(),
        AddressKind::Mac
    );
    let tun = catalog.get("tun0").unwrap();
    assert!(tun.addresses.is_empty());

    let groups = classify(catalog.interfaces(), &[tcp("127.0.0.1", 1)]);
    assert!(groups[1].connections.is_empty());
}

#[test]
fn test_catalog_fails_when_interface_vanishes() {
    let provider = FakeProvider::new().with_interface("eth0", &["10.0.0.5"]);
    provider.names.lock().unwrap().push("wlan0".into());

    let err = InterfaceCatalog::build(&provider).unwrap_err();
    assert!(matches!(err, ObserverError::UnknownInterface(ref name) if name == "wlan0"));
    assert!(err.to_string().contains("wlan0"));
}
