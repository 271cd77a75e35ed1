use std::fs;
use std::io::Write;

use wgpeers::config::{Peer, PeerSelector, WireGuardConfig};
use wgpeers::error::ConfigError;
use wgpeers::WgError;
use wgpeers::network::{next_host, Ipv4Interface};

const TEST_CONFIG: &str = "\
[Interface]
# This is a second comment
PrivateKey = T0n35r75nfWyaScP/JpNSAFdZMQiP6coiTDq8Zm4TVE=
# PublicKey = +1v8fSkAW7SJFHNrkHlTrnt10dKNu2E727H3OhrSNQk=
ListenPort = 51820
Address = 10.0.0.0/18

[Peer]
PublicKey = d2Ry6fqdWjBfLtgGhD5ABi4JxnRGEfyw6OMNkXLcE0Q=
AllowedIPs = 10.0.0.2/32
Endpoint = 1.2.3.4:51820
PersistentKeepalive = 25
PresharedKey = preshared_key

[Peer]
PublicKey = ll40MSH9pD6ljd++PBcyUGWv/C/wCTbotsD+c0W42gM=
AllowedIPs = 10.0.0.3/32
";

fn test_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TEST_CONFIG.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn add_peer_survives_save_and_reload() {
    let file = test_config();
    let mut wg = WireGuardConfig::load(file.path()).unwrap();

    let mut peer = Peer::new("eBvBVLo6wH0XkBfIjeLPf8ydBTfU/gMqJOH4nmVXcDD=", "10.0.0.4/32");
    peer.name = Some("laptop".into());
    wg.add_peer(peer.clone()).unwrap();
    wg.save().unwrap();

    let wg = WireGuardConfig::load(file.path()).unwrap();
    assert_eq!(wg.peers().len(), 3);
    assert!(wg.peers().iter().any(|p| p.to_raw() == peer.to_raw()));
    assert!(wg.peers().contains(&peer));
}

#[test]
fn delete_peer_survives_save_and_reload() {
    let file = test_config();
    let mut wg = WireGuardConfig::load(file.path()).unwrap();

    let target = Peer::new("d2Ry6fqdWjBfLtgGhD5ABi4JxnRGEfyw6OMNkXLcE0Q=", "10.0.0.2/32");
    wg.delete_peer(&target);
    wg.save().unwrap();

    let wg = WireGuardConfig::load(file.path()).unwrap();
    assert_eq!(wg.peers().len(), 1);
    assert!(wg
        .get_peer(PeerSelector::PublicKey(&target.public_key))
        .is_none());
}

#[test]
fn get_peer_by_ip_and_key_agree() {
    let file = test_config();
    let wg = WireGuardConfig::load(file.path()).unwrap();

    let by_ip = wg.get_peer(PeerSelector::Ip("10.0.0.2/32")).unwrap();
    let by_key = wg
        .get_peer(PeerSelector::PublicKey(
            "d2Ry6fqdWjBfLtgGhD5ABi4JxnRGEfyw6OMNkXLcE0Q=",
        ))
        .unwrap();
    assert_eq!(by_ip, by_key);
}

#[test]
fn next_peer_interface_follows_highest_peer() {
    let file = test_config();
    let wg = WireGuardConfig::load(file.path()).unwrap();
    assert_eq!(
        wg.next_peer_interface().unwrap(),
        "10.0.0.4/32".parse::<Ipv4Interface>().unwrap()
    );
}

#[test]
fn open_from_directory_and_file_name() {
    let file = test_config();
    let wg = WireGuardConfig::open(file.path(), None).unwrap();
    assert_eq!(wg.peers().len(), 2);

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("wg0.conf"), TEST_CONFIG).unwrap();

    let wg = WireGuardConfig::open(dir.path(), Some("wg0.conf")).unwrap();
    assert_eq!(wg.peers().len(), 2);

    let wg = WireGuardConfig::open(dir.path(), None).unwrap();
    assert_eq!(wg.path(), Some(dir.path().join("wg0.conf").as_path()));
}

#[test]
fn interface_comments_survive_save() {
    let file = test_config();
    let mut wg = WireGuardConfig::load(file.path()).unwrap();
    wg.allocate_peer(Peer::new("fresh", "")).unwrap();
    wg.save().unwrap();

    let text = fs::read_to_string(file.path()).unwrap();
    assert!(text.contains("# This is a second comment"));
    assert!(text.contains("# PublicKey = +1v8fSkAW7SJFHNrkHlTrnt10dKNu2E727H3OhrSNQk="));
    assert!(text.contains("ListenPort = 51820"));
    assert!(text.contains("AllowedIPs = 10.0.0.4/32"));
}

#[test]
fn unusual_names_survive_save_and_reload() {
    let file = test_config();
    let mut wg = WireGuardConfig::load(file.path()).unwrap();

    let names = ["#hashed", " leading", "trailing ", "dave # laptop", "x = y"];
    for (idx, label) in names.iter().enumerate() {
        let mut peer = Peer::new(format!("key{}", idx), "");
        peer.name = Some(label.to_string());
        wg.allocate_peer(peer).unwrap();
    }
    // An explicit marker is stripped once on the way back
    let mut marked = Peer::new("marked", "");
    marked.name = Some("# marked".into());
    wg.allocate_peer(marked).unwrap();
    wg.save().unwrap();

    let wg = WireGuardConfig::load(file.path()).unwrap();
    for (idx, label) in names.iter().enumerate() {
        let key = format!("key{}", idx);
        let peer = wg.get_peer(PeerSelector::PublicKey(&key)).unwrap();
        assert_eq!(peer.name.as_deref(), Some(*label));
        assert_eq!(peer.endpoint, None);
    }
    let marked = wg.get_peer(PeerSelector::PublicKey("marked")).unwrap();
    assert_eq!(marked.name.as_deref(), Some("marked"));
}

#[test]
fn multi_line_name_is_rejected_before_save() {
    let file = test_config();
    let mut wg = WireGuardConfig::load(file.path()).unwrap();

    let mut peer = Peer::new("bob", "");
    peer.name = Some("bob\nEndpoint = evil.example:51820".into());
    let err = wg.allocate_peer(peer).unwrap_err();
    assert!(matches!(
        err,
        WgError::Config(ConfigError::InvalidValue { field: "Name", .. })
    ));

    wg.save().unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    assert!(!text.contains("evil.example"));
    assert_eq!(WireGuardConfig::load(file.path()).unwrap().peers().len(), 2);
}

#[test]
fn comment_above_peer_header_keeps_peer_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wg0.conf");
    fs::write(
        &path,
        "\
[Interface]
PrivateKey = p
Address = 10.0.0.0/18
# DNS = 1.1.1.1
[Peer]
# alice
PublicKey = a
AllowedIPs = 10.0.0.2/32
",
    )
    .unwrap();

    let wg = WireGuardConfig::load(&path).unwrap();
    assert_eq!(wg.peers()[0].name.as_deref(), Some("alice"));
    wg.save().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("# DNS = 1.1.1.1\n"));
    assert!(text.contains("[Peer]\n# alice\n"));

    let wg = WireGuardConfig::load(&path).unwrap();
    assert_eq!(wg.peers()[0].name.as_deref(), Some("alice"));
}

#[test]
fn comment_above_interface_stays_above() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wg0.conf");
    fs::write(&path, "# managed by wgpeers\n[Interface]\nPrivateKey = p\nAddress = 10.0.0.1/24\n").unwrap();

    WireGuardConfig::load(&path).unwrap().save().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# managed by wgpeers\n"));
    let header = text.find("[Interface]").unwrap();
    assert_eq!(text.matches("# managed by wgpeers").count(), 1);
    assert!(text.find("# managed by wgpeers").unwrap() < header);
}

#[test]
fn next_host_block_boundaries() {
    let network = "10.0.64.0/18".parse().unwrap();
    let cases = [
        ("10.0.64.1/32", "10.0.64.2/32"),
        ("10.0.64.254/32", "10.0.65.1/32"),
        ("10.0.64.255/32", "10.0.65.1/32"),
    ];
    for (current, expected) in cases {
        let next = next_host(current.parse().unwrap(), network).unwrap();
        assert_eq!(next.to_string(), expected);
    }
}
