/*
 * SPDX-FileCopyrightText: 2022 Empo Inc.
 *
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

//! Parser for the status report emitted by `wg show`.
//!
//! The report is a flat sequence of `key: value` lines. A `peer` line
//! opens a nested block under the current interface; in the
//! `wg show all` form an `interface` line opens a new top-level block.

use std::collections::{BTreeMap, HashMap};

use ipnet::IpNet;
use lazy_static::lazy_static;
use serde::Serialize;

use crate::cmd::Wg;
use crate::error::{Error, Result};

const DELIMITER: &str = ": ";

// Sentinels and suffix words as emitted by wireguard-tools. The transfer
// wording can vary with the tool's version, so it lives here rather than
// inline in the coercion code.
const HIDDEN: &str = "(hidden)";
const NO_NETWORKS: &str = "(none)";
const TRANSFER_RECEIVED: &str = "received";
const TRANSFER_SENT: &str = "sent";

/// Value coercion mode for `wg show` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No coercion; every value is a trimmed string.
    Raw,
    /// Full coercion; `allowed ips` become [`IpNet`]s.
    Typed,
    /// Like `Typed`, but values stay representable in plain JSON;
    /// `allowed ips` become trimmed strings.
    JsonCompat,
}

/// Received / sent counters from a `transfer` line.
///
/// The counters are kept as the human-readable strings `wg` prints
/// ("1.04 MiB"), unit suffix included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub received: String,
    pub sent: String,
}

/// A single attribute value from the status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The tool redacted the value (`(hidden)`); serializes as `null`.
    Hidden,
    Int(u64),
    Text(String),
    Networks(Vec<IpNet>),
    List(Vec<String>),
    Transfer(Transfer),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_networks(&self) -> Option<&[IpNet]> {
        match self {
            Value::Networks(nets) => Some(nets),
            _ => None,
        }
    }

    pub fn as_transfer(&self) -> Option<&Transfer> {
        match self {
            Value::Transfer(t) => Some(t),
            _ => None,
        }
    }
}

/// Peer block of a status report, keyed attributes only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeerRecord {
    #[serde(flatten)]
    pub attrs: BTreeMap<String, Value>,
}

/// Interface block of a status report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceRecord {
    #[serde(flatten)]
    pub attrs: BTreeMap<String, Value>,
    /// Peer public key to peer block.
    pub peers: BTreeMap<String, PeerRecord>,
}

type Coercer = fn(&str, Mode) -> Result<Value>;

lazy_static! {
    // Field name to coercion function, looked up per parsed line.
    static ref COERCERS: HashMap<&'static str, Coercer> = {
        let mut m: HashMap<&'static str, Coercer> = HashMap::new();
        m.insert("allowed ips", coerce_allowed_ips);
        m.insert("listening port", coerce_listening_port);
        m.insert("transfer", coerce_transfer);
        m
    };
}

fn coerce_allowed_ips(value: &str, mode: Mode) -> Result<Value> {
    let segments = value.split(',').map(str::trim).filter(|s| *s != NO_NETWORKS);

    if mode == Mode::JsonCompat {
        Ok(Value::List(segments.map(str::to_string).collect()))
    } else {
        let networks = segments
            .map(str::parse)
            .collect::<std::result::Result<Vec<IpNet>, _>>()?;
        Ok(Value::Networks(networks))
    }
}

fn coerce_listening_port(value: &str, _mode: Mode) -> Result<Value> {
    Ok(Value::Int(value.parse()?))
}

fn coerce_transfer(value: &str, _mode: Mode) -> Result<Value> {
    let segments: Vec<&str> = value.split(',').collect();
    match segments.as_slice() {
        [received, sent] => Ok(Value::Transfer(Transfer {
            received: received.replace(TRANSFER_RECEIVED, "").trim().to_string(),
            sent: sent.replace(TRANSFER_SENT, "").trim().to_string(),
        })),
        _ => Err(Error::BadTransfer(value.to_string())),
    }
}

fn coerce(key: &str, value: &str, mode: Mode) -> Result<Value> {
    if mode == Mode::Raw {
        return Ok(Value::Text(value.to_string()));
    }

    if let Some(coercer) = COERCERS.get(key) {
        return coercer(value, mode);
    }

    if value == HIDDEN {
        return Ok(Value::Hidden);
    }

    Ok(Value::Text(value.to_string()))
}

// A value containing the delimiter itself is a defect in the input.
fn split_line(line: &str) -> Result<(&str, &str)> {
    let (key, value) = match line.find(DELIMITER) {
        Some(at) => (&line[..at], &line[at + DELIMITER.len()..]),
        None => return Err(Error::MalformedLine(line.to_string())),
    };

    if value.contains(DELIMITER) {
        return Err(Error::MalformedLine(line.to_string()));
    }

    Ok((key, value))
}

fn insert_attr(iface: &mut InterfaceRecord, peer: &Option<String>, key: &str, value: Value) {
    match peer {
        Some(pubkey) => {
            if let Some(record) = iface.peers.get_mut(pubkey) {
                record.attrs.insert(key.to_string(), value);
            }
        }
        None => {
            iface.attrs.insert(key.to_string(), value);
        }
    }
}

/// Parses the status report of a single interface.
pub fn parse_interface(text: &str, mode: Mode) -> Result<InterfaceRecord> {
    let mut iface = InterfaceRecord::default();
    let mut peer: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = split_line(line)?;

        if key == "peer" {
            iface.peers.insert(value.to_string(), PeerRecord::default());
            peer = Some(value.to_string());
            continue;
        }

        let value = coerce(key, value, mode)?;
        insert_attr(&mut iface, &peer, key, value);
    }

    Ok(iface)
}

/// Parses a `wg show all` report into interface name to record.
pub fn parse_interfaces(text: &str, mode: Mode) -> Result<BTreeMap<String, InterfaceRecord>> {
    let mut interfaces: BTreeMap<String, InterfaceRecord> = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut peer: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = split_line(line)?;

        if key == "interface" {
            interfaces.insert(value.to_string(), InterfaceRecord::default());
            current = Some(value.to_string());
            peer = None;
            continue;
        }

        // Lines before the first interface marker have no enclosing record.
        let iface = match current.as_ref().and_then(|name| interfaces.get_mut(name)) {
            Some(iface) => iface,
            None => continue,
        };

        if key == "peer" {
            iface.peers.insert(value.to_string(), PeerRecord::default());
            peer = Some(value.to_string());
            continue;
        }

        let value = coerce(key, value, mode)?;
        insert_attr(iface, &peer, key, value);
    }

    Ok(interfaces)
}

impl Wg {
    /// Queries the status of a single named interface.
    pub fn show(&self, interface: &str, mode: Mode) -> Result<InterfaceRecord> {
        let text = self.read(&["show", interface])?;
        parse_interface(&text, mode)
    }

    /// Queries the status of every interface at once.
    pub fn show_all(&self, mode: Mode) -> Result<BTreeMap<String, InterfaceRecord>> {
        let text = self.read(&["show", "all"])?;
        parse_interfaces(&text, mode)
    }

    /// Lists the names of the configured interfaces.
    pub fn show_interfaces(&self) -> Result<Vec<String>> {
        let text = self.read(&["show", "interfaces"])?;
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WG0: &str = "\
interface: wg0
  public key: xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=
  private key: (hidden)
  listening port: 51820

peer: HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=
  endpoint: 203.0.113.1:51820
  allowed ips: 10.0.0.0/24, 10.0.1.0/24
  latest handshake: 1 minute, 17 seconds ago
  transfer: 1.04 MiB received, 892 B sent
  persistent keepalive: every 25 seconds
";

    #[test]
    fn no_peers_yields_empty_peer_map() {
        let text = "private key: (hidden)\nlistening port: 51820\n";
        let iface = parse_interface(text, Mode::Typed).unwrap();
        assert!(iface.peers.is_empty());
        assert_eq!(iface.attrs["private key"], Value::Hidden);
        assert_eq!(iface.attrs["listening port"], Value::Int(51820));
    }

    #[test]
    fn fields_after_peer_line_attach_to_the_peer() {
        let iface = parse_interface(WG0, Mode::Typed).unwrap();

        assert_eq!(
            iface.attrs["public key"].as_str(),
            Some("xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=")
        );
        assert!(!iface.attrs.contains_key("endpoint"));

        let peer = &iface.peers["HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw="];
        assert_eq!(peer.attrs["endpoint"].as_str(), Some("203.0.113.1:51820"));
        assert_eq!(
            peer.attrs["latest handshake"].as_str(),
            Some("1 minute, 17 seconds ago")
        );
    }

    #[test]
    fn allowed_ips_parse_as_networks() {
        let iface = parse_interface(WG0, Mode::Typed).unwrap();
        let peer = iface.peers.values().next().unwrap();
        let networks = peer.attrs["allowed ips"].as_networks().unwrap();

        let expected: Vec<IpNet> = vec![
            "10.0.0.0/24".parse().unwrap(),
            "10.0.1.0/24".parse().unwrap(),
        ];
        assert_eq!(networks, expected.as_slice());
    }

    #[test]
    fn allowed_ips_stay_strings_in_json_compat_mode() {
        let iface = parse_interface(WG0, Mode::JsonCompat).unwrap();
        let peer = iface.peers.values().next().unwrap();
        assert_eq!(
            peer.attrs["allowed ips"],
            Value::List(vec!["10.0.0.0/24".to_string(), "10.0.1.0/24".to_string()])
        );
    }

    #[test]
    fn allowed_ips_none_sentinel_is_an_empty_list() {
        let iface = parse_interface("peer: k\nallowed ips: (none)\n", Mode::Typed).unwrap();
        assert_eq!(iface.peers["k"].attrs["allowed ips"], Value::Networks(vec![]));
    }

    #[test]
    fn transfer_splits_into_received_and_sent() {
        let iface = parse_interface(WG0, Mode::Typed).unwrap();
        let peer = iface.peers.values().next().unwrap();
        assert_eq!(
            peer.attrs["transfer"].as_transfer().unwrap(),
            &Transfer {
                received: "1.04 MiB".to_string(),
                sent: "892 B".to_string(),
            }
        );
    }

    #[test]
    fn malformed_transfer_is_rejected() {
        match parse_interface("transfer: 1.04 MiB received", Mode::Typed) {
            Err(Error::BadTransfer(_)) => (),
            other => panic!("expected BadTransfer, got {:?}", other),
        }
    }

    #[test]
    fn hidden_values_become_hidden_regardless_of_key() {
        let iface = parse_interface("some new field: (hidden)\n", Mode::Typed).unwrap();
        assert_eq!(iface.attrs["some new field"], Value::Hidden);
    }

    #[test]
    fn raw_mode_skips_all_coercion() {
        let iface = parse_interface(WG0, Mode::Raw).unwrap();
        assert_eq!(iface.attrs["listening port"].as_str(), Some("51820"));
        assert_eq!(iface.attrs["private key"].as_str(), Some("(hidden)"));

        let peer = iface.peers.values().next().unwrap();
        assert_eq!(
            peer.attrs["allowed ips"].as_str(),
            Some("10.0.0.0/24, 10.0.1.0/24")
        );
    }

    #[test]
    fn line_without_delimiter_is_rejected() {
        match parse_interface("no delimiter here", Mode::Typed) {
            Err(Error::MalformedLine(line)) => assert_eq!(line, "no delimiter here"),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn second_delimiter_in_value_is_rejected() {
        assert!(matches!(
            parse_interface("key: value: more", Mode::Typed),
            Err(Error::MalformedLine(_))
        ));
    }

    #[test]
    fn multi_interface_report_splits_on_interface_markers() {
        let text = "\
interface: wg0
  listening port: 51820
peer: peer-a
  allowed ips: 10.0.0.0/24

interface: wg1
  listening port: 51821
peer: peer-b
  allowed ips: 10.1.0.0/24
";
        let interfaces = parse_interfaces(text, Mode::Typed).unwrap();
        assert_eq!(interfaces.len(), 2);

        let wg0 = &interfaces["wg0"];
        assert_eq!(wg0.attrs["listening port"], Value::Int(51820));
        assert_eq!(wg0.peers.len(), 1);
        assert!(wg0.peers.contains_key("peer-a"));

        let wg1 = &interfaces["wg1"];
        assert_eq!(wg1.peers.len(), 1);
        assert!(wg1.peers.contains_key("peer-b"));
    }

    #[test]
    fn interface_marker_resets_the_peer_context() {
        let text = "\
interface: wg0
peer: peer-a
interface: wg1
  listening port: 51821
";
        let interfaces = parse_interfaces(text, Mode::Typed).unwrap();
        // The port belongs to wg1 itself, not to a leaked peer-a context.
        assert_eq!(interfaces["wg1"].attrs["listening port"], Value::Int(51821));
        assert!(interfaces["wg1"].peers.is_empty());
        assert!(interfaces["wg0"].peers["peer-a"].attrs.is_empty());
    }

    #[test]
    fn json_compat_report_serializes_cleanly() {
        let iface = parse_interface(WG0, Mode::JsonCompat).unwrap();
        let json = serde_json::to_value(&iface).unwrap();

        assert_eq!(json["private key"], serde_json::Value::Null);
        assert_eq!(json["listening port"], 51820);
        let peer = &json["peers"]["HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw="];
        assert_eq!(peer["allowed ips"][0], "10.0.0.0/24");
        assert_eq!(peer["transfer"]["received"], "1.04 MiB");
    }
}
