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

//! Typed views over parsed status records.
//!
//! The views model the attributes current wireguard-tools emits; anything
//! it grows later lands in the `extra` maps instead of being lost.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use ipnet::IpNet;
use serde::Serialize;

use crate::cmd::Wg;
use crate::error::Result;
use crate::show::{InterfaceRecord, Mode, PeerRecord, Transfer, Value};

#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceInfo {
    pub name: Option<String>,
    pub public_key: Option<String>,
    /// `None` when the tool reports the key as `(hidden)`.
    pub private_key: Option<String>,
    pub listening_port: Option<u16>,
    pub fwmark: Option<String>,
    pub peers: BTreeMap<String, PeerInfo>,
    /// Attributes not modeled above.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PeerInfo {
    /// `None` when absent or reported as `(hidden)`.
    pub preshared_key: Option<String>,
    pub endpoint: Option<String>,
    pub allowed_ips: Vec<IpNet>,
    pub latest_handshake: Option<String>,
    pub transfer: Option<Transfer>,
    pub persistent_keepalive: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl From<InterfaceRecord> for InterfaceInfo {
    fn from(record: InterfaceRecord) -> Self {
        let mut info = InterfaceInfo::default();

        for (key, value) in record.attrs {
            match (key.as_str(), value) {
                ("interface", Value::Text(s)) => info.name = Some(s),
                ("public key", Value::Text(s)) => info.public_key = Some(s),
                ("private key", Value::Text(s)) => info.private_key = Some(s),
                ("private key", Value::Hidden) => (),
                ("listening port", Value::Int(n)) => {
                    info.listening_port = u16::try_from(n).ok()
                }
                ("fwmark", Value::Text(s)) => info.fwmark = Some(s),
                (_, value) => {
                    info.extra.insert(key.clone(), value);
                }
            }
        }

        info.peers = record
            .peers
            .into_iter()
            .map(|(pubkey, peer)| (pubkey, peer.into()))
            .collect();
        info
    }
}

impl From<PeerRecord> for PeerInfo {
    fn from(record: PeerRecord) -> Self {
        let mut info = PeerInfo::default();

        for (key, value) in record.attrs {
            match (key.as_str(), value) {
                ("preshared key", Value::Text(s)) => info.preshared_key = Some(s),
                ("preshared key", Value::Hidden) => (),
                ("endpoint", Value::Text(s)) => info.endpoint = Some(s),
                ("allowed ips", Value::Networks(nets)) => info.allowed_ips = nets,
                ("allowed ips", Value::List(segments)) => {
                    // Tolerates records parsed in JSON-compatible mode.
                    info.allowed_ips = segments
                        .iter()
                        .filter_map(|s| s.parse().ok())
                        .collect();
                }
                ("latest handshake", Value::Text(s)) => info.latest_handshake = Some(s),
                ("transfer", Value::Transfer(t)) => info.transfer = Some(t),
                ("persistent keepalive", Value::Text(s)) => {
                    info.persistent_keepalive = Some(s)
                }
                (_, value) => {
                    info.extra.insert(key.clone(), value);
                }
            }
        }

        info
    }
}

impl Wg {
    /// Queries a single interface and returns the typed view of it.
    pub fn interface(&self, interface: &str) -> Result<InterfaceInfo> {
        Ok(self.show(interface, Mode::Typed)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::show::parse_interface;

    const WG0: &str = "\
interface: wg0
  public key: xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=
  private key: (hidden)
  listening port: 51820
  fwmark: 0xca6c
  brand new field: something

peer: HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=
  preshared key: (hidden)
  endpoint: 203.0.113.1:51820
  allowed ips: 10.0.0.0/24
  latest handshake: 1 minute, 17 seconds ago
  transfer: 1.04 MiB received, 892 B sent
  persistent keepalive: every 25 seconds
";

    #[test]
    fn typed_view_maps_known_fields() {
        let info: InterfaceInfo = parse_interface(WG0, Mode::Typed).unwrap().into();

        assert_eq!(info.name.as_deref(), Some("wg0"));
        assert_eq!(
            info.public_key.as_deref(),
            Some("xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=")
        );
        assert_eq!(info.private_key, None);
        assert_eq!(info.listening_port, Some(51820));
        assert_eq!(info.fwmark.as_deref(), Some("0xca6c"));

        let peer = &info.peers["HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw="];
        assert_eq!(peer.preshared_key, None);
        assert_eq!(peer.endpoint.as_deref(), Some("203.0.113.1:51820"));
        assert_eq!(peer.allowed_ips, vec!["10.0.0.0/24".parse::<IpNet>().unwrap()]);
        assert_eq!(peer.transfer.as_ref().unwrap().sent, "892 B");
        assert_eq!(peer.persistent_keepalive.as_deref(), Some("every 25 seconds"));
        assert!(peer.extra.is_empty());
    }

    #[test]
    fn unmodeled_fields_land_in_extra() {
        let info: InterfaceInfo = parse_interface(WG0, Mode::Typed).unwrap().into();
        assert_eq!(
            info.extra["brand new field"],
            Value::Text("something".to_string())
        );
    }
}
