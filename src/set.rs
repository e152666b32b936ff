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

//! `wg set` argument assembly and peer clearing.

use std::path::PathBuf;

use ipnet::IpNet;

use crate::cmd::Wg;
use crate::error::{Error, Result};
use crate::show::Mode;

// Pseudo-names accepted by `wg show`; neither is a real interface.
const ALL: &str = "all";
const INTERFACES: &str = "interfaces";

/// Interface-level settings for `wg set`.
///
/// Absent fields are omitted from the argument list; `wg` itself rejects
/// malformed values.
#[derive(Debug, Clone, Default)]
pub struct WgIfCfg {
    pub listen_port: Option<u16>,
    pub fwmark: Option<String>,
    /// Path to a file holding the private key.
    pub private_key: Option<PathBuf>,
    pub peers: Vec<WgPeerCfg>,
}

/// Per-peer settings for `wg set`.
#[derive(Debug, Clone, Default)]
pub struct WgPeerCfg {
    pub pubkey: String,
    pub remove: bool,
    pub psk: Option<String>,
    pub endpoint: Option<String>,
    pub keep_alive: Option<u16>,
    pub allowed_ips: Vec<IpNet>,
}

impl WgPeerCfg {
    /// A configuration that removes the given peer.
    pub fn removal<S: Into<String>>(pubkey: S) -> Self {
        WgPeerCfg {
            pubkey: pubkey.into(),
            remove: true,
            ..Default::default()
        }
    }
}

fn push_peer_args(args: &mut Vec<String>, peer: &WgPeerCfg) {
    args.push("peer".to_string());
    args.push(peer.pubkey.clone());

    if peer.remove {
        args.push("remove".to_string());
    }

    if let Some(ref psk) = peer.psk {
        args.push("preshared-key".to_string());
        args.push(psk.clone());
    }

    if let Some(ref endpoint) = peer.endpoint {
        args.push("endpoint".to_string());
        args.push(endpoint.clone());
    }

    if let Some(keep_alive) = peer.keep_alive {
        args.push("persistent-keepalive".to_string());
        args.push(keep_alive.to_string());
    }

    if !peer.allowed_ips.is_empty() {
        args.push("allowed-ips".to_string());
        args.push(
            peer.allowed_ips
                .iter()
                .map(|net| net.to_string())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
}

fn set_args(interface: &str, cfg: &WgIfCfg) -> Vec<String> {
    let mut args = vec!["set".to_string(), interface.to_string()];

    if let Some(port) = cfg.listen_port {
        args.push("listen-port".to_string());
        args.push(port.to_string());
    }

    if let Some(ref fwmark) = cfg.fwmark {
        args.push("fwmark".to_string());
        args.push(fwmark.clone());
    }

    if let Some(ref path) = cfg.private_key {
        args.push("private-key".to_string());
        args.push(path.display().to_string());
    }

    for peer in &cfg.peers {
        push_peer_args(&mut args, peer);
    }

    args
}

impl Wg {
    /// Applies the given settings to an interface via `wg set`.
    pub fn set(&self, interface: &str, cfg: &WgIfCfg) -> Result<()> {
        self.run(set_args(interface, cfg))
    }

    /// Removes every peer from the given interface, or from all
    /// interfaces when passed `"all"`.
    pub fn clear_peers(&self, interface: &str) -> Result<()> {
        if interface == INTERFACES {
            return Err(Error::BadInterfaceName(interface.to_string()));
        }

        if interface == ALL {
            return self.clear_all_peers();
        }

        let report = self.show(interface, Mode::Raw)?;
        let peers: Vec<WgPeerCfg> = report
            .peers
            .keys()
            .map(|pubkey| WgPeerCfg::removal(pubkey.as_str()))
            .collect();

        if peers.is_empty() {
            log::debug!("No peers on {}, nothing to clear", interface);
            return Ok(());
        }

        self.set(
            interface,
            &WgIfCfg {
                peers,
                ..Default::default()
            },
        )
    }

    /// Removes every peer from every interface.
    pub fn clear_all_peers(&self) -> Result<()> {
        for interface in self.show_interfaces()? {
            self.clear_peers(&interface)?;
        }
        Ok(())
    }
}
