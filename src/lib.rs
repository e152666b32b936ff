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

//! Bindings for the wireguard-tools `wg` command line utility.
//!
//! Key generation, `wg show` queries and `wg set` mutations are forwarded
//! to the external binary; the status report it prints is parsed into
//! structured records ([`show::parse_interface`]) or typed views
//! ([`model::InterfaceInfo`]). All cryptography and interface state stay
//! with `wg` itself; every call spawns one process and blocks until it
//! exits.

pub mod cmd;
pub mod error;
pub mod keys;
pub mod model;
pub mod set;
pub mod show;

pub use cmd::Wg;
pub use error::{Error, Result};
pub use keys::Keypair;
pub use model::{InterfaceInfo, PeerInfo};
pub use set::{WgIfCfg, WgPeerCfg};
pub use show::{
    parse_interface, parse_interfaces, InterfaceRecord, Mode, PeerRecord, Transfer, Value,
};
