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

use std::io;
use std::num::ParseIntError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the `wg` bindings
#[derive(err_derive::Error, Debug)]
pub enum Error {
    /// The `wg` executable could not be located
    #[error(display = "wg executable not found in PATH")]
    WgNotFound,

    /// Spawning `wg` failed, it exited non-zero, or its output was not UTF-8
    #[error(display = "Failed to invoke wg")]
    Exec(#[error(source)] io::Error),

    /// A status line did not contain exactly one `": "` delimiter
    #[error(display = "Malformed status line: {:?}", _0)]
    MalformedLine(String),

    /// A `listening port` value was not a base-10 integer
    #[error(display = "Invalid listening port")]
    BadPort(#[error(source)] ParseIntError),

    /// An `allowed ips` segment was not an IP network
    #[error(display = "Invalid allowed-ips network")]
    BadNetwork(#[error(source)] ipnet::AddrParseError),

    /// A `transfer` value was not of the form `<N> received, <M> sent`
    #[error(display = "Malformed transfer counters: {:?}", _0)]
    BadTransfer(String),

    /// A reserved pseudo-name was passed where an interface name is required
    #[error(display = "Invalid interface name: {:?}", _0)]
    BadInterfaceName(String),
}
