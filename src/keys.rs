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

use serde::Serialize;

use crate::cmd::Wg;
use crate::error::Result;

/// A public / private key pair.
///
/// Both halves are the opaque base64 strings `wg` prints; no validation
/// of length or alphabet is performed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keypair {
    pub public: String,
    pub private: String,
}

impl Keypair {
    /// Derives the public half from an existing private key.
    pub fn from_private_key(wg: &Wg, private: String) -> Result<Self> {
        let public = wg.pubkey(&private)?;
        Ok(Keypair { public, private })
    }

    /// Generates a fresh key pair.
    pub fn generate(wg: &Wg) -> Result<Self> {
        let private = wg.genkey()?;
        Keypair::from_private_key(wg, private)
    }
}

impl Wg {
    /// Generates a new private key.
    pub fn genkey(&self) -> Result<String> {
        self.read(&["genkey"])
    }

    /// Derives the public key for the given private key.
    pub fn pubkey(&self, private: &str) -> Result<String> {
        self.read_with_stdin(&["pubkey"], private)
    }

    /// Generates a pre-shared key.
    pub fn genpsk(&self) -> Result<String> {
        self.read(&["genpsk"])
    }

    /// Generates a public / private key pair.
    pub fn keypair(&self) -> Result<Keypair> {
        Keypair::generate(self)
    }
}
