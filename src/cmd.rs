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

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;

use crate::error::{Error, Result};

const WG_BIN: &str = "wg";

lazy_static! {
    // Resolved once; Wg::new() clones it so no mutable process-wide state exists.
    static ref WG_PATH: Option<PathBuf> = which::which(WG_BIN).ok();
}

/// Handle to the external `wg` binary.
///
/// Every operation spawns one `wg` process and blocks until it exits.
/// No timeouts are applied and overlapping calls are not coordinated.
#[derive(Debug, Clone)]
pub struct Wg {
    path: PathBuf,
}

impl Wg {
    /// Creates a handle using the `wg` binary discovered in `PATH`.
    pub fn new() -> Result<Self> {
        match WG_PATH.as_ref() {
            Some(path) => Ok(Wg { path: path.clone() }),
            None => Err(Error::WgNotFound),
        }
    }

    /// Creates a handle using an explicit path to the `wg` binary.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Wg { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `wg` with the given arguments and captures its stdout.
    pub(crate) fn read(&self, args: &[&str]) -> Result<String> {
        log::debug!("Running {:?} {:?}", self.path, args);
        let out = duct::cmd(&self.path, args.iter().copied()).read()?;
        Ok(out.trim_end().to_string())
    }

    /// Like `read`, but pipes `input` to the process stdin.
    pub(crate) fn read_with_stdin(&self, args: &[&str], input: &str) -> Result<String> {
        log::debug!("Running {:?} {:?} with piped stdin", self.path, args);
        let out = duct::cmd(&self.path, args.iter().copied())
            .stdin_bytes(input.as_bytes())
            .read()?;
        Ok(out.trim_end().to_string())
    }

    /// Runs `wg` with the given arguments, discarding output.
    pub(crate) fn run(&self, args: Vec<String>) -> Result<()> {
        log::debug!("Running {:?} {:?}", self.path, args);
        duct::cmd(&self.path, args).stdout_null().run()?;
        Ok(())
    }
}
