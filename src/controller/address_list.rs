//! Immutable IPv4 address lists

use crate::{Error, Result};
use std::net::Ipv4Addr;

/// Fixed set of IPv4 addresses with exact membership
///
/// Entries are parsed once at startup and compared numerically, so the
/// spelling in the config never matters at match time. No CIDR, no
/// ranges; every entry names one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressList {
    addrs: Vec<Ipv4Addr>,
}

impl AddressList {
    pub fn new(addrs: Vec<Ipv4Addr>) -> Self {
        Self { addrs }
    }

    /// Parse a list of dotted-quad strings
    ///
    /// Blank entries are skipped. A non-canonical spelling such as
    /// "010.0.0.5" is a hard error rather than an entry that silently
    /// never matches.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut addrs = Vec::with_capacity(entries.len());
        for entry in entries {
            let s = entry.as_ref().trim();
            if s.is_empty() {
                continue;
            }
            let addr: Ipv4Addr = s
                .parse()
                .map_err(|_| Error::Config(format!("invalid IPv4 address '{}'", s)))?;
            addrs.push(addr);
        }
        Ok(Self { addrs })
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.addrs.contains(&addr)
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
