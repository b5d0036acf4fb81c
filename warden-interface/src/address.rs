//! Execution-layer account addresses as they appear in fact snapshots.

use core::fmt;
use core::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};

/// The length in bytes of an execution-layer address.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte execution-layer account address.
///
/// Displays as `0x`-prefixed lowercase hex and parses the same form (the
/// prefix is optional on input). The all-zero value is representable on
/// purpose: deployments really do leave roles pointing at the zero address,
/// and several rules exist precisely to flag that.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshDeserialize, BorshSerialize)]
pub struct Address {
    addr: [u8; ADDRESS_LEN],
}

impl Address {
    /// The all-zero address, conventionally used by deployments to mean
    /// "unset".
    pub const ZERO: Address = Address {
        addr: [0; ADDRESS_LEN],
    };

    /// Wraps raw address bytes.
    pub const fn new(addr: [u8; ADDRESS_LEN]) -> Self {
        Self { addr }
    }

    /// Returns `true` for the all-zero placeholder address.
    pub fn is_zero(&self) -> bool {
        self.addr == [0; ADDRESS_LEN]
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.addr
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(addr: [u8; ADDRESS_LEN]) -> Self {
        Self { addr }
    }
}

impl<'a> TryFrom<&'a [u8]> for Address {
    type Error = anyhow::Error;

    fn try_from(addr: &'a [u8]) -> Result<Self, Self::Error> {
        if addr.len() != ADDRESS_LEN {
            anyhow::bail!("address must be {} bytes long", ADDRESS_LEN);
        }
        let mut addr_bytes = [0u8; ADDRESS_LEN];
        addr_bytes.copy_from_slice(addr);
        Ok(Self { addr: addr_bytes })
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.addr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serde::Serialize::serialize(&self.addr, serializer)
        }
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex_addr: String = serde::Deserialize::deserialize(deserializer)?;
            Address::from_str(&hex_addr).map_err(serde::de::Error::custom)
        } else {
            let addr = <[u8; ADDRESS_LEN] as serde::Deserialize>::deserialize(deserializer)?;
            Ok(Address { addr })
        }
    }
}
