//! Mesh element and group addresses.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WireError;

/// A 16-bit Bluetooth Mesh address.
///
/// Serialized as four uppercase hex digits (`"00A1"`), the form the
/// persisted network files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u16);

impl Address {
    pub const UNASSIGNED: Self = Self(0x0000);
    pub const ALL_NODES: Self = Self(0xFFFF);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// `0x0001..=0x7FFF`: a single element.
    pub const fn is_unicast(self) -> bool {
        self.0 >= 0x0001 && self.0 <= 0x7FFF
    }

    pub const fn is_virtual(self) -> bool {
        self.0 >= 0x8000 && self.0 <= 0xBFFF
    }

    /// `0xC000..=0xFFFF`, including the fixed group addresses.
    pub const fn is_group(self) -> bool {
        self.0 >= 0xC000
    }

    /// Address of the element `offset` positions after this one, if it is
    /// still unicast.
    pub fn offset(self, offset: u8) -> Option<Self> {
        let raw = self.0.checked_add(u16::from(offset))?;
        let address = Self(raw);
        address.is_unicast().then_some(address)
    }

    pub fn to_hex(self) -> String {
        format!("{:04X}", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl From<u16> for Address {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl FromStr for Address {
    type Err = WireError;

    /// Accepts `"00A1"`, `"0x00A1"` and `"00a1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("0x").trim_start_matches("0X");
        u16::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| WireError::InvalidAddress(s.to_string()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_ranges() {
        assert!(!Address::UNASSIGNED.is_unicast());
        assert!(Address::new(0x0001).is_unicast());
        assert!(Address::new(0x7FFF).is_unicast());
        assert!(Address::new(0x8000).is_virtual());
        assert!(Address::new(0xC000).is_group());
        assert!(Address::ALL_NODES.is_group());
    }

    #[test]
    fn offset_stays_unicast() {
        assert_eq!(Address::new(0x0010).offset(2), Some(Address::new(0x0012)));
        assert_eq!(Address::new(0x7FFF).offset(1), None);
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Address::new(0x00A1)).expect("serialize");
        assert_eq!(json, "\"00A1\"");
        let back: Address = serde_json::from_str("\"00a1\"").expect("deserialize");
        assert_eq!(back, Address::new(0x00A1));
    }

    #[test]
    fn parse_accepts_prefix() {
        assert_eq!("0x0102".parse::<Address>().expect("parse"), Address::new(0x0102));
        assert!("zz".parse::<Address>().is_err());
    }
}
