use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::Error;

/// Discord snowflake id (64-bit). The wire form is a decimal string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(pub u64);

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| Error::Format(format!("not a snowflake: {s:?}")))
    }
}

impl From<u64> for Snowflake {
    fn from(raw: u64) -> Self {
        Snowflake(raw)
    }
}

/// Transparent aliases naming the id's role in signatures.
pub type ApplicationId = Snowflake;
pub type InteractionId = Snowflake;
pub type GuildId = Snowflake;
pub type ChannelId = Snowflake;
pub type UserId = Snowflake;
pub type MessageId = Snowflake;
pub type RoleId = Snowflake;

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque permission bitmask.
///
/// Discord encodes this as a decimal string in member records; individual bit
/// meanings are not interpreted here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PermissionSet(u64);

impl PermissionSet {
    pub const fn from_bits(bits: u64) -> Self {
        PermissionSet(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn contains(self, other: PermissionSet) -> bool {
        self.0 & other.0 == other.0
    }
}

impl FromStr for PermissionSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        s.parse::<u64>()
            .map(PermissionSet)
            .map_err(|_| Error::Format(format!("not a permission bitmask: {s:?}")))
    }
}
