use crate::error::{ModelError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

macro_rules! byte_key {
    ($name:ident, $label:literal) => {
        impl $name {
            pub const LEN: usize = 32;

            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                $name(bytes)
            }

            pub fn from_hex(raw: &str) -> Result<Self> {
                let decoded = hex::decode(raw.trim()).map_err(|err| {
                    ModelError::InvalidKey(format!(
                        "{} `{raw}` is not hex: {err}",
                        $label
                    ))
                })?;
                let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| {
                    ModelError::InvalidKey(format!(
                        "{} must be 32 bytes, got {}",
                        $label,
                        v.len()
                    ))
                })?;
                Ok($name(bytes))
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::from_hex(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Content hash of a file (sha256). Primary key of every media record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileHash([u8; 32]);

byte_key!(FileHash, "file hash");

impl FileHash {
    /// Hash arbitrary content. Mostly useful for fixtures and imports.
    pub fn of_content(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        FileHash(bytes)
    }
}

impl fmt::Debug for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Eight bytes are plenty to tell records apart in logs.
        write!(f, "FileHash({})", hex::encode(&self.0[..8]))
    }
}

const fn padded(name: &str) -> [u8; 32] {
    let bytes = name.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < bytes.len() && i < 32 {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

/// Stable identifier of a tag, file or rating service.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceKey([u8; 32]);

byte_key!(ServiceKey, "service key");

impl ServiceKey {
    /// The local file domain new imports land in.
    pub const LOCAL_FILE: ServiceKey = ServiceKey(padded("local files"));
    pub const TRASH: ServiceKey = ServiceKey(padded("trash"));
    /// Union of every local file domain plus the trash.
    pub const COMBINED_LOCAL_FILE: ServiceKey =
        ServiceKey(padded("all local files"));
    pub const COMBINED_FILE: ServiceKey = ServiceKey(padded("all known files"));
    pub const LOCAL_TAG: ServiceKey = ServiceKey(padded("local tags"));
    /// Pseudo-service holding the sibling-collapsed union of all tag services.
    pub const COMBINED_TAG: ServiceKey = ServiceKey(padded("all known tags"));

    /// Keys that encode the local lifecycle rather than a real location.
    pub const LOCAL_LOCATIONS: [ServiceKey; 3] = [
        ServiceKey::LOCAL_FILE,
        ServiceKey::TRASH,
        ServiceKey::COMBINED_LOCAL_FILE,
    ];

    pub const fn from_name(name: &str) -> Self {
        ServiceKey(padded(name))
    }

    pub fn generate() -> Self {
        ServiceKey(rand::random::<[u8; 32]>())
    }

    pub fn is_local_location(&self) -> bool {
        Self::LOCAL_LOCATIONS.contains(self)
    }

    pub fn well_known_name(&self) -> Option<&'static str> {
        match *self {
            ServiceKey::LOCAL_FILE => Some("local files"),
            ServiceKey::TRASH => Some("trash"),
            ServiceKey::COMBINED_LOCAL_FILE => Some("all local files"),
            ServiceKey::COMBINED_FILE => Some("all known files"),
            ServiceKey::LOCAL_TAG => Some("local tags"),
            ServiceKey::COMBINED_TAG => Some("all known tags"),
            _ => None,
        }
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.well_known_name() {
            Some(name) => write!(f, "ServiceKey({name})"),
            None => write!(f, "ServiceKey({})", hex::encode(&self.0[..8])),
        }
    }
}

/// Identity of a media node. Freshly generated, never derived from content:
/// two nodes wrapping the same record are still different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub Uuid);

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeId {
    pub fn new() -> Self {
        NodeId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one in-flight search so it can be matched and cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryKey(pub Uuid);

impl Default for QueryKey {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryKey {
    pub fn new() -> Self {
        QueryKey(Uuid::now_v7())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_and_length_check() {
        let hash = FileHash::of_content(b"hello");
        assert_eq!(FileHash::from_hex(&hash.to_hex()).unwrap(), hash);

        let err = FileHash::from_hex("abcd").unwrap_err();
        assert!(matches!(err, ModelError::InvalidKey(_)));
        assert!(FileHash::from_hex("not hex").is_err());
    }

    #[test]
    fn well_known_service_keys_are_distinct() {
        let keys = [
            ServiceKey::LOCAL_FILE,
            ServiceKey::TRASH,
            ServiceKey::COMBINED_LOCAL_FILE,
            ServiceKey::COMBINED_FILE,
            ServiceKey::LOCAL_TAG,
            ServiceKey::COMBINED_TAG,
        ];
        for (i, a) in keys.iter().enumerate() {
            assert!(a.well_known_name().is_some());
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(ServiceKey::TRASH.is_local_location());
        assert!(!ServiceKey::LOCAL_TAG.is_local_location());
        assert!(ServiceKey::generate().well_known_name().is_none());
    }

    #[test]
    fn node_ids_are_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
    }
}
