use serde::{Deserialize, Serialize};

/// Where a remotely hosted photo lives, plus its declared dimensions
///
/// Dimensions start as whatever the server announced and are corrected
/// once the bytes arrive and decode.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StorageLocation {
    pub width: u32,
    pub height: u32,
    /// Datacenter holding the file
    pub dc: i32,
    pub volume: u64,
    pub local: i32,
    pub secret: u64,
}

impl StorageLocation {
    pub fn new(width: u32, height: u32, dc: i32, volume: u64, local: i32, secret: u64) -> Self {
        Self {
            width,
            height,
            dc,
            volume,
            local,
            secret,
        }
    }

    /// A location that points nowhere (no datacenter)
    pub fn is_null(&self) -> bool {
        self.dc == 0
    }

    pub fn storage_key(&self) -> StorageKey {
        StorageKey {
            hi: (self.dc as u32 as u64) << 32 | self.local as u32 as u64,
            lo: self.volume,
        }
    }
}

/// 128-bit de-duplication and persistence key of a storage location
///
/// Dimensions and secret are not part of it: the same file seen with a
/// different declared size is still the same file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StorageKey {
    pub hi: u64,
    pub lo: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_dimensions() {
        let a = StorageLocation::new(100, 80, 2, 7777, 15, 1);
        let b = StorageLocation::new(320, 240, 2, 7777, 15, 99);
        assert_eq!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn test_key_separates_fields() {
        let a = StorageLocation::new(0, 0, 2, 7777, 15, 0);
        let b = StorageLocation::new(0, 0, 2, 7777, 16, 0);
        let c = StorageLocation::new(0, 0, 3, 7777, 15, 0);
        let d = StorageLocation::new(0, 0, -1, 7777, -1, 0);
        assert_ne!(a.storage_key(), b.storage_key());
        assert_ne!(a.storage_key(), c.storage_key());
        assert_eq!(d.storage_key().hi, u64::MAX);
    }

    #[test]
    fn test_null_location() {
        assert!(StorageLocation::default().is_null());
        assert!(!StorageLocation::new(0, 0, 1, 0, 0, 0).is_null());
    }
}
