//! VariableKey - Cheap-to-clone registry key
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Full registry key of a variable handle.
///
/// Plain variables are keyed by name, indexed host variables by
/// `name:index`. Internally uses `Arc<str>` so cloning only bumps a
/// reference count.
///
/// # Examples
/// ```
/// use contracts::VariableKey;
///
/// let key = VariableKey::indexed("GENERAL ENG N1", 1);
/// assert_eq!(key, "GENERAL ENG N1:1");
/// assert_eq!(VariableKey::named("A32NX_IS_READY").as_str(), "A32NX_IS_READY");
/// ```
#[derive(Clone, Default)]
pub struct VariableKey(Arc<str>);

impl VariableKey {
    /// Key of a plain (non-indexed) variable
    #[inline]
    pub fn named(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Key of an indexed host variable
    pub fn indexed(name: &str, index: u32) -> Self {
        Self(Arc::from(format!("{name}:{index}")))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for VariableKey {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for VariableKey {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VariableKey {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariableKey {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for VariableKey {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableKey({:?})", self.0)
    }
}

impl PartialEq for VariableKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for VariableKey {}

impl PartialEq<str> for VariableKey {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for VariableKey {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

// Hash - same as str hash so maps can be queried with &str
impl Hash for VariableKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for VariableKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VariableKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_indexed_key_format() {
        let key = VariableKey::indexed("TURB ENG N1", 2);
        assert_eq!(key, "TURB ENG N1:2");
        assert_ne!(key, VariableKey::named("TURB ENG N1"));
    }

    #[test]
    fn test_clone_is_cheap() {
        let k1 = VariableKey::named("A32NX_PUSHBACK_SYSTEM_ENABLED");
        let k2 = k1.clone();
        assert_eq!(k1.as_str().as_ptr(), k2.as_str().as_ptr());
    }

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<VariableKey, i32> = HashMap::new();
        map.insert(VariableKey::named("A"), 1);
        map.insert(VariableKey::indexed("B", 3), 2);

        assert_eq!(map.get("A"), Some(&1));
        assert_eq!(map.get("B:3"), Some(&2));
        assert_eq!(map.get("B"), None);
    }

    #[test]
    fn test_serde() {
        let key = VariableKey::indexed("LIGHT POTENTIOMETER", 7);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"LIGHT POTENTIOMETER:7\"");

        let parsed: VariableKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
