use pfc_core::*;
use std::collections::BTreeSet;
use std::ops::BitAnd;
use std::ops::BitAndAssign;
use std::ops::BitOrAssign;
use std::ops::SubAssign;

/// Ordered set of primary record keys with set-algebraic operations.
///
/// The algebra is pure: record lists never touch the records themselves,
/// only their keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordList {
    keys: BTreeSet<Key>,
}

impl RecordList {
    pub fn count_records(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn insert(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn remove(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn first(&self) -> Option<Key> {
        self.keys.first().copied()
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }

    /// True if the two lists share at least one key.
    pub fn intersects(&self, other: &Self) -> bool {
        let (small, large) = if self.keys.len() <= other.keys.len() {
            (&self.keys, &other.keys)
        } else {
            (&other.keys, &self.keys)
        };
        small.iter().any(|key| large.contains(key))
    }
}

impl FromIterator<Key> for RecordList {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl BitOrAssign<&RecordList> for RecordList {
    fn bitor_assign(&mut self, other: &RecordList) {
        self.keys.extend(other.keys.iter().copied());
    }
}

impl BitAndAssign<&RecordList> for RecordList {
    fn bitand_assign(&mut self, other: &RecordList) {
        self.keys.retain(|key| other.keys.contains(key));
    }
}

impl SubAssign<&RecordList> for RecordList {
    fn sub_assign(&mut self, other: &RecordList) {
        self.keys.retain(|key| !other.keys.contains(key));
    }
}

impl BitAnd for &RecordList {
    type Output = RecordList;

    fn bitand(self, other: &RecordList) -> RecordList {
        RecordList {
            keys: self.keys.intersection(&other.keys).copied().collect(),
        }
    }
}
