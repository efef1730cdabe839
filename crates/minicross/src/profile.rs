//! Per-user profile: display name and free-form preferences.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{LocalStore, keys, read_json, write_json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: Option<String>,
    pub settings: BTreeMap<String, Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields to change in a profile; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub settings: BTreeMap<String, Value>,
}

#[derive(Clone)]
pub struct ProfileStore {
    store: Rc<dyn LocalStore>,
}

impl ProfileStore {
    pub fn new(store: Rc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, user: &str) -> Profile {
        read_json(self.store.as_ref(), &keys::profile(user)).unwrap_or_default()
    }

    /// Merge `update` into the stored profile and stamp it.
    pub fn save(&self, user: &str, update: ProfileUpdate, now: DateTime<Utc>) -> Profile {
        let mut profile = self.get(user);
        if let Some(name) = update.name {
            profile.name = Some(name);
        }
        profile.settings.extend(update.settings);
        profile.updated_at = Some(now);
        write_json(self.store.as_ref(), &keys::profile(user), &profile);
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_missing_profile_is_default() {
        let profiles = ProfileStore::new(Rc::new(MemoryStore::new()));
        assert_eq!(profiles.get("alice"), Profile::default());
    }

    #[test]
    fn test_save_merges_settings() {
        let profiles = ProfileStore::new(Rc::new(MemoryStore::new()));
        let now = Utc.with_ymd_and_hms(2025, 9, 27, 8, 0, 0).unwrap();

        profiles.save(
            "alice",
            ProfileUpdate {
                name: Some("Alice".to_string()),
                settings: BTreeMap::from([("theme".to_string(), json!("dark"))]),
            },
            now,
        );
        let profile = profiles.save(
            "alice",
            ProfileUpdate {
                name: None,
                settings: BTreeMap::from([("sound".to_string(), json!(false))]),
            },
            now,
        );

        assert_eq!(profile.name.as_deref(), Some("Alice"));
        assert_eq!(profile.settings.len(), 2);
        assert_eq!(profiles.get("alice"), profile);
        assert_eq!(profile.updated_at, Some(now));
    }
}
