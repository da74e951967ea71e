//! Bullet profiles: built-in presets, user profiles and the merged catalog.
//!
//! Lookups go through two explicit layers. User profiles are consulted first
//! and shadow a built-in of the same name; the built-in table is never
//! modified. User profiles are persisted as one JSON object under
//! [`PROFILE_STORE_KEY`]:
//!
//! ```text
//! {"6mm GT - 109gr": {"velocity": 2900.0, "bc": 0.6}}
//! ```

use crate::constants::PROFILE_STORE_KEY;
use crate::error::{ProfileError, ValidationError};
use crate::store::ProfileStore;
use log::{debug, info, warn};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Built-in loads: (name, muzzle velocity ft/s, G1 ballistic coefficient)
const BUILTIN_PROFILES: &[(&str, f64, f64)] = &[
    ("308 - 175gr SMK", 2650.0, 0.505),
    ("308 - 168gr AAC", 2650.0, 0.462),
    ("308 - 178gr AAC", 2600.0, 0.495),
    ("6.5CM - 140gr ELD-M", 2700.0, 0.610),
    ("6.5CM - 140gr SST", 2700.0, 0.520),
    ("6.5 Grendel - 123gr ELD-M", 2525.0, 0.506),
    ("223 - 77gr TMK", 2750.0, 0.372),
    ("300 PRC - 225gr ELD-M", 2810.0, 0.777),
    ("22LR - 40gr", 1100.0, 0.120),
];

/// A named load.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletProfile {
    pub name: String,
    pub muzzle_velocity: f64,   // ft/s
    pub drag_coefficient: f64,
}

impl BulletProfile {
    pub fn new(name: impl Into<String>, muzzle_velocity: f64, drag_coefficient: f64) -> Self {
        Self {
            name: name.into(),
            muzzle_velocity,
            drag_coefficient,
        }
    }

    /// Validate text fields as entered by a user and build a profile.
    pub fn parse(name: &str, muzzle_velocity: &str, drag_coefficient: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let muzzle_velocity = parse_number("muzzle_velocity", muzzle_velocity)?;
        let drag_coefficient = parse_number("drag_coefficient", drag_coefficient)?;
        Ok(Self::new(name, muzzle_velocity, drag_coefficient))
    }
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::MissingField { field });
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::Unparseable {
            field,
            value: text.to_string(),
        }),
    }
}

/// The shipped preset table.
pub fn builtin_profiles() -> Vec<BulletProfile> {
    BUILTIN_PROFILES
        .iter()
        .map(|&(name, velocity, bc)| BulletProfile::new(name, velocity, bc))
        .collect()
}

fn builtin_profile(name: &str) -> Option<BulletProfile> {
    BUILTIN_PROFILES
        .iter()
        .find(|(builtin, _, _)| *builtin == name)
        .map(|&(name, velocity, bc)| BulletProfile::new(name, velocity, bc))
}

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    BuiltIn,
    User,
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::BuiltIn => write!(f, "built-in"),
            ProfileSource::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub profile: BulletProfile,
    pub source: ProfileSource,
}

/// Merged view of built-in and user profiles, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileCatalog {
    entries: Vec<CatalogEntry>,
}

impl ProfileCatalog {
    /// Built-ins in table order (user overrides take the built-in's slot),
    /// followed by the remaining user profiles in insertion order.
    fn merge(user: &UserProfiles) -> Self {
        let mut entries: Vec<CatalogEntry> = builtin_profiles()
            .into_iter()
            .map(|builtin| match user.get(&builtin.name) {
                Some(custom) => CatalogEntry { profile: custom.clone(), source: ProfileSource::User },
                None => CatalogEntry { profile: builtin, source: ProfileSource::BuiltIn },
            })
            .collect();

        entries.extend(
            user.iter()
                .filter(|profile| builtin_profile(&profile.name).is_none())
                .map(|profile| CatalogEntry { profile: profile.clone(), source: ProfileSource::User }),
        );

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&BulletProfile> {
        self.entries
            .iter()
            .find(|entry| entry.profile.name == name)
            .map(|entry| &entry.profile)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &BulletProfile> {
        self.entries.iter().map(|entry| &entry.profile)
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|profile| profile.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// User-defined profiles in insertion order. Re-inserting a name replaces the
/// entry in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserProfiles {
    entries: Vec<BulletProfile>,
}

impl UserProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&BulletProfile> {
        self.entries.iter().find(|profile| profile.name == name)
    }

    pub fn insert(&mut self, profile: BulletProfile) {
        match self.entries.iter_mut().find(|existing| existing.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.entries.push(profile),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BulletProfile> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// Stored value for one profile, keyed by name in the enclosing object
#[derive(Serialize, Deserialize)]
struct StoredProfile {
    velocity: f64,
    bc: f64,
}

impl Serialize for UserProfiles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for profile in &self.entries {
            let stored = StoredProfile {
                velocity: profile.muzzle_velocity,
                bc: profile.drag_coefficient,
            };
            map.serialize_entry(&profile.name, &stored)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UserProfiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UserProfilesVisitor;

        impl<'de> Visitor<'de> for UserProfilesVisitor {
            type Value = UserProfiles;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map of profile name to {{velocity, bc}}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut profiles = UserProfiles::new();
                while let Some((name, stored)) = access.next_entry::<String, StoredProfile>()? {
                    profiles.insert(BulletProfile::new(name, stored.velocity, stored.bc));
                }
                Ok(profiles)
            }
        }

        deserializer.deserialize_map(UserProfilesVisitor)
    }
}

/// Built-in presets plus user profiles persisted through a [`ProfileStore`].
///
/// The user map is held behind an `Arc` that is swapped wholesale on every
/// write, so readers always get a complete snapshot.
pub struct ProfileRepository<S> {
    store: S,
    user: RwLock<Arc<UserProfiles>>,
}

impl<S: ProfileStore> ProfileRepository<S> {
    /// Open the repository, reading any persisted user profiles.
    ///
    /// Missing data, unreadable storage and malformed JSON all yield an empty
    /// user set.
    pub fn load_profiles(store: S) -> Self {
        let user = match store.get(PROFILE_STORE_KEY) {
            Ok(Some(text)) => match UserProfiles::from_json(&text) {
                Ok(profiles) => profiles,
                Err(e) => {
                    warn!("ignoring malformed stored profiles: {e}");
                    UserProfiles::new()
                }
            },
            Ok(None) => UserProfiles::new(),
            Err(e) => {
                warn!("could not read stored profiles: {e}");
                UserProfiles::new()
            }
        };

        debug!("loaded {} user profiles", user.len());
        Self {
            store,
            user: RwLock::new(Arc::new(user)),
        }
    }

    /// Merged catalog of built-in and user profiles.
    pub fn list_profiles(&self) -> ProfileCatalog {
        ProfileCatalog::merge(&self.user_profiles())
    }

    /// Look a profile up by name, user profiles first.
    pub fn get(&self, name: &str) -> Option<BulletProfile> {
        self.user_profiles()
            .get(name)
            .cloned()
            .or_else(|| builtin_profile(name))
    }

    /// Snapshot of the user profiles.
    pub fn user_profiles(&self) -> Arc<UserProfiles> {
        let guard = self.user.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate, insert (or overwrite) and persist a user profile.
    ///
    /// The updated map is written to the store before it replaces the
    /// in-memory one; if the write fails nothing changes.
    pub fn add_profile(
        &self,
        name: &str,
        muzzle_velocity: &str,
        drag_coefficient: &str,
    ) -> Result<BulletProfile, ProfileError> {
        let profile = BulletProfile::parse(name, muzzle_velocity, drag_coefficient)?;

        let mut guard = self.user.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = UserProfiles::clone(&guard);
        updated.insert(profile.clone());

        let encoded = updated.to_json().map_err(crate::error::StoreError::from)?;
        self.store.set(PROFILE_STORE_KEY, &encoded)?;
        *guard = Arc::new(updated);

        info!(
            "saved profile {:?} ({} ft/s, bc {})",
            profile.name, profile.muzzle_velocity, profile.drag_coefficient
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    struct FailingStore;

    impl ProfileStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
    }

    fn empty_repository() -> ProfileRepository<MemoryStore> {
        ProfileRepository::load_profiles(MemoryStore::new())
    }

    #[test]
    fn test_builtin_table() {
        let builtins = builtin_profiles();
        assert_eq!(builtins.len(), 9);
        assert_eq!(builtins[0], BulletProfile::new("308 - 175gr SMK", 2650.0, 0.505));
        assert_eq!(builtins[8], BulletProfile::new("22LR - 40gr", 1100.0, 0.120));

        for profile in &builtins {
            assert!(profile.muzzle_velocity > 0.0);
            assert!(profile.drag_coefficient > 0.0);
        }
    }

    #[test]
    fn test_empty_repository_lists_builtins() {
        let repository = empty_repository();
        let catalog = repository.list_profiles();
        assert_eq!(catalog.len(), 9);
        assert!(catalog.entries().iter().all(|entry| entry.source == ProfileSource::BuiltIn));
        assert_eq!(catalog.names()[0], "308 - 175gr SMK");
    }

    #[test]
    fn test_add_profile() {
        let repository = empty_repository();
        let added = repository.add_profile("X", "2700", "0.5").unwrap();
        assert_eq!(added, BulletProfile::new("X", 2700.0, 0.5));

        let catalog = repository.list_profiles();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get("X"), Some(&BulletProfile::new("X", 2700.0, 0.5)));
        assert_eq!(catalog.names().last(), Some(&"X"));
    }

    #[test]
    fn test_add_profile_overwrites() {
        let repository = empty_repository();
        repository.add_profile("X", "2700", "0.5").unwrap();
        repository.add_profile("Y", "2500", "0.4").unwrap();
        repository.add_profile("X", "2800", "0.45").unwrap();

        let catalog = repository.list_profiles();
        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog.names().iter().filter(|name| **name == "X").count(), 1);
        assert_eq!(catalog.get("X"), Some(&BulletProfile::new("X", 2800.0, 0.45)));

        // Overwrite keeps the original insertion slot
        assert_eq!(&catalog.names()[9..], &["X", "Y"]);
    }

    #[test]
    fn test_user_profile_shadows_builtin() {
        let repository = empty_repository();
        repository.add_profile("223 - 77gr TMK", "2650", "0.39").unwrap();

        let catalog = repository.list_profiles();
        assert_eq!(catalog.len(), 9);

        let entry = &catalog.entries()[6];
        assert_eq!(entry.profile, BulletProfile::new("223 - 77gr TMK", 2650.0, 0.39));
        assert_eq!(entry.source, ProfileSource::User);

        assert_eq!(repository.get("223 - 77gr TMK").unwrap().muzzle_velocity, 2650.0);
        assert_eq!(builtin_profiles()[6].muzzle_velocity, 2750.0);
    }

    #[test]
    fn test_get_falls_back_to_builtin() {
        let repository = empty_repository();
        assert_eq!(repository.get("22LR - 40gr").unwrap().muzzle_velocity, 1100.0);
        assert_eq!(repository.get("missing"), None);
    }

    #[test]
    fn test_add_profile_trims_input() {
        let repository = empty_repository();
        let added = repository.add_profile("  6mm GT  ", " 2900 ", "0.6 ").unwrap();
        assert_eq!(added, BulletProfile::new("6mm GT", 2900.0, 0.6));
    }

    #[test]
    fn test_validation_errors() {
        let repository = empty_repository();

        let cases = [
            ("", "2700", "0.5", ValidationError::EmptyName),
            ("   ", "2700", "0.5", ValidationError::EmptyName),
            ("X", "", "0.5", ValidationError::MissingField { field: "muzzle_velocity" }),
            ("X", "2700", " ", ValidationError::MissingField { field: "drag_coefficient" }),
            ("X", "fast", "0.5", ValidationError::Unparseable {
                field: "muzzle_velocity",
                value: "fast".to_string(),
            }),
            ("X", "2700", "NaN", ValidationError::Unparseable {
                field: "drag_coefficient",
                value: "NaN".to_string(),
            }),
            ("X", "inf", "0.5", ValidationError::Unparseable {
                field: "muzzle_velocity",
                value: "inf".to_string(),
            }),
        ];

        for (name, velocity, bc, expected) in cases {
            match repository.add_profile(name, velocity, bc) {
                Err(ProfileError::Validation(err)) => assert_eq!(err, expected),
                other => panic!("expected validation error, got {other:?}"),
            }
        }

        // Nothing was stored or persisted
        assert!(repository.user_profiles().is_empty());
        assert_eq!(repository.store().get(PROFILE_STORE_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_profile_persists() {
        let store = Arc::new(MemoryStore::new());
        let repository = ProfileRepository::load_profiles(Arc::clone(&store));
        repository.add_profile("X", "2700", "0.5").unwrap();

        let stored = store.get(PROFILE_STORE_KEY).unwrap().unwrap();
        assert_eq!(stored, r#"{"X":{"velocity":2700.0,"bc":0.5}}"#);

        // A fresh repository over the same store sees the profile
        let reloaded = ProfileRepository::load_profiles(store);
        assert_eq!(reloaded.get("X"), Some(BulletProfile::new("X", 2700.0, 0.5)));
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let repository = ProfileRepository::load_profiles(FailingStore);
        assert!(repository.user_profiles().is_empty());

        let result = repository.add_profile("X", "2700", "0.5");
        assert!(matches!(result, Err(ProfileError::Store(_))));
        assert!(repository.user_profiles().is_empty());
        assert_eq!(repository.list_profiles().len(), 9);
    }

    #[test]
    fn test_corrupt_storage_is_empty() {
        for stored in ["not json", "[1, 2, 3]", r#"{"X": {"velocity": "fast"}}"#, ""] {
            let store = MemoryStore::with_value(PROFILE_STORE_KEY, stored);
            let repository = ProfileRepository::load_profiles(store);
            assert!(repository.user_profiles().is_empty(), "stored {stored:?}");
            assert_eq!(repository.list_profiles().len(), 9);
        }
    }

    #[test]
    fn test_loads_browser_format() {
        let stored = r#"{"6mm GT - 109gr":{"velocity":2900,"bc":0.6},"7mm PRC - 180gr":{"velocity":3000,"bc":0.796}}"#;
        let repository = ProfileRepository::load_profiles(MemoryStore::with_value(PROFILE_STORE_KEY, stored));

        let user = repository.user_profiles();
        assert_eq!(user.len(), 2);
        let names: Vec<&str> = user.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["6mm GT - 109gr", "7mm PRC - 180gr"]);
        assert_eq!(user.get("7mm PRC - 180gr").unwrap().drag_coefficient, 0.796);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut profiles = UserProfiles::new();
        profiles.insert(BulletProfile::new("b", 2810.0, 0.777));
        profiles.insert(BulletProfile::new("a", 1100.5, 0.1234567890123));

        let restored = UserProfiles::from_json(&profiles.to_json().unwrap()).unwrap();
        assert_eq!(restored, profiles);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let repository = empty_repository();
        repository.add_profile("X", "2700", "0.5").unwrap();

        let snapshot = repository.user_profiles();
        repository.add_profile("Y", "2500", "0.4").unwrap();

        // Earlier snapshot is unaffected by the later write
        assert_eq!(snapshot.len(), 1);
        assert_eq!(repository.user_profiles().len(), 2);
    }
}
