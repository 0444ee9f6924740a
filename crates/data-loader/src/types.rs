//! Core domain types for filmography data.
//!
//! Entities are people and titles, both addressed by an [`EntityKey`] (the
//! URL path of their page). Credits link the two and carry the role the
//! person had on the title. Everything the distance search needs is derived
//! from these credits.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use url::Url;

/// Site root that entity keys are resolved against
pub const BASE_URL: &str = "https://www.imdb.com/";

// =============================================================================
// Entity keys
// =============================================================================

/// Stable unique key of an entity: the path of its page, e.g. `/name/nm0000138/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Wrap an already-normalized path without checking it.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build a key from user input.
    ///
    /// Accepts an absolute URL (`https://www.imdb.com/name/nm0000138/?ref_=x`)
    /// or a path (`/name/nm0000138/`, `name/nm0000138/`). Only the path is
    /// kept; query strings and fragments are dropped.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DataLoadError::InvalidKey {
                input: input.to_string(),
                reason: "key is empty".to_string(),
            });
        }

        let resolved = base_url()?
            .join(trimmed)
            .map_err(|e| DataLoadError::InvalidKey {
                input: input.to_string(),
                reason: e.to_string(),
            })?;

        let path = resolved.path();
        if path == "/" {
            return Err(DataLoadError::InvalidKey {
                input: input.to_string(),
                reason: "URL has no path".to_string(),
            });
        }
        Ok(Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full URL of the entity's page.
    pub fn absolute_url(&self) -> Result<String> {
        let url = base_url()?
            .join(&self.0)
            .map_err(|e| DataLoadError::InvalidKey {
                input: self.0.clone(),
                reason: e.to_string(),
            })?;
        Ok(url.to_string())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for EntityKey {
    fn from(path: String) -> Self {
        Self(path)
    }
}

fn base_url() -> Result<Url> {
    Url::parse(BASE_URL).map_err(|e| DataLoadError::InvalidKey {
        input: BASE_URL.to_string(),
        reason: e.to_string(),
    })
}

/// Which side of the actor/movie relation a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Title,
}

// =============================================================================
// People and titles
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub key: EntityKey,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Title {
    pub key: EntityKey,
    pub title: String,
    /// Year extracted from title (e.g., "Titanic (1997)")
    pub year: Option<u16>,
    pub kind: TitleKind,
    pub status: ReleaseStatus,
}

impl Title {
    /// Released full feature film; the only titles that count as an actor's movies.
    pub fn is_released_feature(&self) -> bool {
        self.kind == TitleKind::Feature && self.status == ReleaseStatus::Released
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TitleKind {
    Feature,
    TvSeries,
    TvMovie,
    Short,
    Video,
    VideoGame,
    MusicVideo,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseStatus {
    Released,
    InProduction,
}

// =============================================================================
// Credits
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Actor,
    Actress,
    Director,
    Producer,
    Writer,
    Other,
}

impl Role {
    /// Whether this credit is an on-screen acting credit
    pub fn is_acting(self) -> bool {
        matches!(self, Role::Actor | Role::Actress)
    }
}

/// One person's involvement in one title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub person: EntityKey,
    pub title: EntityKey,
    pub role: Role,
}

// =============================================================================
// Relations
// =============================================================================

/// One element of an entity's relation list (a movie of an actor, or an actor of a movie)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub name: String,
    pub key: EntityKey,
}

impl RelatedEntity {
    pub fn new(name: impl Into<String>, key: impl Into<EntityKey>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Ordered, shareable relation list. Order matters to positional pairing.
pub type Relations = Arc<[RelatedEntity]>;

/// Options applied when deriving a relation list from the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationQuery {
    /// Stop after this many related entities; `None` returns all of them
    pub limit: Option<NonZeroUsize>,
    /// Sort the (already limited) result by name, then key
    pub sorted: bool,
}

impl RelationQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = NonZeroUsize::new(limit);
        self
    }

    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }
}

// =============================================================================
// FilmographyIndex - the in-memory store
// =============================================================================

/// Holds every person, title and credit of a dataset.
///
/// Credit lists keep insertion order: per person it is the filmography
/// order, per title it is the billing order.
#[derive(Debug, Default)]
pub struct FilmographyIndex {
    pub(crate) people: HashMap<EntityKey, Person>,
    pub(crate) titles: HashMap<EntityKey, Title>,
    /// Credits in the order they appear on the person's page
    pub(crate) person_credits: HashMap<EntityKey, Vec<Credit>>,
    /// Credits in the order they appear on the title's cast page
    pub(crate) title_credits: HashMap<EntityKey, Vec<Credit>>,
}

impl FilmographyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_person(&self, key: &EntityKey) -> Option<&Person> {
        self.people.get(key)
    }

    pub fn get_title(&self, key: &EntityKey) -> Option<&Title> {
        self.titles.get(key)
    }

    /// All credits of a person; empty if the person has none or is unknown
    pub fn get_person_credits(&self, key: &EntityKey) -> &[Credit] {
        self.person_credits
            .get(key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All credits of a title; empty if the title has none or is unknown
    pub fn get_title_credits(&self, key: &EntityKey) -> &[Credit] {
        self.title_credits
            .get(key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn entity_kind(&self, key: &EntityKey) -> Option<EntityKind> {
        if self.people.contains_key(key) {
            Some(EntityKind::Person)
        } else if self.titles.contains_key(key) {
            Some(EntityKind::Title)
        } else {
            None
        }
    }

    /// Keys of every person, sorted for stable output
    pub fn person_keys(&self) -> Vec<EntityKey> {
        let mut keys: Vec<EntityKey> = self.people.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn insert_person(&mut self, person: Person) {
        self.people.insert(person.key.clone(), person);
    }

    pub fn insert_title(&mut self, title: Title) {
        self.titles.insert(title.key.clone(), title);
    }

    /// Insert a credit and update both credit lists
    pub fn insert_credit(&mut self, credit: Credit) {
        self.person_credits
            .entry(credit.person.clone())
            .or_default()
            .push(credit.clone());

        self.title_credits
            .entry(credit.title.clone())
            .or_default()
            .push(credit);
    }

    /// (people, titles, credits)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_credits = self.person_credits.values().map(|v| v.len()).sum();
        (self.people.len(), self.titles.len(), total_credits)
    }
}
