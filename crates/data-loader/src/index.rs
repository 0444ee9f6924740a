//! FilmographyIndex loading and relation queries.
//!
//! Loading parses the three dataset files in parallel, inserts everything
//! into the index and validates that every credit points at a known person
//! and title. The relation queries turn credits into the ordered lists the
//! distance search walks over.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;

impl FilmographyIndex {
    /// Load a filmography dataset from a directory
    ///
    /// Expects `people.dat`, `titles.dat` and `credits.dat` inside `data_dir`.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        let people_path = data_dir.join("people.dat");
        let titles_path = data_dir.join("titles.dat");
        let credits_path = data_dir.join("credits.dat");

        // Parse all three files in parallel
        let ((people, titles), credits) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_people(&people_path),
                    || parser::parse_titles(&titles_path),
                )
            },
            || parser::parse_credits(&credits_path),
        );

        let people = people?;
        let titles = titles?;
        let credits = credits?;

        let mut index = FilmographyIndex::new();
        for person in people {
            index.insert_person(person);
        }
        for title in titles {
            index.insert_title(title);
        }
        // Insert in file order so credit lists keep filmography and billing order
        for credit in credits {
            index.insert_credit(credit);
        }

        index.validate()?;
        Ok(index)
    }

    /// Check that every credit references a loaded person and title
    pub fn validate(&self) -> Result<()> {
        for credits in self.person_credits.values() {
            for credit in credits {
                if !self.people.contains_key(&credit.person) {
                    return Err(DataLoadError::MissingReference {
                        entity: "Person".to_string(),
                        key: credit.person.to_string(),
                    });
                }
                if !self.titles.contains_key(&credit.title) {
                    return Err(DataLoadError::MissingReference {
                        entity: "Title".to_string(),
                        key: credit.title.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Movies an actor played in.
    ///
    /// Keeps only acting credits on released feature films, in filmography
    /// order. Returns `None` if the person is unknown.
    pub fn movies_by_actor(
        &self,
        actor: &EntityKey,
        query: &RelationQuery,
    ) -> Option<Vec<RelatedEntity>> {
        self.people.get(actor)?;

        let movies = self
            .get_person_credits(actor)
            .iter()
            .filter(|credit| credit.role.is_acting())
            .filter_map(|credit| self.titles.get(&credit.title))
            .filter(|title| title.is_released_feature())
            .map(|title| RelatedEntity::new(title.title.clone(), title.key.clone()));

        Some(finish_relations(movies, query))
    }

    /// Actors in a movie's cast, in billing order.
    ///
    /// Returns `None` if the title is unknown.
    pub fn actors_by_movie(
        &self,
        movie: &EntityKey,
        query: &RelationQuery,
    ) -> Option<Vec<RelatedEntity>> {
        self.titles.get(movie)?;

        let actors = self
            .get_title_credits(movie)
            .iter()
            .filter(|credit| credit.role.is_acting())
            .filter_map(|credit| self.people.get(&credit.person))
            .map(|person| RelatedEntity::new(person.name.clone(), person.key.clone()));

        Some(finish_relations(actors, query))
    }

    /// People whose name contains `needle`, case-insensitive, sorted by name
    pub fn search_people(&self, needle: &str) -> Vec<&Person> {
        let needle = needle.to_lowercase();
        let mut matches: Vec<&Person> = self
            .people
            .values()
            .filter(|person| person.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        matches
    }
}

/// Apply the limit while collecting, then sort if asked
fn finish_relations(
    related: impl Iterator<Item = RelatedEntity>,
    query: &RelationQuery,
) -> Vec<RelatedEntity> {
    let mut result: Vec<RelatedEntity> = match query.limit {
        Some(limit) => related.take(limit.get()).collect(),
        None => related.collect(),
    };
    if query.sorted {
        result.sort();
    }
    result
}
