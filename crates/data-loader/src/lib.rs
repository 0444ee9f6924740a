//! # Data Loader Crate
//!
//! Loads and indexes a filmography dataset: people, titles and the credits
//! that connect them.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (EntityKey, Person, Title, Credit, FilmographyIndex)
//! - **parser**: Parse `::`-separated .dat files into Rust structs
//! - **index**: Load, validate and query the index
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{EntityKey, FilmographyIndex, RelationQuery};
//! use std::path::Path;
//!
//! let index = FilmographyIndex::load_from_files(Path::new("data/sample"))?;
//!
//! let actor = EntityKey::parse("https://www.imdb.com/name/nm0000138/")?;
//! let movies = index.movies_by_actor(&actor, &RelationQuery::all()).unwrap();
//! println!("{} played in {} movies", actor, movies.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use types::{
    BASE_URL,
    EntityKey,
    EntityKind,
    Person,
    Title,
    TitleKind,
    ReleaseStatus,
    Credit,
    Role,
    RelatedEntity,
    Relations,
    RelationQuery,
    FilmographyIndex,
};
