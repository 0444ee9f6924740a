//! Parser for filmography data files.
//!
//! Three `::`-separated files make up a dataset:
//! - people.dat: key::name
//! - titles.dat: key::title::kind::status
//! - credits.dat: person_key::title_key::role
//!
//! Line order in credits.dat is meaningful: it is the filmography order for
//! each person and the billing order for each title.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::path::Path;

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Pull the next `::` field or report which one is missing
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    field: &str,
) -> Result<&'a str> {
    parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Missing {}", field),
        })
}

fn parse_key(s: &str, file: &str, line: usize) -> Result<EntityKey> {
    EntityKey::parse(s).map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: e.to_string(),
    })
}

/// Iterate over non-empty lines with 1-based line numbers
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse the people.dat file
///
/// Format: key::name
pub fn parse_people(path: &Path) -> Result<Vec<Person>> {
    let lines = read_lines(path)?;
    let mut people = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.split("::");
        let key = next_field(&mut parts, "people.dat", line_no, "key")?;
        let name = next_field(&mut parts, "people.dat", line_no, "name")?;

        people.push(Person {
            key: parse_key(key, "people.dat", line_no)?,
            name: name.to_string(),
        });
    }

    Ok(people)
}

/// Parse the titles.dat file
///
/// Format: key::title::kind::status
///
/// The title usually ends with its year in parentheses: "Titanic (1997)"
pub fn parse_titles(path: &Path) -> Result<Vec<Title>> {
    let lines = read_lines(path)?;
    let mut titles = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.split("::");
        let key = next_field(&mut parts, "titles.dat", line_no, "key")?;
        let title = next_field(&mut parts, "titles.dat", line_no, "title")?;
        let kind = next_field(&mut parts, "titles.dat", line_no, "kind")?;
        let status = next_field(&mut parts, "titles.dat", line_no, "status")?;

        titles.push(Title {
            key: parse_key(key, "titles.dat", line_no)?,
            title: title.to_string(),
            year: extract_year_from_title(title),
            kind: parse_title_kind(kind),
            status: parse_release_status(status)?,
        });
    }

    Ok(titles)
}

/// Parse the credits.dat file
///
/// Format: person_key::title_key::role
pub fn parse_credits(path: &Path) -> Result<Vec<Credit>> {
    let lines = read_lines(path)?;
    let mut credits = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.split("::");
        let person = next_field(&mut parts, "credits.dat", line_no, "person key")?;
        let title = next_field(&mut parts, "credits.dat", line_no, "title key")?;
        let role = next_field(&mut parts, "credits.dat", line_no, "role")?;

        credits.push(Credit {
            person: parse_key(person, "credits.dat", line_no)?,
            title: parse_key(title, "credits.dat", line_no)?,
            role: parse_role(role),
        });
    }

    Ok(credits)
}

/// Extract year from title
///
/// Example: "Titanic (1997)" -> Some(1997)
///          "Untitled Project" -> None
fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        if let Ok(year) = title[start + 1..end].parse::<u16>() {
            return Some(year);
        }
    }
    None
}

/// Unknown kinds are kept as `Other` so they never count as feature films
fn parse_title_kind(s: &str) -> TitleKind {
    match s.to_ascii_lowercase().as_str() {
        "feature" | "movie" => TitleKind::Feature,
        "tv_series" => TitleKind::TvSeries,
        "tv_movie" => TitleKind::TvMovie,
        "short" => TitleKind::Short,
        "video" => TitleKind::Video,
        "video_game" => TitleKind::VideoGame,
        "music_video" => TitleKind::MusicVideo,
        _ => TitleKind::Other,
    }
}

fn parse_release_status(s: &str) -> Result<ReleaseStatus> {
    match s.to_ascii_lowercase().as_str() {
        "released" => Ok(ReleaseStatus::Released),
        "in_production" => Ok(ReleaseStatus::InProduction),
        _ => Err(DataLoadError::InvalidValue {
            field: "status".to_string(),
            value: s.to_string(),
        }),
    }
}

fn parse_role(s: &str) -> Role {
    match s.to_ascii_lowercase().as_str() {
        "actor" => Role::Actor,
        "actress" => Role::Actress,
        "director" => Role::Director,
        "producer" => Role::Producer,
        "writer" => Role::Writer,
        _ => Role::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year_from_title("Titanic (1997)"), Some(1997));
        assert_eq!(extract_year_from_title("Untitled Project"), None);
    }

    #[test]
    fn test_parse_title_kind() {
        assert_eq!(parse_title_kind("feature"), TitleKind::Feature);
        assert_eq!(parse_title_kind("TV_SERIES"), TitleKind::TvSeries);
        assert_eq!(parse_title_kind("podcast"), TitleKind::Other);
    }

    #[test]
    fn test_parse_people_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "people.dat",
            "/name/nm1/::Kate Winslet\n\n/name/nm2/::Leonardo DiCaprio\n",
        );

        let people = parse_people(&path).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].name, "Leonardo DiCaprio");
        assert_eq!(people[1].key.as_str(), "/name/nm2/");
    }

    #[test]
    fn test_parse_titles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "titles.dat",
            "/title/tt1/::Titanic (1997)::feature::released\n\
             /title/tt2/::Untitled::feature::in_production\n",
        );

        let titles = parse_titles(&path).unwrap();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].year, Some(1997));
        assert!(titles[0].is_released_feature());
        assert_eq!(titles[1].status, ReleaseStatus::InProduction);
    }

    #[test]
    fn test_parse_titles_rejects_unknown_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "titles.dat", "/title/tt1/::Film::feature::rumoured\n");

        let err = parse_titles(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_parse_credits_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "credits.dat",
            "/name/nm1/::/title/tt1/::actress\n/name/nm2/::/title/tt1/\n",
        );

        let err = parse_credits(&path).unwrap_err();
        match err {
            DataLoadError::ParseError { file, line, reason } => {
                assert_eq!(file, "credits.dat");
                assert_eq!(line, 2);
                assert_eq!(reason, "Missing role");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_people(Path::new("/definitely/not/here/people.dat")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
