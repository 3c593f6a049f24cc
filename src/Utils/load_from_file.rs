//! Sectioned database documents.
//!
//! A document is plain text where every section starts with a header line and is followed by
//! JSON: an array of reaction records for SOLUTIONS, IRREVERSIBLE, PHASES and GASES, an object
//! for SPECIES. Sections may come in any order and may be absent; text before the first header
//! is ignored.
//! ```text
//! SOLUTIONS
//! [{"H2O": -1.0, "H+": 1.0, "OH-": 1.0, "type": "rev", "log_K25": -13.998}]
//! PHASES
//! [{"CaCO3(s)": -1.0, "Ca++": 1.0, "CO3--": 1.0, "phase_name": "Calcite", "type": "rev", "log_K25": -8.48}]
//! ```
use crate::AqueousEquilibrium::errors::AqueousEquilibriumError;
use crate::AqueousEquilibrium::reaction_database::ReactionDatabase;
use log::{error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

pub const SECTION_HEADERS: [&str; 5] = ["SOLUTIONS", "IRREVERSIBLE", "PHASES", "GASES", "SPECIES"];

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_database(&self) -> Result<ReactionDatabase, AqueousEquilibriumError> {
        load_database_from_file(&self.file_name)
    }
    pub fn save_database(&self, database: &ReactionDatabase) -> Result<(), AqueousEquilibriumError> {
        create_database_document(database, &self.file_name)
    }
}

fn read_lines(file_name: &str) -> Result<Vec<String>, AqueousEquilibriumError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(AqueousEquilibriumError::Config(format!(
            "File '{}' does not exist",
            file_name
        )));
    }
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;
    Ok(lines)
}

/// the section header a line stands for, in any letter case
fn header_of(line: &str) -> Option<&'static str> {
    let trimmed = line.trim().to_uppercase();
    SECTION_HEADERS.iter().copied().find(|header| *header == trimmed)
}

fn is_header(line: &str) -> bool {
    header_of(line).is_some()
}

/// line range of the body of a section: after its header, up to the next header or the end
fn find_section(lines: &[String], header: &str) -> Option<(usize, usize)> {
    let start = lines
        .iter()
        .position(|line| header_of(line) == Some(header))?
        + 1;
    let end = (start..lines.len())
        .find(|i| is_header(&lines[*i]))
        .unwrap_or(lines.len());
    Some((start, end))
}

fn parse_section<T: DeserializeOwned>(
    lines: &[String],
    start: usize,
    end: usize,
    header: &str,
    file_name: &str,
) -> Result<T, AqueousEquilibriumError> {
    let section = lines[start..end].join("\n");
    serde_json::from_str(&section).map_err(|e| {
        let error_line = e.line();
        let error_column = e.column();
        // line numbers of serde_json start at 1
        let actual_line = start + error_line.saturating_sub(1);
        error!(
            "Error parsing {} section of '{}' at line {}, column {} (line {} in file): {}",
            header,
            file_name,
            error_line,
            error_column,
            actual_line + 1,
            e
        );
        if let Some(problem_line) = lines.get(actual_line) {
            error!("Problematic line: {}", problem_line);
            if error_column >= 1 && error_column <= problem_line.len() {
                error!("{}", " ".repeat(error_column - 1) + "^");
            }
        }
        AqueousEquilibriumError::Json(e)
    })
}

fn load_section<T: DeserializeOwned + Default>(
    lines: &[String],
    header: &str,
    file_name: &str,
) -> Result<Option<T>, AqueousEquilibriumError> {
    let Some((start, end)) = find_section(lines, header) else {
        return Ok(None);
    };
    if lines[start..end].iter().all(|line| line.trim().is_empty()) {
        warn!("Section {} of '{}' is empty", header, file_name);
        return Ok(Some(T::default()));
    }
    parse_section(lines, start, end, header, file_name).map(Some)
}

/// Reads a database document. At least one section header must be present; every record
/// goes through the same validation as the built-in database.
pub fn load_database_from_file(file_name: &str) -> Result<ReactionDatabase, AqueousEquilibriumError> {
    let lines = read_lines(file_name)?;
    if !SECTION_HEADERS
        .iter()
        .any(|header| find_section(&lines, header).is_some())
    {
        return Err(AqueousEquilibriumError::Config(format!(
            "No database section header ({}) found in file '{}'",
            SECTION_HEADERS.join(", "),
            file_name
        )));
    }
    let database = ReactionDatabase {
        solutions: load_section(&lines, "SOLUTIONS", file_name)?.unwrap_or_default(),
        irreversible: load_section(&lines, "IRREVERSIBLE", file_name)?.unwrap_or_default(),
        phases: load_section(&lines, "PHASES", file_name)?.unwrap_or_default(),
        gases: load_section(&lines, "GASES", file_name)?.unwrap_or_default(),
        species: load_section(&lines, "SPECIES", file_name)?.unwrap_or_default(),
    };
    database.validate()?;
    if database.is_empty() {
        warn!("Database loaded from '{}' contains no reactions", file_name);
    }
    info!(
        "Loaded {} reactions from file '{}'",
        database.len(),
        file_name
    );
    Ok(database)
}

fn write_section<T: Serialize>(
    file: &mut File,
    header: &str,
    section: &T,
) -> Result<(), AqueousEquilibriumError> {
    writeln!(file, "{}", header)?;
    writeln!(file, "{}", serde_json::to_string_pretty(section)?)?;
    Ok(())
}

/// Appends every section of `database` to the file (created if needed).
pub fn create_database_document(
    database: &ReactionDatabase,
    file_name: &str,
) -> Result<(), AqueousEquilibriumError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_name)?;
    write_section(&mut file, "SOLUTIONS", &database.solutions)?;
    write_section(&mut file, "IRREVERSIBLE", &database.irreversible)?;
    write_section(&mut file, "PHASES", &database.phases)?;
    write_section(&mut file, "GASES", &database.gases)?;
    write_section(&mut file, "SPECIES", &database.species)?;
    info!("Database document written to '{}'", file_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AqueousEquilibrium::equilibrium_constants::log_k;
    use std::io::Read;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_database_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Some header text").unwrap();
        writeln!(temp_file, "PHASES").unwrap();
        writeln!(temp_file, "[").unwrap();
        writeln!(
            temp_file,
            "  {{\"CaCO3(s)\": -1.0, \"Ca++\": 1.0, \"CO3--\": 1.0, \"phase_name\": \"Calcite\", \"type\": \"rev\", \"log_K25\": -8.48}}"
        )
        .unwrap();
        writeln!(temp_file, "]").unwrap();
        writeln!(temp_file, "SOLUTIONS").unwrap();
        writeln!(
            temp_file,
            "[{{\"HCO3-\": -1.0, \"H+\": 1.0, \"CO3--\": 1.0, \"type\": \"rev\", \"log_K25\": -10.329}}]"
        )
        .unwrap();
        writeln!(temp_file, "SPECIES").unwrap();
        writeln!(temp_file, "{{\"Ca++\": {{\"charge\": 2}}}}").unwrap();

        let file_path = temp_file.path().to_str().unwrap();
        let database = load_database_from_file(file_path).unwrap();
        assert_eq!(database.solutions.len(), 1);
        assert_eq!(database.phases.len(), 1);
        assert!(database.irreversible.is_empty());
        assert!(database.gases.is_empty());
        assert_eq!(database.phases[0].phase_name.as_deref(), Some("Calcite"));
        assert_eq!(log_k(&database.solutions[0], 298.15), -10.329);
        assert_eq!(database.species_info("Ca++").unwrap()["charge"], 2);
    }

    #[test]
    fn test_load_database_file_not_found() {
        let result = load_database_from_file("non_existent_file.txt");
        assert!(matches!(result, Err(AqueousEquilibriumError::Config(ref m)) if m.contains("does not exist")));
    }

    #[test]
    fn test_load_database_no_header() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[{{\"H2O\": -1.0, \"type\": \"rev\"}}]").unwrap();
        let result = load_database_from_file(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(AqueousEquilibriumError::Config(ref m)) if m.contains("No database section header")));
    }

    #[test]
    fn test_load_database_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "SOLUTIONS").unwrap();
        writeln!(temp_file, "[").unwrap();
        writeln!(temp_file, "  {{\"H2O\": -1.0, \"H+\": 1.0 \"OH-\": 1.0, \"type\": \"rev\"}}").unwrap();
        writeln!(temp_file, "]").unwrap();
        let result = load_database_from_file(temp_file.path().to_str().unwrap());
        match result {
            Err(AqueousEquilibriumError::Json(e)) => assert_eq!(e.line(), 2),
            other => panic!("Expected a JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_record_is_reported() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "GASES").unwrap();
        writeln!(
            temp_file,
            "[{{\"CO2\": 1.0, \"CO2(g)\": -1.0, \"type\": \"rev\", \"log_K_coefs\": [1, 2, 3, 4, 5, 6, 7]}}]"
        )
        .unwrap();
        let result = load_database_from_file(temp_file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_lowercase_header_ends_the_previous_section() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Solutions").unwrap();
        writeln!(
            temp_file,
            "[{{\"H2O\": -1.0, \"H+\": 1.0, \"OH-\": 1.0, \"type\": \"rev\", \"log_K25\": -13.998}}]"
        )
        .unwrap();
        writeln!(temp_file, "phases").unwrap();
        writeln!(
            temp_file,
            "[{{\"NaCl(s)\": -1.0, \"Na+\": 1.0, \"Cl-\": 1.0, \"phase_name\": \"Halite\", \"type\": \"rev\", \"log_K25\": 1.57}}]"
        )
        .unwrap();
        let database = load_database_from_file(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(database.solutions.len(), 1);
        assert_eq!(database.phases.len(), 1);
        assert_eq!(database.phases[0].phase_name.as_deref(), Some("Halite"));
    }

    #[test]
    fn test_empty_section() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "IRREVERSIBLE").unwrap();
        writeln!(temp_file, "").unwrap();
        writeln!(temp_file, "SOLUTIONS").unwrap();
        writeln!(temp_file, "[]").unwrap();
        let database = load_database_from_file(temp_file.path().to_str().unwrap()).unwrap();
        assert!(database.is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let database = ReactionDatabase::default_database().unwrap();
        let mut temp_file = NamedTempFile::new().unwrap();
        let mut file2 = temp_file.reopen().unwrap();
        writeln!(temp_file, "Existing content").unwrap();
        let file_path = temp_file.path().to_str().unwrap();

        let ld = LoadData::new(file_path.to_owned());
        ld.save_database(&database).unwrap();
        let mut file_content = String::new();
        file2.read_to_string(&mut file_content).unwrap();
        assert!(file_content.contains("Existing content\n"));
        for header in SECTION_HEADERS {
            assert!(file_content.contains(header));
        }

        let parsed = ld.load_database().unwrap();
        assert_eq!(parsed, database);
    }
}
