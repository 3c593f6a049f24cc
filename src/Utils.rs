/// Reading and writing sectioned reaction database documents (SOLUTIONS, IRREVERSIBLE,
/// PHASES, GASES, SPECIES).
///
/// # Examples
/// ```no_run
/// use AquaEquilibria::Utils::load_from_file::LoadData;
/// let ld = LoadData::new("my_database.txt".to_string());
/// let database = ld.load_database().unwrap();
/// database.pretty_print();
/// ```
pub mod load_from_file;
/// simplelog set-up: terminal logger and optional log file
pub mod logger;
