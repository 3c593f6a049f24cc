//! Logger initialisation for the binary, the examples and integration runs. Library code only
//! talks to the `log` facade.
use crate::AqueousEquilibrium::errors::AqueousEquilibriumError;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;

/// Terminal logger at `level`, plus a file logger when `log_file` is given. Can succeed only
/// once per process.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), AqueousEquilibriumError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)
        .map_err(|e| AqueousEquilibriumError::Config(format!("logger already set: {}", e)))
}
