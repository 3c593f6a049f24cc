use AquaEquilibria::Examples::aqueous_examples::aqueous_examples;
use AquaEquilibria::Utils::logger::init_logger;
use AquaEquilibria::library_manager::LibraryManager;
use log::error;

pub fn main() {
    let manager = LibraryManager::new();
    if let Err(e) = init_logger(manager.log_level(), None) {
        eprintln!("{}", e);
    }
    let task: usize = 1;
    if let Err(e) = aqueous_examples(task) {
        error!("task {} failed: {}", task, e);
    }
}
