#[allow(non_snake_case)]
pub mod AqueousEquilibrium;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Utils;
#[allow(non_snake_case)]
pub mod library_manager;
