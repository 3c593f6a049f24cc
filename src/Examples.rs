/// runnable tasks for the aqueous equilibrium pipeline, selected by number from main.rs
pub mod aqueous_examples;
