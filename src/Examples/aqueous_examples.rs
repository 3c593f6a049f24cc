use crate::AqueousEquilibrium::equilibrium_constants::{log_k_for_T_range, log_k_sym};
use crate::AqueousEquilibrium::errors::AqueousEquilibriumError;
use crate::AqueousEquilibrium::network_closure::NetworkClosure;
use crate::AqueousEquilibrium::reaction_database::ReactionDatabase;
use crate::AqueousEquilibrium::system_builder::AqueousSystem;
use crate::library_manager::LibraryManager;
use log::info;
use nalgebra::DVector;
use prettytable::{Table, row};

pub fn aqueous_examples(task: usize) -> Result<(), AqueousEquilibriumError> {
    match task {
        0 => {
            // built-in database
            let database = ReactionDatabase::default_database()?;
            database.pretty_print();
        }
        1 => {
            // sodium bicarbonate and calcium chloride in water
            let manager = LibraryManager::new();
            let database = manager.database()?;
            let system = AqueousSystem::from_species(
                &["NaHCO3", "CaCl2"],
                &database,
                manager.default_temperature(),
            )?;
            system.print_summary();
            println!("formula matrix {}", system.formula_matrix);
            println!("stoichiometric matrix {}", system.stoich_matrix);
        }
        2 => {
            // system defined by its elements
            let database = ReactionDatabase::default_database()?;
            let system = AqueousSystem::from_elements(&["C", "Ca", "Mg", "Na", "Cl"], &database, 298.15)?;
            system.print_summary();
            println!("most stable phases: {:?}", system.stable_phases);
        }
        3 => {
            // log K of the CaCO3 polymorphs from 5 to 95 C
            let database = ReactionDatabase::default_database()?;
            let closure = NetworkClosure::new(database.possible_solid_reactions());
            let network = closure.expand(&["Ca++", "CO3--"]);
            let (T0, Tend, n) = (278.15, 368.15, 9);
            let mut table = Table::new();
            let mut header = vec!["T, K".to_string()];
            header.extend(network.reactions.iter().filter_map(|r| r.phase_name.clone()));
            table.add_row(header.iter().collect());
            let curves: Vec<Vec<f64>> = network
                .reactions
                .iter()
                .map(|r| log_k_for_T_range(r, T0, Tend, n))
                .collect();
            for i in 0..n {
                let T = T0 + i as f64 * (Tend - T0) / n as f64;
                let mut cells = vec![format!("{:.2}", T)];
                cells.extend(curves.iter().map(|c| format!("{:.4}", c[i])));
                table.add_row(cells.iter().collect());
            }
            table.printstd();
            for reaction in &network.reactions {
                println!("{}: log K(T) = {}", reaction, log_k_sym(reaction));
            }
        }
        4 => {
            // calcite dissolving at a reactive wall
            let database = ReactionDatabase::default_database()?;
            let system = AqueousSystem::from_species(&["Ca++", "HCO3-"], &database, 298.15)?;
            let solver = system.interface_solver(&["Calcite"], &[])?;
            let n = system.solutes.len();
            let transport = DVector::from_element(n, 1.0e-5);
            let x_bulk = DVector::from_element(n, 1.0e-3);
            let x_interface = DVector::from_element(n, 0.5e-3);
            let fluxes = system.interface_fluxes(&solver, &transport, &x_bulk, &x_interface, None)?;
            let mut table = Table::new();
            table.add_row(row!["Phase", "J_R, mol/m2/s"]);
            for phase in &system.solid_phase_names {
                table.add_row(row![phase, format!("{:.3e}", fluxes.reaction_fluxes[phase])]);
            }
            table.printstd();
        }
        5 => {
            // temperature sweep of one system
            let database = ReactionDatabase::default_database()?;
            let mut system = AqueousSystem::from_species(&["CaCl2", "Na2CO3"], &database, 298.15)?;
            for T in [283.15, 298.15, 323.15, 348.15] {
                system.set_temperature(T)?;
                info!("T = {} K, stable phases {:?}", T, system.stable_phases);
                println!("T = {} K: log K {}", T, system.log_ks.transpose());
            }
        }
        _ => {
            println!("no such task: {}", task);
        }
    }
    Ok(())
}
