/// error type shared by the whole aqueous equilibrium pipeline
pub mod errors;
/// Decomposition of species tags ("Ca++", "CaCO3(s)__Calcite", "CaSO4:2H2O", "Ca(OH)2")
/// into (element, coefficient) pairs; the charge is the number of '+' minus the number of '-'.
///
/// # Examples
/// ```
/// use AquaEquilibria::AqueousEquilibrium::formula_parser::{parse_formula, stoich_number};
/// let composition = parse_formula("Ca(HCO3)2").unwrap();
/// println!("{:?}", composition);
/// assert_eq!(stoich_number("Ca(HCO3)2", "O").unwrap(), 6.0);
/// assert_eq!(stoich_number("CO3--", "e").unwrap(), -2.0);
/// ```
pub mod formula_parser;
/// structured reaction record built from the flat JSON records of a database
pub mod reaction_record;
/// Reaction database: solutions, irreversible reactions, solid phases and gases.
///
/// # Examples
/// ```
/// use AquaEquilibria::AqueousEquilibrium::reaction_database::ReactionDatabase;
/// let db = ReactionDatabase::default_database().unwrap();
/// db.pretty_print();
/// ```
pub mod reaction_database;
pub mod species_registry;
/// Discovery of every species and reaction transitively reachable from seed species.
///
/// # Examples
/// ```
/// use AquaEquilibria::AqueousEquilibrium::network_closure::expand;
/// use AquaEquilibria::AqueousEquilibrium::reaction_database::ReactionDatabase;
/// let db = ReactionDatabase::default_database().unwrap();
/// let candidates = db.possible_reactions();
/// let network = expand(&["Ca++", "HCO3-"], &candidates);
/// assert_eq!(network.species[0], "H2O");
/// ```
pub mod network_closure;
/// formula, stoichiometric and solid-formula matrices
pub mod matrix_assembler;
/// log10 K(T): analytical polynomial, Van't Hoff or no data; numeric and symbolic
#[allow(non_snake_case)]
pub mod equilibrium_constants;
/// most stable polymorph of each solid formula
#[allow(non_snake_case)]
pub mod phase_stability;
/// reaction rates at a reactive interface by least squares over the elemental balance
pub mod interface_flux;
/// eng
/// Builds all artifacts of one equilibrium query: species (water first), reactions, solid and
/// gas reactions, elements, matrices, log K vectors and stable phases.
///
/// # Examples
/// ```
/// use AquaEquilibria::AqueousEquilibrium::reaction_database::ReactionDatabase;
/// use AquaEquilibria::AqueousEquilibrium::system_builder::AqueousSystem;
/// let db = ReactionDatabase::default_database().unwrap();
/// let system = AqueousSystem::from_species(&["NaHCO3", "CaCl2"], &db, 298.15).unwrap();
/// system.print_summary();
/// println!("stable phases: {:?}", system.stable_phases);
/// ```
#[allow(non_snake_case)]
pub mod system_builder;
