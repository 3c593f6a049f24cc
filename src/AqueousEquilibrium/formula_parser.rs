//! Module to extract the atomic composition and the ionic charge of a species tag
//!
//! Species tags look like "Ca++", "CaCO3(s)__Calcite", "Ca(OH)2(s)" or "CaSO4:2H2O".
//! Charge marks are stripped, the polymorph suffix `__<phase>` is dropped, parenthesized
//! groups `(XY)n` are multiplied out and hydrate-like parts after a colon take their
//! leading number as a multiplier.

use super::errors::AqueousEquilibriumError;
use regex::Regex;
use std::sync::LazyLock;

/// pseudo-element used for the charge balance row of the formula matrix
pub const ELECTRON: &str = "e";
/// separator between a solid tag and the name of the polymorph it belongs to
pub const PHASE_SEPARATOR: &str = "__";

pub const ELEMENTS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

static RX_NO_SIGNAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]").expect("valid charge regex"));
static RX_PRNTHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\w+\)\d*").expect("valid group regex"));
static RX_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][^A-Z]*").expect("valid element regex"));
static RX_LETTER_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]*)$").expect("valid token regex"));

pub fn is_element(symbol: &str) -> bool {
    ELEMENTS.contains(&symbol)
}

/// part of the tag before the polymorph suffix
pub fn strip_phase_name(tag: &str) -> &str {
    tag.split(PHASE_SEPARATOR).next().unwrap_or(tag)
}

/// net ionic charge: number of '+' minus number of '-' (cations positive)
pub fn charge(tag: &str) -> i64 {
    let body = strip_phase_name(tag);
    let plus = body.matches('+').count() as i64;
    let minus = body.matches('-').count() as i64;
    plus - minus
}

/// Parses a species tag into an ordered list of (element, coefficient) pairs.
/// The same element may appear several times (e.g. "CH3COOH"); use [`stoich_number`]
/// to get the total count.
pub fn parse_formula(tag: &str) -> Result<Vec<(String, i64)>, AqueousEquilibriumError> {
    let no_signals = RX_NO_SIGNAL.replace_all(tag, "");
    let formula = strip_phase_name(&no_signals);
    if formula.is_empty() {
        return Err(AqueousEquilibriumError::formula(tag, "empty formula"));
    }
    let mut elements_with_coefs = Vec::new();
    for segment in split_parenthesized_groups(formula) {
        if segment.contains("(s)") || segment.contains("(g)") {
            continue;
        }
        if segment.starts_with('(') && segment.contains(')') {
            elements_with_coefs.extend(parse_group(segment, tag)?);
        } else if segment.contains(':') {
            elements_with_coefs.extend(parse_adduct(segment, tag)?);
        } else {
            elements_with_coefs.extend(parse_element_tokens(segment, tag)?);
        }
    }
    if elements_with_coefs.is_empty() {
        return Err(AqueousEquilibriumError::formula(tag, "no elements found"));
    }
    Ok(elements_with_coefs)
}

/// parse every tag of a list, failing on the first bad one
pub fn elements_and_coefficients(
    species: &[String],
) -> Result<Vec<Vec<(String, i64)>>, AqueousEquilibriumError> {
    species.iter().map(|tag| parse_formula(tag)).collect()
}

/// number of atoms of `element` in `tag`; for the pseudo-element "e" it is the net charge
pub fn stoich_number(tag: &str, element: &str) -> Result<f64, AqueousEquilibriumError> {
    if element == ELECTRON {
        return Ok(charge(tag) as f64);
    }
    let composition = parse_formula(tag)?;
    let count: i64 = composition
        .iter()
        .filter(|(el, _)| el == element)
        .map(|(_, coef)| *coef)
        .sum();
    Ok(count as f64)
}

// splits "Ca(OH)2(s)" into ["Ca", "(OH)2", "(s)"]
fn split_parenthesized_groups(formula: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in RX_PRNTHS.find_iter(formula) {
        if m.start() > last {
            segments.push(&formula[last..m.start()]);
        }
        segments.push(m.as_str());
        last = m.end();
    }
    if last < formula.len() {
        segments.push(&formula[last..]);
    }
    segments
}

// "(OH)2" -> O2 H2
fn parse_group(segment: &str, tag: &str) -> Result<Vec<(String, i64)>, AqueousEquilibriumError> {
    let close = segment
        .rfind(')')
        .ok_or_else(|| AqueousEquilibriumError::formula(tag, "unclosed group"))?;
    let inner = &segment[1..close];
    let tail = &segment[close + 1..];
    let multiplier: i64 = if tail.is_empty() {
        1
    } else {
        tail.parse()
            .map_err(|_| AqueousEquilibriumError::formula(tag, format!("bad multiplier '{}'", tail)))?
    };
    let mut group = parse_element_tokens(inner, tag)?;
    for (_, coef) in group.iter_mut() {
        *coef *= multiplier;
    }
    Ok(group)
}

// "CaSO4:2H2O" -> Ca S O4 + H4 O2
fn parse_adduct(segment: &str, tag: &str) -> Result<Vec<(String, i64)>, AqueousEquilibriumError> {
    let mut parts = segment.split(':');
    let mut out = Vec::new();
    if let Some(head) = parts.next() {
        if !head.is_empty() {
            out.extend(parse_element_tokens(head, tag)?);
        }
    }
    for part in parts {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        let multiplier: i64 = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| {
                AqueousEquilibriumError::formula(tag, format!("bad multiplier '{}'", digits))
            })?
        };
        let mut adduct = parse_element_tokens(&part[digits.len()..], tag)?;
        for (_, coef) in adduct.iter_mut() {
            *coef *= multiplier;
        }
        out.extend(adduct);
    }
    Ok(out)
}

fn parse_element_tokens(
    segment: &str,
    tag: &str,
) -> Result<Vec<(String, i64)>, AqueousEquilibriumError> {
    match segment.chars().next() {
        Some(c) if c.is_ascii_uppercase() => {}
        Some(_) => {
            return Err(AqueousEquilibriumError::formula(
                tag,
                format!("segment '{}' does not start with an element symbol", segment),
            ));
        }
        None => return Err(AqueousEquilibriumError::formula(tag, "empty segment")),
    }
    let mut case_coefs = Vec::new();
    for token in RX_CASE.find_iter(segment) {
        let token = token.as_str();
        let caps = RX_LETTER_DIGIT.captures(token).ok_or_else(|| {
            AqueousEquilibriumError::formula(tag, format!("cannot interpret token '{}'", token))
        })?;
        let symbol = &caps[1];
        if !is_element(symbol) {
            return Err(AqueousEquilibriumError::formula(
                tag,
                format!("unknown element '{}'", symbol),
            ));
        }
        let coef: i64 = if caps[2].is_empty() {
            1
        } else {
            caps[2].parse().map_err(|_| {
                AqueousEquilibriumError::formula(tag, format!("bad coefficient in '{}'", token))
            })?
        };
        case_coefs.push((symbol.to_string(), coef));
    }
    Ok(case_coefs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn as_map(pairs: Vec<(String, i64)>) -> HashMap<String, i64> {
        let mut map = HashMap::new();
        for (el, coef) in pairs {
            *map.entry(el).or_insert(0) += coef;
        }
        map
    }

    #[test]
    fn test_parse_simple_formulas() {
        assert_eq!(
            parse_formula("H2O").unwrap(),
            vec![("H".to_string(), 2), ("O".to_string(), 1)]
        );
        assert_eq!(
            parse_formula("HCO3-").unwrap(),
            vec![
                ("H".to_string(), 1),
                ("C".to_string(), 1),
                ("O".to_string(), 3)
            ]
        );
        assert_eq!(parse_formula("Ca++").unwrap(), vec![("Ca".to_string(), 1)]);
    }

    #[test]
    fn test_parse_solid_and_phase_suffix() {
        let calcite = parse_formula("CaCO3(s)__Calcite").unwrap();
        assert_eq!(
            calcite,
            vec![
                ("Ca".to_string(), 1),
                ("C".to_string(), 1),
                ("O".to_string(), 3)
            ]
        );
        let gas = parse_formula("CO2(g)").unwrap();
        assert_eq!(gas, vec![("C".to_string(), 1), ("O".to_string(), 2)]);
    }

    #[test]
    fn test_parse_parenthesized_groups() {
        let portlandite = as_map(parse_formula("Ca(OH)2(s)").unwrap());
        let expected = HashMap::from([
            ("Ca".to_string(), 1),
            ("O".to_string(), 2),
            ("H".to_string(), 2),
        ]);
        assert_eq!(portlandite, expected);

        let nitrate = as_map(parse_formula("Na(NO3)").unwrap());
        let expected = HashMap::from([
            ("Na".to_string(), 1),
            ("N".to_string(), 1),
            ("O".to_string(), 3),
        ]);
        assert_eq!(nitrate, expected);
    }

    #[test]
    fn test_multi_digit_group_multiplier() {
        let hydrate = as_map(parse_formula("Na(H2O)12+").unwrap());
        let expected = HashMap::from([
            ("Na".to_string(), 1),
            ("H".to_string(), 24),
            ("O".to_string(), 12),
        ]);
        assert_eq!(hydrate, expected);
        assert_eq!(stoich_number("Al(OH)10(s)", "H").unwrap(), 10.0);
    }

    #[test]
    fn test_parse_adduct() {
        let gypsum = as_map(parse_formula("CaSO4:2H2O").unwrap());
        let expected = HashMap::from([
            ("Ca".to_string(), 1),
            ("S".to_string(), 1),
            ("O".to_string(), 6),
            ("H".to_string(), 4),
        ]);
        assert_eq!(gypsum, expected);
    }

    #[test]
    fn test_repeated_element_is_summed() {
        assert_eq!(stoich_number("CH3COOH", "C").unwrap(), 2.0);
        assert_eq!(stoich_number("CH3COOH", "O").unwrap(), 2.0);
        assert_eq!(stoich_number("CH3COOH", "H").unwrap(), 4.0);
        assert_eq!(stoich_number("CH3COOH", "Na").unwrap(), 0.0);
    }

    #[test]
    fn test_charge_row_sign_convention() {
        assert_eq!(stoich_number("H2O", ELECTRON).unwrap(), 0.0);
        assert_eq!(stoich_number("Ca++", ELECTRON).unwrap(), 2.0);
        assert_eq!(stoich_number("CO3--", ELECTRON).unwrap(), -2.0);
        assert_eq!(stoich_number("CaCO3(s)__Calcite", ELECTRON).unwrap(), 0.0);
    }

    #[test]
    fn test_round_trip_of_concatenated_formulas() {
        let cases: Vec<Vec<(&str, i64)>> = vec![
            vec![("Na", 1), ("Cl", 1)],
            vec![("Ca", 1), ("C", 1), ("O", 3)],
            vec![("Mg", 2), ("Si", 1), ("O", 4)],
            vec![("Fe", 3), ("O", 4)],
            vec![("K", 1), ("Al", 1), ("Si", 3), ("O", 8)],
        ];
        for case in cases {
            let tag: String = case
                .iter()
                .map(|(el, n)| format!("{}{}", el, n))
                .collect();
            let parsed = as_map(parse_formula(&tag).unwrap());
            let expected: HashMap<String, i64> =
                case.iter().map(|(el, n)| (el.to_string(), *n)).collect();
            assert_eq!(parsed, expected, "round trip failed for {}", tag);
        }
    }

    #[test]
    fn test_malformed_tags_fail() {
        assert!(matches!(
            parse_formula("Xq2"),
            Err(AqueousEquilibriumError::FormulaParse { .. })
        ));
        assert!(parse_formula("aSO4").is_err());
        assert!(parse_formula("(s)").is_err());
        assert!(parse_formula("Ca2x").is_err());
        assert!(parse_formula("").is_err());
        assert!(parse_formula("e-").is_err());
    }

    #[test]
    fn test_elements_and_coefficients_batch() {
        let species = vec!["H2O".to_string(), "Na+".to_string()];
        let parsed = elements_and_coefficients(&species).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1], vec![("Na".to_string(), 1)]);

        let bad = vec!["H2O".to_string(), "Zz".to_string()];
        assert!(elements_and_coefficients(&bad).is_err());
    }
}
