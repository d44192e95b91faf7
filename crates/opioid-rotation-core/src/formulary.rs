//! Opioid formulary: brands, tablet strengths and dose limits.
//!
//! Market data (Hungarian registry). Conversion factors live in
//! [`crate::convert`]; this module only knows what can be prescribed.

use serde::Serialize;

/// A brand-name product of a drug.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Brand {
    pub name: &'static str,
    /// Route the brand is given by
    pub route: &'static str,
}

/// Formulary entry for one drug.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DrugDefinition {
    /// Drug identifier, matching the conversion table
    pub id: &'static str,
    /// English display name
    pub display_name: &'static str,
    pub routes: &'static [&'static str],
    pub brands: &'static [Brand],
    /// Scheduled (modified-release) strengths per route, ascending
    pub tablet_sizes: &'static [(&'static str, &'static [f64])],
    /// Immediate-release oral strengths for breakthrough dosing, ascending
    pub ir_tablet_sizes: &'static [f64],
    /// Smallest available single dose (mg)
    pub min_single_dose: Option<f64>,
    /// Maximum daily dose (mg)
    pub max_daily_dose: Option<f64>,
    /// Not to be used as a rotation target
    pub unsuitable_as_target: bool,
}

const fn brand(name: &'static str, route: &'static str) -> Brand {
    Brand { name, route }
}

pub static FORMULARY: &[DrugDefinition] = &[
    DrugDefinition {
        id: "morphine",
        display_name: "Morphine",
        routes: &["oral", "sc/iv"],
        brands: &[
            brand("MST Continus", "oral"),
            brand("Sevredol", "oral"),
            brand("Morphine Kalceks", "sc/iv"),
            brand("Morphinum Hydrochloricum TEVA", "sc/iv"),
        ],
        tablet_sizes: &[("oral", &[10.0, 30.0, 60.0, 100.0])],
        ir_tablet_sizes: &[10.0],
        min_single_dose: Some(10.0),
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "oxycodone",
        display_name: "Oxycodone",
        routes: &["oral", "sc/iv"],
        brands: &[
            brand("OxyContin", "oral"),
            brand("Codoxy", "oral"),
            brand("Codoxy Rapid", "oral"),
            brand("Reltebon", "oral"),
            brand("Oxycodone Sandoz", "oral"),
            brand("Oxycodone Vitabalans", "oral"),
        ],
        tablet_sizes: &[("oral", &[5.0, 10.0, 20.0, 40.0, 80.0])],
        ir_tablet_sizes: &[5.0, 10.0, 20.0],
        min_single_dose: Some(10.0),
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "oxycodone-naloxone",
        display_name: "Oxycodone + Naloxone",
        routes: &["oral"],
        brands: &[
            brand("Targin", "oral"),
            brand("Oxynal", "oral"),
            brand("Oxynador", "oral"),
        ],
        tablet_sizes: &[("oral", &[5.0, 10.0, 20.0, 40.0])],
        // No dedicated IR form; oxycodone IR covers breakthrough
        ir_tablet_sizes: &[],
        min_single_dose: Some(5.0),
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "fentanyl",
        display_name: "Fentanyl",
        routes: &["patch", "oral/mucosal", "sc/iv"],
        brands: &[
            brand("Durogesic", "patch"),
            brand("Dolforin", "patch"),
            brand("Matrifen", "patch"),
            brand("Fentanyl-ratiopharm", "patch"),
            brand("Effentora", "oral/mucosal"),
            brand("Abstral", "oral/mucosal"),
            brand("Actiq", "oral/mucosal"),
            brand("Fentanyl Kalceks", "sc/iv"),
            brand("Fentanyl-Richter", "sc/iv"),
        ],
        tablet_sizes: &[],
        ir_tablet_sizes: &[],
        min_single_dose: None,
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "hydromorphone",
        display_name: "Hydromorphone",
        routes: &["oral", "sc/iv"],
        brands: &[
            brand("Jurnista", "oral"),
            brand("Palladone", "oral"),
        ],
        tablet_sizes: &[("oral", &[4.0, 8.0, 16.0, 32.0])],
        ir_tablet_sizes: &[1.3, 2.6],
        min_single_dose: Some(4.0),
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "tramadol",
        display_name: "Tramadol",
        routes: &["oral", "iv"],
        brands: &[
            brand("Contramal", "oral"),
            brand("Adamon", "oral"),
            brand("Ralgen", "oral"),
            brand("Ralgen SR", "oral"),
            brand("Tramadolor", "oral"),
            brand("Tramadol Kalceks", "iv"),
        ],
        tablet_sizes: &[("oral", &[100.0, 150.0, 200.0])],
        ir_tablet_sizes: &[50.0],
        min_single_dose: None,
        max_daily_dose: Some(400.0),
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "dihydrocodeine",
        display_name: "Dihydrocodeine",
        routes: &["oral"],
        brands: &[brand("DHC Continus", "oral")],
        tablet_sizes: &[("oral", &[60.0])],
        ir_tablet_sizes: &[],
        min_single_dose: None,
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "codeine",
        display_name: "Codeine",
        routes: &["oral"],
        brands: &[],
        tablet_sizes: &[("oral", &[15.0, 30.0, 60.0])],
        ir_tablet_sizes: &[15.0, 30.0],
        min_single_dose: None,
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "methadone",
        display_name: "Methadone",
        routes: &["oral"],
        brands: &[
            brand("Metadon EP", "oral"),
            brand("Methasan", "oral"),
        ],
        tablet_sizes: &[("oral", &[5.0, 10.0, 20.0, 40.0])],
        ir_tablet_sizes: &[],
        min_single_dose: None,
        max_daily_dose: None,
        unsuitable_as_target: false,
    },
    DrugDefinition {
        id: "nalbuphine",
        display_name: "Nalbuphine",
        routes: &["sc/iv"],
        brands: &[brand("Nalpain", "sc/iv")],
        tablet_sizes: &[],
        ir_tablet_sizes: &[],
        min_single_dose: None,
        max_daily_dose: None,
        unsuitable_as_target: true,
    },
    DrugDefinition {
        id: "pethidine",
        display_name: "Pethidine",
        routes: &["sc/iv"],
        brands: &[brand("Pethidine", "sc/iv")],
        tablet_sizes: &[],
        ir_tablet_sizes: &[],
        min_single_dose: None,
        max_daily_dose: None,
        unsuitable_as_target: true,
    },
];

/// Find a drug by identifier (case-insensitive).
pub fn find_drug(id: &str) -> Option<&'static DrugDefinition> {
    let id = id.trim();
    FORMULARY.iter().find(|d| d.id.eq_ignore_ascii_case(id))
}

/// Find a drug and brand by brand name (case-insensitive).
pub fn find_by_brand(name: &str) -> Option<(&'static DrugDefinition, &'static Brand)> {
    let name = name.trim();
    FORMULARY.iter().find_map(|drug| {
        drug.brands
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| (drug, b))
    })
}

/// Scheduled tablet strengths for a drug and route; empty when none are known.
pub fn tablet_sizes(drug: &str, route: &str) -> &'static [f64] {
    let route = route.trim();
    find_drug(drug)
        .and_then(|d| {
            d.tablet_sizes
                .iter()
                .find(|(r, _)| r.eq_ignore_ascii_case(route))
        })
        .map(|(_, sizes)| *sizes)
        .unwrap_or(&[])
}

/// Immediate-release strengths used for breakthrough doses.
pub fn ir_tablet_sizes(drug: &str) -> &'static [f64] {
    match find_drug(drug) {
        Some(d) if !d.ir_tablet_sizes.is_empty() => d.ir_tablet_sizes,
        Some(d) if d.id == "oxycodone-naloxone" => ir_tablet_sizes("oxycodone"),
        _ => &[],
    }
}

pub fn min_single_dose(drug: &str) -> Option<f64> {
    find_drug(drug).and_then(|d| d.min_single_dose)
}

pub fn max_daily_dose(drug: &str) -> Option<f64> {
    find_drug(drug).and_then(|d| d.max_daily_dose)
}

pub fn is_unsuitable_as_target(drug: &str) -> bool {
    find_drug(drug).is_some_and(|d| d.unsuitable_as_target)
}
