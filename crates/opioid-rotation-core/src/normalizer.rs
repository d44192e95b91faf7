//! Free-text regimen normalizer.
//!
//! Handles:
//! - Alias expansion (brand names and spelling variants → drug id)
//! - Unit conversion (mcg→mg, g→mg)
//! - Route canonicalization (po→oral, transdermal→patch, sc→sc/iv)
//! - Closest-name suggestions for unknown drugs

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::convert::{lookup, routes_for, ConversionError, ConversionResult};
use crate::formulary::{find_by_brand, FORMULARY};
use crate::models::OpioidInput;

/// Minimum similarity for a drug-name suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Unit of a patch delivery rate.
const RATE_UNIT: &str = "mcg/hr";

const MICROGRAM: f64 = 0.001;

/// A regimen line as typed or dictated, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRegimenEntry {
    /// Drug or brand name
    pub drug_name: String,
    /// Route as written; the brand's route is used when absent
    pub route: Option<String>,
    pub doses: Vec<f64>,
    /// Dose unit as written; mg when absent
    pub unit: Option<String>,
    pub frequency: u32,
    #[serde(default)]
    pub asymmetrical: bool,
}

/// Normalizer for regimen entries.
pub struct Normalizer {
    /// Alias map: brand or variant spelling → drug id
    aliases: HashMap<String, String>,
    /// Unit conversions: non-standard → standard
    unit_conversions: HashMap<String, (String, f64)>, // (canonical_unit, multiplier)
    /// Route canonicalization: written → table route
    route_map: HashMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide normalizer with the default mappings.
pub fn shared() -> &'static Normalizer {
    static SHARED: OnceLock<Normalizer> = OnceLock::new();
    SHARED.get_or_init(Normalizer::new)
}

impl Normalizer {
    /// Create a new normalizer with default mappings.
    pub fn new() -> Self {
        Self {
            aliases: Self::default_aliases(),
            unit_conversions: Self::default_unit_conversions(),
            route_map: Self::default_routes(),
        }
    }

    /// Normalize a raw entry into a conversion input.
    pub fn normalize_entry(&self, raw: &RawRegimenEntry) -> ConversionResult<OpioidInput> {
        let drug = self.expand_alias(&raw.drug_name);

        let route = match (&raw.route, find_by_brand(&raw.drug_name)) {
            (Some(route), _) => self.canonical_route_for(&drug, route),
            (None, Some((_, brand))) => brand.route.to_string(),
            (None, None) => {
                return Err(ConversionError::InvalidArgument(format!(
                    "No route given for {}",
                    raw.drug_name
                )))
            }
        };

        let multiplier = match &raw.unit {
            Some(unit) => self.dose_multiplier(unit, &route)?,
            None => 1.0,
        };

        Ok(OpioidInput {
            drug,
            route,
            doses: raw.doses.iter().map(|d| d * multiplier).collect(),
            frequency: raw.frequency,
            asymmetrical: raw.asymmetrical,
        })
    }

    /// Expand a drug alias to its canonical id.
    pub fn expand_alias(&self, name: &str) -> String {
        let lower = name.trim().to_lowercase();
        self.aliases.get(&lower).cloned().unwrap_or(lower)
    }

    /// Convert a unit to canonical form with multiplier.
    pub fn convert_unit(&self, unit: &str) -> (String, f64) {
        let lower = unit.trim().to_lowercase();
        self.unit_conversions
            .get(&lower)
            .cloned()
            .unwrap_or((lower, 1.0))
    }

    /// Multiplier taking a written unit to the unit the route is dosed in.
    ///
    /// Patches are dosed in mcg/hr and accept rate or microgram units as
    /// written. Every other route is dosed in mg and rejects rate units.
    fn dose_multiplier(&self, unit: &str, route: &str) -> ConversionResult<f64> {
        let (canonical, multiplier) = self
            .unit_conversions
            .get(&unit.trim().to_lowercase())
            .ok_or_else(|| ConversionError::InvalidArgument(format!("Unknown dose unit {}", unit)))?;

        let is_rate = canonical == RATE_UNIT;
        let is_microgram = canonical == "mg" && *multiplier == MICROGRAM;
        match (route == "patch", is_rate) {
            (true, _) if is_rate || is_microgram => Ok(1.0),
            (false, false) => Ok(*multiplier),
            _ => Err(ConversionError::InvalidArgument(format!(
                "Unit {} does not fit route {}",
                unit, route
            ))),
        }
    }

    /// Canonicalize a route of administration.
    pub fn canonicalize_route(&self, route: &str) -> String {
        let lower = route.trim().to_lowercase();
        self.route_map.get(&lower).cloned().unwrap_or(lower)
    }

    /// Canonicalize a route and fit it to the rows the table has for `drug`.
    ///
    /// Parenteral routes are tabulated either as `sc/iv` or `iv`; the one the
    /// drug actually has wins.
    pub fn canonical_route_for(&self, drug: &str, route: &str) -> String {
        let route = self.canonicalize_route(route);
        if lookup(drug, &route).is_ok() {
            return route;
        }
        let alternative = match route.as_str() {
            "sc/iv" => "iv",
            "iv" => "sc/iv",
            _ => return route,
        };
        if routes_for(drug).contains(&alternative) {
            alternative.to_string()
        } else {
            route
        }
    }

    /// Closest known drug id for a possibly misspelled name.
    pub fn closest_drug(&self, name: &str) -> Option<String> {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if let Some(id) = self.aliases.get(&lower) {
            return Some(id.clone());
        }

        let ids = FORMULARY.iter().map(|d| (d.id, d.id));
        let aliases = self.aliases.iter().map(|(a, id)| (a.as_str(), id.as_str()));

        ids.chain(aliases)
            .map(|(candidate, id)| (jaro_winkler(&lower, candidate), id))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id.to_string())
    }

    /// Add a custom alias mapping.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_lowercase(), canonical.to_lowercase());
    }

    /// Add a custom route mapping.
    pub fn add_route(&mut self, written: &str, canonical: &str) {
        self.route_map
            .insert(written.to_lowercase(), canonical.to_lowercase());
    }

    /// Default alias mappings: every formulary brand plus common variants.
    fn default_aliases() -> HashMap<String, String> {
        let mut map = HashMap::new();

        for drug in FORMULARY {
            for brand in drug.brands {
                map.insert(brand.name.to_lowercase(), drug.id.to_string());
            }
        }

        // Spelling variants
        map.insert("morfin".into(), "morphine".into());
        map.insert("morphin".into(), "morphine".into());
        map.insert("oxikodon".into(), "oxycodone".into());
        map.insert("oxycodon".into(), "oxycodone".into());
        map.insert("hidromorfon".into(), "hydromorphone".into());
        map.insert("hydromorphon".into(), "hydromorphone".into());
        map.insert("fentanil".into(), "fentanyl".into());
        map.insert("kodein".into(), "codeine".into());
        map.insert("dihidrokodein".into(), "dihydrocodeine".into());
        map.insert("metadon".into(), "methadone".into());
        map.insert("petidin".into(), "pethidine".into());
        map.insert("meperidine".into(), "pethidine".into());
        map.insert("nalbuphin".into(), "nalbuphine".into());

        // Abbreviations
        map.insert("dhc".into(), "dihydrocodeine".into());
        map.insert("oxycodone/naloxone".into(), "oxycodone-naloxone".into());
        map.insert("oxycodone naloxone".into(), "oxycodone-naloxone".into());

        map
    }

    /// Default unit conversions.
    fn default_unit_conversions() -> HashMap<String, (String, f64)> {
        let mut map = HashMap::new();

        map.insert("mg".into(), ("mg".into(), 1.0));
        map.insert("milligram".into(), ("mg".into(), 1.0));
        map.insert("milligrams".into(), ("mg".into(), 1.0));
        map.insert("mcg".into(), ("mg".into(), MICROGRAM));
        map.insert("µg".into(), ("mg".into(), MICROGRAM));
        map.insert("ug".into(), ("mg".into(), MICROGRAM));
        map.insert("microgram".into(), ("mg".into(), MICROGRAM));
        map.insert("micrograms".into(), ("mg".into(), MICROGRAM));
        map.insert("g".into(), ("mg".into(), 1000.0));
        map.insert("gram".into(), ("mg".into(), 1000.0));

        // Patch delivery rates
        map.insert("mcg/hr".into(), (RATE_UNIT.into(), 1.0));
        map.insert("mcg/h".into(), (RATE_UNIT.into(), 1.0));
        map.insert("µg/h".into(), (RATE_UNIT.into(), 1.0));
        map.insert("µg/hr".into(), (RATE_UNIT.into(), 1.0));

        map
    }

    /// Default route mappings.
    fn default_routes() -> HashMap<String, String> {
        let mut map = HashMap::new();

        // Oral
        map.insert("oral".into(), "oral".into());
        map.insert("orally".into(), "oral".into());
        map.insert("by mouth".into(), "oral".into());
        map.insert("per os".into(), "oral".into());
        map.insert("po".into(), "oral".into());

        // Parenteral
        map.insert("sc/iv".into(), "sc/iv".into());
        map.insert("sc".into(), "sc/iv".into());
        map.insert("sq".into(), "sc/iv".into());
        map.insert("subcutaneous".into(), "sc/iv".into());
        map.insert("parenteral".into(), "sc/iv".into());
        map.insert("iv".into(), "iv".into());
        map.insert("i.v.".into(), "iv".into());
        map.insert("intravenous".into(), "iv".into());

        // Transmucosal
        map.insert("oral/mucosal".into(), "oral/mucosal".into());
        map.insert("transmucosal".into(), "oral/mucosal".into());
        map.insert("buccal".into(), "oral/mucosal".into());
        map.insert("sublingual".into(), "oral/mucosal".into());

        // Transdermal
        map.insert("patch".into(), "patch".into());
        map.insert("transdermal".into(), "patch".into());
        map.insert("td".into(), "patch".into());
        map.insert("tdt".into(), "patch".into());

        map
    }
}
