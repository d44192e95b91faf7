//! Oral methadone via Ripamonti tiers.
//!
//! The morphine:methadone ratio grows with the OME, so methadone never goes
//! through the linear table. Only the OME → methadone direction exists.

/// (upper OME bound inclusive, morphine:methadone ratio)
pub static METHADONE_RIPAMONTI_TIERS: &[(f64, f64)] = &[(90.0, 4.0), (300.0, 6.0), (f64::INFINITY, 8.0)];

/// Check whether a (drug, route) pair is oral methadone.
pub fn is_oral_methadone(drug: &str, route: &str) -> bool {
    drug.trim().eq_ignore_ascii_case("methadone") && route.trim().eq_ignore_ascii_case("oral")
}

/// Convert OME (mg/day) to a methadone total daily dose.
pub fn ome_to_methadone(ome: f64) -> f64 {
    if ome <= 0.0 {
        return 0.0;
    }
    let ratio = METHADONE_RIPAMONTI_TIERS
        .iter()
        .find(|(upper, _)| ome <= *upper)
        .map(|(_, ratio)| *ratio)
        .unwrap_or(8.0);
    ome / ratio
}
