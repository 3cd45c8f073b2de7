//! Air Risk Class (ARC) decision table.
//!
//! Mirrors the SORA flowchart: containment in a controlled zone is checked
//! first in priority order, then the altitude bands, with the ground risk
//! class deciding urban vs rural in the lowest band. Evaluated top to
//! bottom, first match wins.

use crate::models::{ArcLabel, Classification, GroundRisk, ZoneContainment};

const FT_TO_M: f64 = 0.3048;

/// 500 ft, the lower altitude band edge.
pub const LOWER_THRESHOLD_M: f64 = 500.0 * FT_TO_M;

/// FL600 (60,000 ft), the upper altitude band edge.
pub const UPPER_THRESHOLD_M: f64 = 60_000.0 * FT_TO_M;

/// Final GRC at or above which the overflown ground counts as urban.
pub const URBAN_GRC_MIN: u8 = 6;

/// Classify one sample. Pure and total: always returns a result with
/// exactly one justification naming the branch that fired.
///
/// `zones` holds containment results in priority order; the first containing
/// zone decides the controlled branch, no most-specific search. `mode_c_tmz`
/// is the live controlled-airspace indicator used outside the named zones.
///
/// Band edges are exact: `altitude_m > UPPER_THRESHOLD_M` is the top band,
/// so exactly FL600 falls in the middle band, and exactly 500 ft falls in
/// the low band.
pub fn classify(
    altitude_m: f64,
    zones: &[ZoneContainment<'_>],
    ground_risk: &GroundRisk,
    mode_c_tmz: bool,
) -> Classification {
    for hit in zones {
        if hit.inside {
            let label = hit.zone.label;
            return Classification {
                label,
                tier: label.tier(),
                controlled: true,
                rule: format!(
                    "inside {} → {} (controlled, tier {})",
                    hit.zone.name,
                    label,
                    label.tier()
                ),
            };
        }
    }

    // Unknown ground risk fails toward the less restrictive branch ("not
    // urban"), but the justification must say the data was missing.
    let (is_urban, grc_note) = match ground_risk {
        GroundRisk::Known(grc) => (*grc >= URBAN_GRC_MIN, None),
        GroundRisk::Unknown { reason } => (false, Some(reason.as_str())),
    };

    if altitude_m > UPPER_THRESHOLD_M {
        return result(ArcLabel::ArcB, false, "OPS above FL600 → ARC-b".to_string());
    }

    if altitude_m > LOWER_THRESHOLD_M {
        return if mode_c_tmz {
            result(
                ArcLabel::ArcD,
                true,
                "500 ft < OPS ≤ FL600 in controlled airspace (Mode-C/TMZ) → ARC-d".to_string(),
            )
        } else {
            result(
                ArcLabel::ArcC,
                false,
                "500 ft < OPS ≤ FL600, uncontrolled mid-altitude → ARC-c".to_string(),
            )
        };
    }

    // OPS ≤ 500 ft.
    if mode_c_tmz {
        let rule = with_grc_note(
            "OPS ≤ 500 ft in controlled airspace (Mode-C/TMZ) → ARC-c",
            grc_note,
        );
        result(ArcLabel::ArcC, true, rule)
    } else if is_urban {
        result(
            ArcLabel::ArcC,
            false,
            format!("OPS ≤ 500 ft over urban ground (GRC ≥ {URBAN_GRC_MIN}) → ARC-c"),
        )
    } else {
        let rule = with_grc_note("OPS ≤ 500 ft, uncontrolled low-altitude rural → ARC-b", grc_note);
        result(ArcLabel::ArcB, false, rule)
    }
}

fn result(label: ArcLabel, controlled: bool, rule: String) -> Classification {
    Classification {
        label,
        tier: label.tier(),
        controlled,
        rule,
    }
}

fn with_grc_note(rule: &str, grc_note: Option<&str>) -> String {
    match grc_note {
        Some(reason) => format!("{rule} (ground risk unavailable: {reason}; assumed rural)"),
        None => rule.to_string(),
    }
}
