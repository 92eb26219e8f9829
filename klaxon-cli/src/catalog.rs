//! Vehicle lookup from sample filenames.
//!
//! Samples are named `make_model_*.ext` (e.g. `toyota_corolla_2021.wav`).
//! The make token is normalized to the manufacturer's proper name, then
//! mapped to a country of origin; the model tokens select a market segment
//! by substring match.

use std::path::Path;

const MAKE_MAP: &[(&str, &str)] = &[
    ("bmw", "BMW"),
    ("mercedes", "Mercedes-Benz"),
    ("hyundai", "Hyundai"),
    ("kia", "Kia"),
    ("honda", "Honda"),
    ("toyota", "Toyota"),
    ("ford", "Ford"),
    ("chevrolet", "Chevrolet"),
    ("nissan", "Nissan"),
    ("tesla", "Tesla"),
];

const COUNTRY_MAP: &[(&str, &str)] = &[
    ("BMW", "Germany"),
    ("Mercedes-Benz", "Germany"),
    ("Toyota", "Japan"),
    ("Honda", "Japan"),
    ("Nissan", "Japan"),
    ("Hyundai", "Korea"),
    ("Kia", "Korea"),
    ("Ford", "USA"),
    ("Chevrolet", "USA"),
    ("Tesla", "USA"),
];

/// Model substring → market segment.
const SEGMENT_MAP: &[(&str, &str)] = &[
    ("civic", "compact"),
    ("corolla", "compact"),
    ("elantra", "compact"),
    ("sentra", "compact"),
    ("forte", "compact"),
    ("camry", "midsize"),
    ("accord", "midsize"),
    ("sonata", "midsize"),
    ("altima", "midsize"),
    ("k5", "midsize"),
    ("malibu", "midsize"),
    ("rav4", "compact_suv"),
    ("cr-v", "compact_suv"),
    ("tucson", "compact_suv"),
    ("rogue", "compact_suv"),
    ("sportage", "compact_suv"),
    ("escape", "compact_suv"),
    ("equinox", "compact_suv"),
    ("highlander", "midsize_suv"),
    ("pilot", "midsize_suv"),
    ("santa fe", "midsize_suv"),
    ("pathfinder", "midsize_suv"),
    ("sorento", "midsize_suv"),
    ("explorer", "midsize_suv"),
    ("tahoe", "full_suv"),
    ("telluride", "full_suv"),
    ("x5", "luxury_suv"),
    ("gle", "luxury_suv"),
    ("x3", "luxury_suv"),
    ("f-150", "truck"),
    ("silverado", "truck"),
    ("tacoma", "truck"),
    ("frontier", "truck"),
    ("3 series", "luxury_sedan"),
    ("5 series", "luxury_sedan"),
    ("c-class", "luxury_sedan"),
    ("e-class", "luxury_sedan"),
    ("a-class", "compact_luxury"),
    ("mustang", "sports"),
    ("corvette", "sports"),
    ("bronco", "suv"),
    ("model 3", "ev"),
    ("model y", "ev_suv"),
    ("model s", "ev_luxury"),
    ("model x", "ev_suv"),
    ("cybertruck", "ev_truck"),
    ("i4", "ev_luxury"),
    ("hr-v", "subcompact_suv"),
    ("kona", "subcompact_suv"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub country: Option<&'static str>,
    pub segment: &'static str,
    pub is_luxury: bool,
}

/// Parse make/model/segment info from a sample filename.
/// Returns `None` when the name has no `make_model` shape.
pub fn vehicle_from_filename<P: AsRef<Path>>(path: P) -> Option<Vehicle> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() < 2 {
        return None;
    }

    let make_token = tokens[0].to_lowercase();
    let make = MAKE_MAP
        .iter()
        .find(|(k, _)| *k == make_token)
        .map(|(_, v)| (*v).to_string())
        .unwrap_or_else(|| title_case(&make_token));

    // Middle tokens form the model; a trailing token (year, take number) is
    // dropped when there are at least three.
    let model_tokens = if tokens.len() >= 3 {
        &tokens[1..tokens.len() - 1]
    } else {
        &tokens[1..]
    };
    let model = model_tokens
        .iter()
        .map(|t| title_case(t))
        .collect::<Vec<_>>()
        .join(" ");

    let country = COUNTRY_MAP
        .iter()
        .find(|(k, _)| *k == make)
        .map(|(_, v)| *v);

    let model_lower = model.to_lowercase();
    let segment = SEGMENT_MAP
        .iter()
        .find(|(k, _)| model_lower.contains(k))
        .map(|(_, v)| *v)
        .unwrap_or("other");

    let is_luxury = make == "BMW" || make == "Mercedes-Benz" || segment.contains("luxury");

    Some(Vehicle {
        make,
        model,
        country,
        segment,
        is_luxury,
    })
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
