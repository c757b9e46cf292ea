use rand::Rng;

use crate::{
    catalog::{Activity, Catalog},
    db::MoodValue,
    error::WellnessError,
};

/// Activities tagged with `mood`. When none is, the set widens to the
/// activities whose nearest tag sits at the smallest distance from `mood`.
/// Output keeps catalog (ascending id) order. A catalog with no tags at all
/// yields every activity.
pub fn candidates_for_mood(catalog: &Catalog, mood: MoodValue) -> Vec<&Activity> {
    let nearest = catalog
        .iter()
        .filter_map(|activity| activity.tag_distance(mood))
        .min();

    match nearest {
        Some(distance) => catalog
            .iter()
            .filter(|activity| activity.tag_distance(mood) == Some(distance))
            .collect(),
        None => catalog.iter().collect(),
    }
}

/// Drops excluded ids, unless that would leave nothing to recommend; repeats
/// beat an empty screen.
pub fn apply_exclusions<'a>(candidates: Vec<&'a Activity>, exclude: &[String]) -> Vec<&'a Activity> {
    let remaining: Vec<&Activity> = candidates
        .iter()
        .copied()
        .filter(|activity| !exclude.iter().any(|id| *id == activity.id))
        .collect();

    if remaining.is_empty() {
        candidates
    } else {
        remaining
    }
}

pub fn select_goal<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    mood: MoodValue,
    exclude: &[String],
    rng: &mut R,
) -> Result<&'a Activity, WellnessError> {
    if catalog.is_empty() {
        return Err(WellnessError::CatalogEmpty);
    }

    let candidates = apply_exclusions(candidates_for_mood(catalog, mood), exclude);
    let index = rng.gen_range(0..candidates.len());
    Ok(candidates[index])
}
