//! Reduces member states into the state the group reports for itself.

use std::collections::{BTreeSet, HashMap};

use super::{
    capability::SUPPORT_GROUP_LIGHT,
    color::{DEFAULT_MAX_MIREDS, DEFAULT_MIN_MIREDS},
    state::{Chromaticity, GroupState, MemberState},
};

/// `states` holds every member that reported a state. Members that are on
/// decide the light attributes; every member counts towards availability,
/// the color temperature range, effect list and supported features.
pub fn aggregate(states: &[MemberState]) -> GroupState {
    let on_states: Vec<&MemberState> = states.iter().filter(|state| state.is_on()).collect();

    let effect_lists: Vec<&Vec<String>> = states
        .iter()
        .filter_map(|state| state.effect_list.as_ref())
        .collect();
    let effect_list = (!effect_lists.is_empty()).then(|| {
        effect_lists
            .into_iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    });

    let supported_features = states
        .iter()
        .fold(0, |mask, state| mask | state.supported_features)
        & SUPPORT_GROUP_LIGHT;

    GroupState {
        is_on: !on_states.is_empty(),
        available: states.iter().any(|state| state.available),
        brightness: mean(on_states.iter().filter_map(|state| state.brightness)),
        hs_color: mean_chromaticity(on_states.iter().filter_map(|state| state.hs_color)),
        color_temp: mean(on_states.iter().filter_map(|state| state.color_temp)),
        min_mireds: states
            .iter()
            .filter_map(|state| state.min_mireds)
            .min()
            .unwrap_or(DEFAULT_MIN_MIREDS),
        max_mireds: states
            .iter()
            .filter_map(|state| state.max_mireds)
            .max()
            .unwrap_or(DEFAULT_MAX_MIREDS),
        white_value: mean(on_states.iter().filter_map(|state| state.white_value)),
        effect_list,
        effect: most_common(on_states.iter().filter_map(|state| state.effect.as_deref())),
        supported_features,
    }
}

/// Rounded arithmetic mean, `None` for no values.
fn mean<T>(values: impl Iterator<Item = T>) -> Option<T>
where
    T: Into<f64> + TryFrom<u32>,
{
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count): (f64, u32), value| {
        (sum + Into::<f64>::into(value), count + 1)
    });

    if count == 0 {
        return None;
    }

    // the mean of values of T always fits in T
    T::try_from((sum / f64::from(count)).round() as u32).ok()
}

fn mean_chromaticity(values: impl Iterator<Item = Chromaticity>) -> Option<Chromaticity> {
    let (hue, saturation, count) = values.fold((0.0, 0.0, 0u32), |(hue, saturation, count), value| {
        (hue + value.hue, saturation + value.saturation, count + 1)
    });

    (count > 0).then(|| Chromaticity::new(hue / count as f32, saturation / count as f32))
}

/// Most frequent value, ties go to the value seen first.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (position, value) in values.enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string())
}
