//! Parsing of optimizer sweep ranges such as `"10-20:2"`.

/// Upper bound on the number of values a single range expands to.
pub const MAX_RANGE_VALUES: usize = 80;

const MAX_DECIMALS: usize = 10;

/// Expand a range spec into ascending sweep values.
///
/// Accepted forms:
/// - `"min-max:step"`
/// - `"min-max"`: step 1 when both bounds are integral, otherwise 0.5
/// - `"value"`: a single value
///
/// Values are `min + k * step`, rounded to the decimal precision of the step
/// or min (whichever is finer) so float accumulation never leaks into
/// parameter values. Anything malformed yields an empty vector.
pub fn parse_range_spec(spec: &str) -> Vec<f64> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Vec::new();
    }

    let (bounds, step_str) = match spec.split_once(':') {
        Some((bounds, step)) => (bounds.trim(), Some(step.trim())),
        None => (spec, None),
    };

    let Some((min_str, max_str)) = split_bounds(bounds) else {
        // bare number, no step allowed
        if step_str.is_some() {
            return Vec::new();
        }
        return match parse_finite(bounds) {
            Some(v) => vec![v],
            None => Vec::new(),
        };
    };

    let (Some(min), Some(max)) = (parse_finite(min_str), parse_finite(max_str)) else {
        return Vec::new();
    };
    if min > max {
        return Vec::new();
    }

    let (step, step_decimals) = match step_str {
        Some(s) => match parse_finite(s) {
            Some(step) => (step, decimals(s)),
            None => return Vec::new(),
        },
        None if min.fract() == 0.0 && max.fract() == 0.0 => (1.0, 0),
        None => (0.5, 1),
    };
    if step <= 0.0 {
        return Vec::new();
    }

    let precision = step_decimals.max(decimals(min_str));
    let scale = 10f64.powi(precision as i32);
    let steps = ((max - min) / step + 1e-9).floor() as usize;

    (0..=steps)
        .take(MAX_RANGE_VALUES)
        .map(|k| ((min + k as f64 * step) * scale).round() / scale)
        .collect()
}

/// Split `"a-b"` at the separating dash, allowing a leading minus on `a`.
fn split_bounds(bounds: &str) -> Option<(&str, &str)> {
    let dash = bounds
        .char_indices()
        .skip(1)
        .find(|&(i, c)| c == '-' && !bounds[..i].ends_with(['e', 'E']))
        .map(|(i, _)| i)?;
    Some((bounds[..dash].trim(), bounds[dash + 1..].trim()))
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Digits after the decimal point, capped at [`MAX_DECIMALS`]. Exponent
/// notation takes the cap.
fn decimals(s: &str) -> usize {
    if s.contains(['e', 'E']) {
        return MAX_DECIMALS;
    }
    s.split_once('.')
        .map_or(0, |(_, frac)| frac.len())
        .min(MAX_DECIMALS)
}
