//! Small numeric helpers shared across analysis steps.

/// Amplitude floor used before taking logs (corresponds to -100 dB).
pub const AMP_FLOOR: f32 = 1e-5;

#[inline]
pub fn amp_to_db(a: f32) -> f32 {
    20.0 * a.max(AMP_FLOOR).log10()
}

#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Compute median of a list. Sorts in place.
pub fn median(xs: &mut [f32]) -> f32 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let m = xs.len() / 2;
    if xs.len() % 2 == 1 {
        xs[m]
    } else {
        0.5 * (xs[m - 1] + xs[m])
    }
}

pub fn mean(xs: &[f32]) -> f32 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f32>() / xs.len() as f32
    }
}

/// Population standard deviation.
pub fn std_dev(xs: &[f32]) -> f32 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|&x| (x - m) * (x - m)).sum::<f32>() / xs.len() as f32;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_basic() {
        let mut v = vec![3.0, 1.0, 4.0, 1.5, 2.0];
        assert!((median(&mut v) - 2.0).abs() < 1e-6);
        let mut w = vec![1.0, 2.0, 3.0, 4.0];
        assert!((median(&mut w) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn db_roundtrip() {
        let db = -20.0;
        assert!((amp_to_db(db_to_lin(db)) - db).abs() < 1e-4);
    }

    #[test]
    fn amp_floor_clamps() {
        assert!((amp_to_db(0.0) + 100.0).abs() < 1e-4);
    }
}
