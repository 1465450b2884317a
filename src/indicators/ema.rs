// =============================================================================
// Exponentially Weighted Moving Average (EWMA) and rolling windows
// =============================================================================
//
// Every smoothed series in the engine goes through `ewm_mean`. It is the
// adjusted form: the value at t is the weighted mean of all observations so
// far, with weight (1 - α)^i on the observation i steps back.
//
//   y_t = Σ (1-α)^i · x_{t-i}  /  Σ (1-α)^i
//
// Three parameterisations of α appear across the indicators and they are not
// interchangeable:
//   span  s  =>  α = 2 / (s + 1)      (MACD)
//   com   c  =>  α = 1 / (c + 1)      (ADX directional movement)
//   alpha a  =>  α = a                (Wilder: α = 1/n in ATR, RSI, ADX)
//
// Missing inputs (NaN) contribute nothing but still age the older weights.
// `min_periods` counts non-missing observations; earlier outputs are NaN.
// =============================================================================

/// How the smoothing factor α is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    Span(f64),
    CenterOfMass(f64),
    Alpha(f64),
}

impl Smoothing {
    /// Wilder's smoothing for period `n`: α = 1/n.
    pub fn wilder(n: usize) -> Self {
        Smoothing::Alpha(1.0 / n as f64)
    }

    pub fn alpha(self) -> f64 {
        match self {
            Smoothing::Span(s) => 2.0 / (s + 1.0),
            Smoothing::CenterOfMass(c) => 1.0 / (c + 1.0),
            Smoothing::Alpha(a) => a,
        }
    }
}

/// Adjusted exponentially weighted mean of `values`.
///
/// Output has the same length as the input. Position t is NaN until
/// `min_periods` non-missing observations have been seen.
pub fn ewm_mean(values: &[f64], smoothing: Smoothing, min_periods: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some((&first, rest)) = values.split_first() else {
        return out;
    };

    let decay = 1.0 - smoothing.alpha();
    let min_periods = min_periods.max(1);

    let mut weighted = first;
    let mut nobs = usize::from(!first.is_nan());
    let mut old_wt = 1.0;
    out.push(if nobs >= min_periods { weighted } else { f64::NAN });

    for &cur in rest {
        let is_obs = !cur.is_nan();
        nobs += usize::from(is_obs);

        if !weighted.is_nan() {
            old_wt *= decay;
            if is_obs {
                // Equal values leave the mean untouched; skipping the division
                // keeps constant series exact.
                if weighted != cur {
                    weighted = (old_wt * weighted + cur) / (old_wt + 1.0);
                }
                old_wt += 1.0;
            }
        } else if is_obs {
            weighted = cur;
        }

        out.push(if nobs >= min_periods { weighted } else { f64::NAN });
    }

    out
}

/// Exponential moving average with span `span`, undefined until `span`
/// observations have accumulated.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    ewm_mean(values, Smoothing::Span(span as f64), span)
}

/// Trailing mean over exactly `window` samples. NaN until the window is full
/// or whenever it contains a missing value.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation (n - 1 denominator) over exactly
/// `window` samples. A window of one has no spread estimate and yields NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        (ss / (n - 1.0)).sqrt()
    })
}

fn rolling(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        if w.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i + window - 1] = f(w);
    }
    out
}

/// First difference `v[t] - v[t-1]`; position 0 is NaN.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(values.windows(2).map(|w| w[1] - w[0]));
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    // ---- ewm_mean --------------------------------------------------------

    #[test]
    fn ewm_empty_input() {
        assert!(ewm_mean(&[], Smoothing::Span(3.0), 3).is_empty());
    }

    #[test]
    fn ewm_adjusted_known_values() {
        // span 3 => α = 0.5, decay 0.5.
        // y0 = 1
        // y1 = (0.5*1 + 2) / 1.5             = 5/3
        // y2 = (0.25*1 + 0.5*2 + 3) / 1.75   = 17/7
        let out = ewm_mean(&[1.0, 2.0, 3.0], Smoothing::Span(3.0), 1);
        assert!(close(out[0], 1.0));
        assert!(close(out[1], 5.0 / 3.0));
        assert!(close(out[2], 17.0 / 7.0));
    }

    #[test]
    fn ewm_min_periods_leaves_leading_nan() {
        let out = ewm_mean(&[1.0, 2.0, 3.0, 4.0], Smoothing::Span(3.0), 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(close(out[2], 17.0 / 7.0));
        assert!(!out[3].is_nan());
    }

    #[test]
    fn ewm_skips_leading_missing_values() {
        let out = ewm_mean(&[f64::NAN, f64::NAN, 4.0, 4.0], Smoothing::Alpha(0.5), 2);
        assert!(out[0].is_nan() && out[1].is_nan() && out[2].is_nan());
        assert!(close(out[3], 4.0));
    }

    #[test]
    fn ewm_interior_gap_still_decays() {
        // α = 0.5: after [2, NaN, 4] the weight on 2 is 0.25, on 4 is 1.
        let out = ewm_mean(&[2.0, f64::NAN, 4.0], Smoothing::Alpha(0.5), 1);
        assert!(close(out[1], 2.0));
        assert!(close(out[2], (0.25 * 2.0 + 4.0) / 1.25));
    }

    #[test]
    fn smoothing_parameterisations_differ() {
        assert!(close(Smoothing::Span(9.0).alpha(), 0.2));
        assert!(close(Smoothing::CenterOfMass(14.0).alpha(), 1.0 / 15.0));
        assert!(close(Smoothing::wilder(14).alpha(), 1.0 / 14.0));
    }

    #[test]
    fn ema_of_constant_is_exact() {
        let out = calculate_ema(&[7.25; 40], 12);
        assert!(out[..11].iter().all(|v| v.is_nan()));
        assert!(out[11..].iter().all(|&v| v == 7.25));
    }

    // ---- rolling ---------------------------------------------------------

    #[test]
    fn rolling_mean_window_three() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert!(close(out[2], 2.0));
        assert!(close(out[3], 3.0));
    }

    #[test]
    fn rolling_std_is_sample_estimator() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // Sum of squared deviations around 5 is 32; 32 / 7.
        assert!(close(out[7], (32.0_f64 / 7.0).sqrt()));
    }

    #[test]
    fn rolling_window_longer_than_input() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_window_with_gap_is_undefined() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(out[1].is_nan() && out[2].is_nan());
        assert!(close(out[3], 3.5));
    }

    #[test]
    fn diff_first_is_nan() {
        let out = diff(&[1.0, 4.0, 2.0]);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[3.0, -2.0]);
    }
}
