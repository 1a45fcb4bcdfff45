//! Statistical acceptance of the best correlation peak.

use crate::normalize::{CorrelationSurface, Peak, PeakList};
use crate::{MatchParams, Rejection};

const SIGMA_FLOOR: f64 = 1e-6;
/// Secondary peaks farther than this (Chebyshev) are candidates.
const SECONDARY_MIN_DISTANCE: usize = 2;
/// Candidates up to this distance take part in the Strength score.
const SECONDARY_CLOSE_DISTANCE: usize = 3;

/// Accepted peak with background statistics and its standardized
/// 5x5 neighbourhood, indexed `[row][col]` with the peak at `[2][2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PeakEvaluation {
    pub peak: Peak,
    pub strength: f64,
    pub background_mean: f64,
    pub background_sigma: f64,
    pub neighborhood: [[f64; 5]; 5],
}

pub fn evaluate_peak(
    surface: &CorrelationSurface,
    peaks: &PeakList,
    params: &MatchParams,
) -> Result<PeakEvaluation, Rejection> {
    let Some(&top) = peaks.best() else {
        return Err(Rejection::Ambiguous);
    };

    // the 5x5 neighbourhood must fit
    let margin = params.edge_margin.max(2);
    if top.col < margin
        || top.row < margin
        || top.col + margin >= surface.cols
        || top.row + margin >= surface.rows
    {
        return Err(Rejection::Edge);
    }

    let others = &peaks.as_slice()[1..];
    if !others
        .iter()
        .any(|p| top.distance(p) > SECONDARY_MIN_DISTANCE)
    {
        return Err(Rejection::Ambiguous);
    }
    let mut close = others.iter().filter(|p| {
        let d = top.distance(p);
        d > SECONDARY_MIN_DISTANCE && d <= SECONDARY_CLOSE_DISTANCE
    });
    // highest ranked close peak and the number of further close peaks
    let second = close.next();
    let extra_close = close.count();

    let (mean, sigma) = background_stats(surface, &top, params.background_exclusion)
        .ok_or(Rejection::Ambiguous)?;
    let z = |v: f64| (v - mean) / sigma;

    let bonus = params.secondary_peak_bonus;
    let strength = match second {
        None => 2.0 * z(top.value) - bonus,
        Some(second) => z(top.value) + z(second.value) + bonus * extra_close as f64,
    };
    if !strength.is_finite() || strength < params.min_strength {
        return Err(Rejection::Weak { strength });
    }

    let mut neighborhood = [[0.0; 5]; 5];
    for (dr, out_row) in neighborhood.iter_mut().enumerate() {
        let row = top.row + dr - 2;
        for (dc, out) in out_row.iter_mut().enumerate() {
            *out = z(surface.get(top.col + dc - 2, row));
        }
    }

    Ok(PeakEvaluation {
        peak: top,
        strength,
        background_mean: mean,
        background_sigma: sigma,
        neighborhood,
    })
}

/// Mean and standard deviation of the surface outside the `exclusion` block
/// centred on `peak`. `None` when fewer than two cells remain.
fn background_stats(
    surface: &CorrelationSurface,
    peak: &Peak,
    exclusion: usize,
) -> Option<(f64, f64)> {
    let half = exclusion / 2;
    let c0 = peak.col.saturating_sub(half);
    let r0 = peak.row.saturating_sub(half);
    let c1 = (peak.col + (exclusion - half)).min(surface.cols);
    let r1 = (peak.row + (exclusion - half)).min(surface.rows);

    let (mut sum, mut sum_sq) = (surface.sum, surface.sum_sq);
    for row in r0..r1 {
        for col in c0..c1 {
            let v = surface.get(col, row);
            sum -= v;
            sum_sq -= v * v;
        }
    }

    let count = surface.cols * surface.rows - (c1 - c0) * (r1 - r0);
    if count < 2 {
        return None;
    }
    let n = count as f64;
    let mean = sum / n;
    let sigma = (sum_sq / n - mean * mean).max(0.0).sqrt().max(SIGMA_FLOOR);
    Some((mean, sigma))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Surface with a background checkerboard of +-0.1 and explicit spikes.
    fn surface(n: usize, spikes: &[(usize, usize, f64)]) -> (CorrelationSurface, PeakList) {
        let mut data = vec![0.0; n * n];
        for row in 0..n {
            for col in 0..n {
                data[row * n + col] = if (row + col) % 2 == 0 { 0.1 } else { -0.1 };
            }
        }
        for &(col, row, v) in spikes {
            data[row * n + col] = v;
        }
        let mut peaks = PeakList::new();
        for row in 0..n {
            for col in 0..n {
                peaks.insert(Peak {
                    value: data[row * n + col],
                    col,
                    row,
                });
            }
        }
        let sum = data.iter().sum();
        let sum_sq = data.iter().map(|v| v * v).sum();
        (
            CorrelationSurface {
                cols: n,
                rows: n,
                data,
                sum,
                sum_sq,
            },
            peaks,
        )
    }

    #[test]
    fn peak_on_border_band_is_edge() {
        let params = MatchParams::default();
        let (s, p) = surface(33, &[(1, 16, 0.9)]);
        assert_eq!(evaluate_peak(&s, &p, &params), Err(Rejection::Edge));
        let (s, p) = surface(33, &[(16, 31, 0.9)]);
        assert_eq!(evaluate_peak(&s, &p, &params), Err(Rejection::Edge));
    }

    #[test]
    fn isolated_peak_is_accepted_with_background_stats() {
        let params = MatchParams::default();
        let (s, p) = surface(33, &[(16, 16, 0.9)]);
        let eval = evaluate_peak(&s, &p, &params).unwrap();
        assert_eq!((eval.peak.col, eval.peak.row), (16, 16));
        assert_relative_eq!(eval.background_sigma, 0.1, epsilon = 1e-3);
        let z = (0.9 - eval.background_mean) / eval.background_sigma;
        assert_relative_eq!(eval.strength, 2.0 * z - 0.2, epsilon = 1e-9);
        assert_relative_eq!(eval.neighborhood[2][2], z, epsilon = 1e-9);
        assert!(eval.neighborhood[0][0] < 2.0);
    }

    #[test]
    fn close_secondary_peak_switches_strength_formula() {
        let params = MatchParams::default();
        let (s, p) = surface(33, &[(16, 16, 0.9), (19, 16, 0.6)]);
        let eval = evaluate_peak(&s, &p, &params).unwrap();
        let z1 = (0.9 - eval.background_mean) / eval.background_sigma;
        let z2 = (0.6 - eval.background_mean) / eval.background_sigma;
        assert_relative_eq!(eval.strength, z1 + z2, epsilon = 1e-9);
    }

    #[test]
    fn every_further_close_peak_adds_the_bonus() {
        let params = MatchParams::default();
        let (s, p) = surface(33, &[(16, 16, 0.9), (19, 16, 0.6), (16, 13, 0.5), (13, 19, 0.4)]);
        let eval = evaluate_peak(&s, &p, &params).unwrap();
        let z1 = (0.9 - eval.background_mean) / eval.background_sigma;
        let z2 = (0.6 - eval.background_mean) / eval.background_sigma;
        assert_relative_eq!(eval.strength, z1 + z2 + 2.0 * 0.2, epsilon = 1e-9);

        // peaks at distance 4 are candidates but not close
        let (s, p) = surface(33, &[(16, 16, 0.9), (19, 16, 0.6), (20, 16, 0.5)]);
        let eval = evaluate_peak(&s, &p, &params).unwrap();
        let z1 = (0.9 - eval.background_mean) / eval.background_sigma;
        let z2 = (0.6 - eval.background_mean) / eval.background_sigma;
        assert_relative_eq!(eval.strength, z1 + z2, epsilon = 1e-9);
    }

    #[test]
    fn no_distant_candidate_is_ambiguous() {
        let params = MatchParams::default();
        let n = 33;
        let mut data = vec![0.0; n * n];
        data[16 * n + 16] = 0.9;
        let mut peaks = PeakList::new();
        peaks.insert(Peak {
            value: 0.9,
            col: 16,
            row: 16,
        });
        for (dc, dr) in [(1, 0), (0, 1), (2, 2)] {
            peaks.insert(Peak {
                value: 0.5,
                col: 16 + dc,
                row: 16 + dr,
            });
        }
        let s = CorrelationSurface {
            cols: n,
            rows: n,
            sum: 0.9 + 1.5,
            sum_sq: 0.81 + 0.75,
            data,
        };
        assert_eq!(evaluate_peak(&s, &peaks, &params), Err(Rejection::Ambiguous));
    }

    #[test]
    fn weak_peak_is_rejected() {
        let params = MatchParams {
            min_strength: 1000.0,
            ..MatchParams::default()
        };
        let (s, p) = surface(33, &[(16, 16, 0.9)]);
        assert!(matches!(
            evaluate_peak(&s, &p, &params),
            Err(Rejection::Weak { .. })
        ));
    }

    #[test]
    fn tiny_surface_has_no_background() {
        let params = MatchParams::default();
        let (s, p) = surface(9, &[(4, 4, 0.9)]);
        assert_eq!(evaluate_peak(&s, &p, &params), Err(Rejection::Ambiguous));
    }
}
