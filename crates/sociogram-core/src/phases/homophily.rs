//! Homophily significance test.
//!
//! Edges whose endpoints both carry a `color` are split into same-colour and
//! cross-colour samples, scored by degree similarity `−|deg(u) − deg(v)|`,
//! and compared with Welch's unequal-variance t-test.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::config::{HomophilyOutcome, HomophilyTest};
use crate::graph::social_graph::SocialGraph;

/// Significance level for the `significant` flag.
pub const ALPHA: f64 = 0.05;

/// Run the homophily test. Fewer than two samples in either group yields
/// [`HomophilyOutcome::Insufficient`].
pub fn homophily(graph: &SocialGraph) -> HomophilyOutcome {
    let (same, different) = similarity_samples(graph);
    if same.len() < 2 || different.len() < 2 {
        log::warn!(
            "Homophily test skipped: {} same-color and {} cross-color edges",
            same.len(),
            different.len()
        );
        return HomophilyOutcome::Insufficient {
            same: same.len(),
            different: different.len(),
        };
    }

    let (t, p) = welch_t_test(&same, &different);
    let d = cohens_d(&same, &different);

    HomophilyOutcome::Tested(HomophilyTest {
        t: round_to(t, 3),
        p: round_to(p, 4),
        d: round_to(d, 3),
        same_count: same.len(),
        different_count: different.len(),
        same_mean: mean(&same),
        different_mean: mean(&different),
        significant: p < ALPHA,
    })
}

/// Degree-similarity scores split into (same colour, different colour).
pub fn similarity_samples(graph: &SocialGraph) -> (Vec<f64>, Vec<f64>) {
    let mut same = Vec::new();
    let mut different = Vec::new();

    for (_, a, b, _) in graph.edges() {
        let (Some(ca), Some(cb)) = (&graph.node_data(a).color, &graph.node_data(b).color) else {
            continue;
        };
        let sim = -(graph.degree(a) as f64 - graph.degree(b) as f64).abs();
        if ca == cb {
            same.push(sim);
        } else {
            different.push(sim);
        }
    }
    (same, different)
}

/// Welch's t statistic and two-sided p-value.
///
/// Samples must hold at least two values each. With zero standard error the
/// result is `(0, 1)` for equal means and `(±∞, 0)` otherwise.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> (f64, f64) {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a), mean(b));
    let (v1, v2) = (sample_variance(a), sample_variance(b));

    let se2 = v1 / n1 + v2 / n2;
    if se2 <= 0.0 || !se2.is_finite() {
        return if m1 == m2 {
            (0.0, 1.0)
        } else {
            ((m1 - m2).signum() * f64::INFINITY, 0.0)
        };
    }

    let t = (m1 - m2) / se2.sqrt();
    let df = se2 * se2
        / ((v1 / n1).powi(2) / (n1 - 1.0) + (v2 / n2).powi(2) / (n2 - 1.0));

    let p = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    };
    (t, p)
}

/// Cohen's d with pooled standard deviation (floored at 1e-9).
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let pooled = (((n1 - 1.0) * sample_variance(a) + (n2 - 1.0) * sample_variance(b))
        / (n1 + n2 - 2.0))
        .sqrt();
    (mean(a) - mean(b)) / pooled.max(1e-9)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n < 2.0 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
