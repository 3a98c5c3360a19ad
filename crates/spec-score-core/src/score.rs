/// Quality axes in fixed order. Downstream consumers (result axes, chart
/// angles, labels) index positionally and must never reorder.
pub const AXIS_NAMES: [&str; 4] = ["completeness", "clarity", "constraints", "specificity"];

pub type ScoreVector = [f64; 4];

const NORM_EPSILON: f64 = 1e-9;
const MEAN_FLOOR: f64 = 0.01;

/// Caller-scored axes, each in [0,1]. The caller reads the spec and scores
/// it; this engine only does the math. `weakest` and `tip` are caller
/// annotations carried through to the result.
#[derive(Debug, Clone, Default)]
pub struct AxisScores {
    pub completeness: f64,
    pub clarity: f64,
    pub constraints: f64,
    pub specificity: f64,
    pub weakest: String,
    pub tip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    ShipIt,
    Almost,
    Vague,
    Unbounded,
    OverConstrained,
    Sketch,
    Draft,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Self::ShipIt => "SHIP IT",
            Self::Almost => "ALMOST",
            Self::Vague => "VAGUE",
            Self::Unbounded => "UNBOUNDED",
            Self::OverConstrained => "OVER-CONSTRAINED",
            Self::Sketch => "SKETCH",
            Self::Draft => "DRAFT",
        }
    }

    /// Display string: label and qualifier joined by `" - "`. Callers that
    /// want the bare label split on that separator (or use `label`).
    pub fn message(self) -> &'static str {
        match self {
            Self::ShipIt => "SHIP IT - spec is ready for the machine",
            Self::Almost => "ALMOST - minor gaps, review needed",
            Self::Vague => "VAGUE - well-structured but too abstract",
            Self::Unbounded => "UNBOUNDED - clear goal, no limits defined",
            Self::OverConstrained => "OVER-CONSTRAINED - lots of rules, unclear purpose",
            Self::Sketch => "SKETCH - needs much more detail",
            Self::Draft => "DRAFT - developing, add more context",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AxisValue {
    pub axis: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct ScoreDetails {
    pub mean: f64,
    pub weakest: String,
    pub strongest: String,
    pub tip: String,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub vector: ScoreVector,
    pub balance: f64,
    pub verdict: Verdict,
    pub axes: [AxisValue; 4],
    pub details: ScoreDetails,
}

fn norm(v: &ScoreVector) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Below epsilon the vector saturates to all-zero instead of dividing by ~0.
fn normalize(v: ScoreVector) -> ScoreVector {
    let n = norm(&v);
    if n < NORM_EPSILON {
        return [0.0; 4];
    }
    v.map(|x| x / n)
}

/// Presentation rounding only; `balance` stays full precision.
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Total over [0,1]^4, including the all-zero vector. Range validation is
/// the calling boundary's job.
pub fn score_from_axes(axes: &AxisScores) -> ScoreResult {
    let raw: ScoreVector = [
        axes.completeness,
        axes.clarity,
        axes.constraints,
        axes.specificity,
    ];
    let vector = normalize(raw);

    let mean = vector.iter().sum::<f64>() / 4.0;
    let variance = vector.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 4.0;
    // A vector with no signal has no balance either.
    let balance = if mean < MEAN_FLOOR {
        0.0
    } else {
        (1.0 - variance.sqrt() / mean).max(0.0)
    };

    let verdict = classify(&vector, balance, mean);

    // Lowest index wins ties in both directions.
    let mut min_idx = 0;
    let mut max_idx = 0;
    for i in 1..4 {
        if vector[i] < vector[min_idx] {
            min_idx = i;
        }
        if vector[i] > vector[max_idx] {
            max_idx = i;
        }
    }

    let weakest = if axes.weakest.is_empty() {
        AXIS_NAMES[min_idx].to_string()
    } else {
        axes.weakest.clone()
    };

    ScoreResult {
        vector,
        balance,
        verdict,
        axes: core::array::from_fn(|i| AxisValue {
            axis: AXIS_NAMES[i],
            value: round4(vector[i]),
        }),
        details: ScoreDetails {
            mean: round4(mean),
            weakest,
            strongest: AXIS_NAMES[max_idx].to_string(),
            tip: axes.tip.clone(),
        },
    }
}

/// Ordered rule list over the normalized vector. First match wins; later
/// rules are unreachable once an earlier one fires.
fn classify(v: &ScoreVector, balance: f64, mean: f64) -> Verdict {
    if balance > 0.75 && mean > 0.45 {
        return Verdict::ShipIt;
    }
    if balance > 0.6 && mean > 0.35 {
        return Verdict::Almost;
    }
    if v[0] > 0.6 && v[3] < 0.2 {
        return Verdict::Vague;
    }
    if v[1] > 0.6 && v[2] < 0.2 {
        return Verdict::Unbounded;
    }
    if v[2] > 0.5 && v[1] < 0.2 {
        return Verdict::OverConstrained;
    }
    if mean < 0.25 {
        return Verdict::Sketch;
    }
    Verdict::Draft
}
