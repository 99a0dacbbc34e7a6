use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// `count`/`mean`/`std`/`min`/`max` of a sample, mirroring a dataframe
/// `describe()` without the quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarise a sample. Returns `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: n,
            mean,
            std,
            min,
            max,
        })
    }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Shared bin edges: bin `i` covers `[start + i*width, start + (i+1)*width)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bins {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

impl Bins {
    /// Choose bins covering `values` with Sturges' rule, widened to a nice step.
    pub fn auto(values: &[f64]) -> Option<Self> {
        let summary = Summary::of(values)?;
        let range = summary.max - summary.min;
        if range <= 0.0 {
            return Some(Self {
                start: summary.min - 0.5,
                width: 1.0,
                count: 1,
            });
        }

        let sturges = (values.len() as f64).log2().ceil() as usize + 1;
        let width = nice_step(range / sturges as f64);
        let start = (summary.min / width).floor() * width;
        let count = (((summary.max - start) / width).floor() as usize + 1).max(1);
        Some(Self {
            start,
            width,
            count,
        })
    }

    /// Index of the bin holding `value`, clamped into range.
    pub fn index_of(&self, value: f64) -> usize {
        let raw = ((value - self.start) / self.width).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.count - 1)
        }
    }

    /// Centre of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.width
    }

    /// Count how many of `values` fall in each bin.
    pub fn counts(&self, values: &[f64]) -> Vec<u32> {
        let mut counts = vec![0u32; self.count];
        for &v in values {
            counts[self.index_of(v)] += 1;
        }
        counts
    }
}

/// Round `raw` up to the next 1, 2, 2.5 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    let exp = raw.log10().floor();
    let base = 10f64.powf(exp);
    let fraction = raw / base;
    let nice = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|&m| fraction <= m + 1e-9)
        .unwrap_or(10.0);
    nice * base
}
