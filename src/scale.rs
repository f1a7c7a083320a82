use indexmap::IndexSet;

/// Stable value -> position encoder for categorical data on a numeric axis.
///
/// Positions are handed out in first-seen order and never change once
/// assigned; `labels()` is the reverse lookup used for tick labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoricalEncoder {
    values: IndexSet<String>,
}

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `value`, assigning the next free one if unseen.
    pub fn encode(&mut self, value: &str) -> usize {
        if let Some(idx) = self.values.get_index_of(value) {
            return idx;
        }
        self.values.insert_full(value.to_string()).0
    }

    pub fn lookup(&self, value: &str) -> Option<usize> {
        self.values.get_index_of(value)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.values.get_index(index).map(String::as_str)
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub const DEFAULT_RADIUS: f64 = 4.0;
pub const MAX_RADIUS: f64 = 20.0;

/// Linear mapping from a size field onto bubble radii.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusScale {
    domain: Option<(f64, f64)>,
    range: (f64, f64),
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self {
            domain: None,
            range: (DEFAULT_RADIUS, MAX_RADIUS),
        }
    }
}

impl RadiusScale {
    /// Fit the domain to the data. Empty or constant input yields a
    /// scale that always returns the default radius.
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let domain = if min.is_finite() && max.is_finite() && max > min {
            Some((min, max))
        } else {
            None
        };
        Self {
            domain,
            ..Self::default()
        }
    }

    pub fn radius(&self, value: Option<f64>) -> f64 {
        match (self.domain, value) {
            (Some((min, max)), Some(v)) => {
                let t = ((v - min) / (max - min)).clamp(0.0, 1.0);
                self.range.0 + t * (self.range.1 - self.range.0)
            }
            _ => DEFAULT_RADIUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_first_seen() {
        let mut enc = CategoricalEncoder::new();
        let encoded: Vec<usize> = ["low", "high", "low"].iter().map(|v| enc.encode(v)).collect();
        assert_eq!(encoded, vec![0, 1, 0]);
        assert_eq!(enc.labels(), vec!["low", "high"]);
        assert_eq!(enc.lookup("high"), Some(1));
        assert_eq!(enc.lookup("mid"), None);
        assert_eq!(enc.label(0), Some("low"));
        assert_eq!(enc.len(), 2);
    }

    #[test]
    fn test_encoders_are_independent() {
        let mut x = CategoricalEncoder::new();
        let mut y = CategoricalEncoder::new();
        x.encode("a");
        x.encode("b");
        assert_eq!(y.encode("b"), 0);
        assert!(x.lookup("b") == Some(1));
    }

    #[test]
    fn test_radius_scale() {
        let scale = RadiusScale::fit(vec![10.0, 20.0, 30.0]);
        assert_eq!(scale.radius(Some(10.0)), DEFAULT_RADIUS);
        assert_eq!(scale.radius(Some(30.0)), MAX_RADIUS);
        assert_eq!(scale.radius(Some(20.0)), 12.0);
        assert_eq!(scale.radius(None), DEFAULT_RADIUS);
    }

    #[test]
    fn test_radius_scale_degenerate() {
        assert_eq!(RadiusScale::fit(vec![5.0, 5.0]).radius(Some(5.0)), DEFAULT_RADIUS);
        assert_eq!(RadiusScale::fit(Vec::new()).radius(Some(1.0)), DEFAULT_RADIUS);
    }
}
