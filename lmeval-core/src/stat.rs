//! Running statistics of episode scalars.

/// Accumulates count, sum and maximum of a stream of values.
///
/// One counter is kept per metric (score, distance error) for a single
/// evaluation run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatCounter {
    count: usize,
    sum: f64,
    max: Option<f32>,
}

impl StatCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn feed(&mut self, v: f32) {
        self.count += 1;
        self.sum += v as f64;
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    /// The number of values fed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the values, `None` if nothing has been fed.
    pub fn average(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some((self.sum / self.count as f64) as f32)
        }
    }

    /// Maximum of the values, `None` if nothing has been fed.
    pub fn max(&self) -> Option<f32> {
        self.max
    }
}

impl Extend<f32> for StatCounter {
    fn extend<T: IntoIterator<Item = f32>>(&mut self, iter: T) {
        for v in iter {
            self.feed(v);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_average_and_max() {
        let values = [3.0f32, -1.5, 7.25, 0.0, 2.0];
        let mut stat = StatCounter::new();
        stat.extend(values.iter().copied());

        let sum: f32 = values.iter().sum();
        assert_eq!(stat.count(), values.len());
        assert!((stat.average().unwrap() - sum / values.len() as f32).abs() < 1e-6);
        assert_eq!(stat.max(), Some(7.25));
    }

    #[test]
    fn test_empty() {
        let mut stat = StatCounter::new();
        assert_eq!(stat.count(), 0);
        assert_eq!(stat.average(), None);
        assert_eq!(stat.max(), None);

        stat.feed(-4.0);
        assert_eq!(stat.max(), Some(-4.0));
        assert_eq!(stat.average(), Some(-4.0));
    }
}
