/// Summary statistics of a small sample, used in training log lines.
#[derive(Debug, Clone, Copy)]
pub struct DescriptiveStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl DescriptiveStats {
    /// Computes min/max/mean over the values; `None` for an empty sample.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in values {
            min = min.min(value);
            max = max.max(value);
            sum += value;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            min,
            max,
            mean: sum / count as f32,
        })
    }
}
