//! Continuous output assembled from the Nordsieck history of each step.

use crate::{methods::lsoda::NordsieckSegment, Float};

/// Piecewise dense output over all accepted steps.
#[derive(Debug, Clone)]
pub struct ContinuousOutput {
    segs: Vec<NordsieckSegment>,
}

impl ContinuousOutput {
    /// Build a ContinuousOutput from the per-step interpolants in step order.
    pub(crate) fn from_segments(segs: Vec<NordsieckSegment>) -> Self {
        let segs = segs
            .into_iter()
            .filter(|s| s.t_start() != s.t_end())
            .collect();
        Self { segs }
    }

    /// Domain covered by the dense output.
    pub fn t_span(&self) -> Option<(Float, Float)> {
        let first = self.segs.first()?;
        let last = self.segs.last()?;
        Some((first.t_start(), last.t_end()))
    }

    /// Interpolate y(t) if t lies within any recorded step; returns None if outside.
    pub fn evaluate(&self, t: Float) -> Option<Vec<Float>> {
        self.evaluate_derivative(t, 0)
    }

    /// k-th derivative at `t`; None outside the covered range or when `k`
    /// exceeds the order used on that step.
    pub fn evaluate_derivative(&self, t: Float, k: usize) -> Option<Vec<Float>> {
        let seg = self.find_segment(t)?;
        if k > seg.order() {
            return None;
        }
        let mut dky = vec![0.0; seg.dim()];
        seg.derivative(t, k, &mut dky);
        Some(dky)
    }

    /// Batch-evaluate at many times; returns None for points outside coverage.
    pub fn evaluate_many(&self, ts: &[Float]) -> Vec<Option<Vec<Float>>> {
        ts.iter().map(|&t| self.evaluate(t)).collect()
    }

    pub fn segments(&self) -> &[NordsieckSegment] {
        &self.segs
    }

    fn find_segment(&self, t: Float) -> Option<&NordsieckSegment> {
        // Steps are contiguous and ordered; binary search on the distance along
        // the integration direction.
        let (first, last) = (self.segs.first()?, self.segs.last()?);
        let dir = (last.t_end() - first.t_start()).signum();
        let idx = self
            .segs
            .partition_point(|s| (s.t_end() - t) * dir < 0.0);
        let seg = self.segs.get(idx)?;
        let left = seg.t_start().min(seg.t_end());
        let right = seg.t_start().max(seg.t_end());
        (t >= left && t <= right).then_some(seg)
    }
}
