//! Threshold evaluator for thumbstick driven bindings
//!
//! Turns a continuous stick position into an engaged flag for one region.
//! Leaving the engaged state is reported exactly once; getting back in
//! requires the projection to cross the threshold again.

use crate::mapping::mapping_types::ThumbRegion;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThresholdOutcome {
    pub engaged: bool,
    /// True only on the frame the position fell back below the threshold
    pub just_disengaged: bool,
}

#[derive(Clone, Debug)]
pub struct ThresholdEvaluator {
    region: ThumbRegion,
    threshold: f32,
    engaged: bool,
}

impl ThresholdEvaluator {
    pub fn new(region: ThumbRegion, threshold: f32) -> Self {
        Self {
            region,
            threshold,
            engaged: false,
        }
    }

    /// A threshold of zero means plain button semantics, no evaluator at all
    pub fn is_bypassed(threshold: f32) -> bool {
        threshold <= 0.0
    }

    pub fn region(&self) -> ThumbRegion {
        self.region
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn evaluate(&mut self, position: (f32, f32)) -> ThresholdOutcome {
        let projection = self.region.project(position.0, position.1);
        let engaged = projection >= self.threshold;
        let just_disengaged = self.engaged && !engaged;
        self.engaged = engaged;
        ThresholdOutcome {
            engaged,
            just_disengaged,
        }
    }

    pub fn reset(&mut self) {
        self.engaged = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_dip_disengages_once() {
        let mut eval = ThresholdEvaluator::new(ThumbRegion::Up, 0.5);
        let outcomes: Vec<ThresholdOutcome> = [0.0, 0.6, 0.4, 0.6]
            .iter()
            .map(|y| eval.evaluate((0.0, *y)))
            .collect();

        assert_eq!(
            outcomes.iter().filter(|o| o.just_disengaged).count(),
            1,
            "one disengage for one dip"
        );
        assert!(outcomes[2].just_disengaged);
        assert!(!outcomes[2].engaged);
        assert!(outcomes[3].engaged);
        assert!(!outcomes[3].just_disengaged);
    }

    #[test]
    fn staying_below_reports_nothing_further() {
        let mut eval = ThresholdEvaluator::new(ThumbRegion::Right, 0.5);
        eval.evaluate((0.9, 0.0));
        assert!(eval.evaluate((0.2, 0.0)).just_disengaged);
        assert!(!eval.evaluate((0.3, 0.0)).just_disengaged);
        assert!(!eval.evaluate((0.49, 0.0)).engaged);
    }

    #[test]
    fn opposite_direction_never_engages() {
        let mut eval = ThresholdEvaluator::new(ThumbRegion::Up, 0.3);
        assert!(!eval.evaluate((0.0, -1.0)).engaged);
        assert!(!eval.evaluate((1.0, 0.0)).engaged);
    }

    #[test]
    fn any_region_uses_magnitude() {
        let mut eval = ThresholdEvaluator::new(ThumbRegion::Any, 0.5);
        assert!(eval.evaluate((-0.4, -0.4)).engaged);
        assert!(!eval.evaluate((0.1, 0.1)).engaged);
    }

    #[test]
    fn zero_threshold_is_bypassed() {
        assert!(ThresholdEvaluator::is_bypassed(0.0));
        assert!(!ThresholdEvaluator::is_bypassed(0.1));
    }
}
