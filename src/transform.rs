//! Attribute transforms.
//!
//! A transform rewrites the value of a derived attribute after its sources
//! have been summed. Transforms may read other attributes; the resolver
//! orders resolution so those are ready first.

use crate::attr_id::AttrId;
use crate::error::StatError;
use std::collections::HashMap;

/// Trait for transforms applied to a derived attribute.
pub trait AttributeTransform: Send + Sync {
    /// Attributes that must be resolved before this transform runs.
    fn depends_on(&self) -> Vec<AttrId>;

    /// Apply the transform to the current value.
    ///
    /// `dependencies` holds the resolved value of every attribute listed by
    /// [`depends_on`](Self::depends_on).
    fn apply(&self, input: f64, dependencies: &HashMap<AttrId, f64>) -> Result<f64, StatError>;

    /// Human-readable description used in breakdowns.
    fn description(&self) -> String;
}

/// Adds a weighted copy of another attribute.
///
/// This is how combat power is assembled: one scaling transform per
/// weighted attribute.
///
/// # Examples
///
/// ```rust
/// use xianlu::transform::{AttributeTransform, ScalingTransform};
/// use xianlu::AttrId;
/// use std::collections::HashMap;
///
/// let atk = AttrId::from_str("攻击力");
/// let transform = ScalingTransform::new(atk.clone(), 1.5);
///
/// let mut deps = HashMap::new();
/// deps.insert(atk, 100.0);
///
/// // 0 + 100 * 1.5
/// assert_eq!(transform.apply(0.0, &deps).unwrap(), 150.0);
/// ```
#[derive(Debug, Clone)]
pub struct ScalingTransform {
    dependency: AttrId,
    scale_factor: f64,
}

impl ScalingTransform {
    /// Create a transform adding `dependency * scale_factor`.
    pub fn new(dependency: AttrId, scale_factor: f64) -> Self {
        Self {
            dependency,
            scale_factor,
        }
    }
}

impl AttributeTransform for ScalingTransform {
    fn depends_on(&self) -> Vec<AttrId> {
        vec![self.dependency.clone()]
    }

    fn apply(&self, input: f64, dependencies: &HashMap<AttrId, f64>) -> Result<f64, StatError> {
        let dep_value = dependencies
            .get(&self.dependency)
            .ok_or_else(|| StatError::MissingDependency(self.dependency.clone()))?;
        Ok(input + dep_value * self.scale_factor)
    }

    fn description(&self) -> String {
        format!("{} x{}", self.dependency, self.scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_adds_to_input() {
        let spd = AttrId::from_str("速度");
        let transform = ScalingTransform::new(spd.clone(), 0.5);
        let mut deps = HashMap::new();
        deps.insert(spd, 100.0);
        assert_eq!(transform.apply(10.0, &deps).unwrap(), 60.0);
    }

    #[test]
    fn test_scaling_missing_dependency() {
        let transform = ScalingTransform::new(AttrId::from_str("暴击率"), 10.0);
        let err = transform.apply(0.0, &HashMap::new()).unwrap_err();
        assert_eq!(err, StatError::MissingDependency(AttrId::from_str("暴击率")));
    }

    #[test]
    fn test_description() {
        let transform = ScalingTransform::new(AttrId::from_str("闪避率"), 8.0);
        assert_eq!(transform.description(), "闪避率 x8");
    }
}
