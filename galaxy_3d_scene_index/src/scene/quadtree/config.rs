use crate::engine_error;
use crate::error::{Error, Result};
use super::cell::MIN_ALTITUDE;

/// Quadtree configuration
#[derive(Debug, Clone)]
pub struct QuadtreeConfig {
    /// Instances a leaf holds before it splits
    pub leaf_capacity: u32,
    /// Minimum instance slice length per leaf (power of two)
    pub slice_stride: u32,
    /// Altitude below which leaves never split (-1 = unit cell).
    ///
    /// Leaves at this altitude accept more than `leaf_capacity` instances.
    pub min_leaf_altitude: i32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: 64,
            slice_stride: 4,
            min_leaf_altitude: MIN_ALTITUDE,
        }
    }
}

impl QuadtreeConfig {
    /// Check every field, logging the first invalid one
    pub fn validate(&self) -> Result<()> {
        let problem = if self.leaf_capacity == 0 {
            Some(format!("leaf_capacity must be at least 1 (got {})", self.leaf_capacity))
        } else if !self.slice_stride.is_power_of_two() {
            Some(format!("slice_stride must be a power of two (got {})", self.slice_stride))
        } else if self.min_leaf_altitude < MIN_ALTITUDE {
            Some(format!(
                "min_leaf_altitude must be >= {} (got {})",
                MIN_ALTITUDE, self.min_leaf_altitude
            ))
        } else {
            None
        };

        match problem {
            Some(msg) => {
                engine_error!("galaxy3d::QuadtreeSceneIndex", "{}", msg);
                Err(Error::InvalidConfig(msg))
            }
            None => Ok(()),
        }
    }

    /// Slice length for a leaf holding `count` instances
    #[inline]
    pub(crate) fn slice_len_for(&self, count: u32) -> u32 {
        count.next_power_of_two().max(self.slice_stride)
    }
}
