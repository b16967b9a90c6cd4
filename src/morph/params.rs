use crate::animation::ease::Ease;
use crate::foundation::error::{WarpmorphError, WarpmorphResult};

/// Morph run settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MorphParams {
    /// Number of frames, including both endpoints.
    pub frame_count: u64,
    pub ease: Option<Ease>,
    /// When false, geometry still interpolates but color switches from start to end at `t = 0.5`.
    pub cross_dissolve: bool,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            frame_count: 30,
            ease: None,
            cross_dissolve: true,
        }
    }
}

impl MorphParams {
    pub fn validate(&self) -> WarpmorphResult<()> {
        if self.frame_count == 0 {
            return Err(WarpmorphError::validation("morph frame_count must be >= 1"));
        }
        Ok(())
    }

    /// Blend parameter for frame `index`: `index / (frame_count - 1)`, eased. A single-frame run
    /// stays at the start image.
    pub fn t_at(&self, index: u64) -> f64 {
        if self.frame_count <= 1 {
            return 0.0;
        }
        let t = (index as f64 / (self.frame_count - 1) as f64).clamp(0.0, 1.0);
        match self.ease {
            Some(e) => e.apply(t),
            None => t,
        }
    }
}
