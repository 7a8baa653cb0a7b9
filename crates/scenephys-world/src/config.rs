use anyhow::{anyhow, Context, Result};
use scenephys_core::{Scalar, Vec2};
use serde::{Deserialize, Serialize};

/// Runtime knobs for a [`World`](crate::World). Missing JSON fields take the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [Scalar; 2],
    /// Time multiplier applied to every update.
    pub speed: Scalar,
    /// Steps per second; 0 selects variable stepping.
    pub fixed_rate: u32,
    /// Variable mode steps every Nth update.
    pub update_rate: u32,
    pub substeps: u32,
    pub iterations: u32,
    pub auto_step: bool,
    pub debug_draw_mask: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -98.0],
            speed: 1.0,
            fixed_rate: 0,
            update_rate: 1,
            substeps: 1,
            iterations: 10,
            auto_step: true,
            debug_draw_mask: scenephys_viz::DEBUG_DRAW_NONE,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: WorldConfig = serde_json::from_str(s).context("parsing world config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(anyhow!("gravity must be finite, got {:?}", self.gravity));
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(anyhow!("speed out of range: {}", self.speed));
        }
        if self.update_rate == 0 { return Err(anyhow!("update_rate must be at least 1")); }
        if self.substeps == 0 { return Err(anyhow!("substeps must be at least 1")); }
        if self.iterations == 0 { return Err(anyhow!("iterations must be at least 1")); }
        Ok(())
    }

    #[inline] pub fn gravity_vec(&self) -> Vec2 { Vec2::from(self.gravity) }

    /// Length of one fixed step, when fixed stepping is on.
    #[inline] pub fn fixed_period(&self) -> Option<f64> {
        (self.fixed_rate > 0).then(|| 1.0 / self.fixed_rate as f64)
    }
}
