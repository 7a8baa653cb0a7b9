use log::warn;
use scenephys_core::{Scalar, UpdateStage, UpdateStats};
use scenephys_scene::SceneGraph;
use scenephys_solver::Solver;

use crate::contact::Dispatcher;
use crate::flush::flush_joints;
use crate::sync::{after_simulation, before_simulation};
use crate::world::World;

/// Slack when comparing the fixed-step accumulator against the period.
const FIXED_EPSILON: f64 = 1e-9;

impl<S: Solver> World<S> {
    /// Advances by one frame's `delta` seconds according to the stepping config.
    /// Does nothing when auto stepping is off.
    pub fn update<G: SceneGraph>(&mut self, scene: &mut G, delta: Scalar) -> UpdateStats {
        if !self.config.auto_step { return UpdateStats::default(); }
        self.advance(scene, delta, false)
    }

    /// Runs exactly one solver step of `dt`, ignoring rate, substep and speed settings.
    /// Only valid with auto stepping off.
    pub fn step<G: SceneGraph>(&mut self, scene: &mut G, dt: Scalar) -> UpdateStats {
        if self.config.auto_step {
            warn!("step: auto stepping is on, call update or turn auto_step off first");
            return UpdateStats::default();
        }
        self.advance(scene, dt, true)
    }

    fn advance<G: SceneGraph>(&mut self, scene: &mut G, delta: Scalar, manual: bool) -> UpdateStats {
        let mut stats = UpdateStats::default();
        self.schedule.clear();

        self.schedule.push(UpdateStage::FlushBodies);
        self.flush_bodies();
        self.schedule.push(UpdateStage::SyncIn);
        let scene_to_world = before_simulation(&*scene, &mut self.solver, &mut self.reg);
        self.schedule.push(UpdateStage::FlushJoints);
        flush_joints(&mut self.solver, &mut self.reg);

        if !delta.is_finite() {
            warn!("ignoring non-finite frame delta {delta}");
            return stats;
        }
        if delta < Scalar::EPSILON { return stats; }

        if manual {
            self.solver_step(delta, &mut stats);
        } else if let Some(period) = self.config.fixed_period() {
            self.accumulator += delta as f64 * self.config.speed as f64;
            while self.accumulator + FIXED_EPSILON >= period {
                self.accumulator -= period;
                self.solver_step(period as Scalar, &mut stats);
            }
        } else {
            self.accumulator += delta as f64;
            self.update_count += 1;
            if self.update_count >= self.config.update_rate {
                let substeps = self.config.substeps.max(1);
                let dt = (self.accumulator * self.config.speed as f64 / substeps as f64) as Scalar;
                for _ in 0..substeps { self.solver_step(dt, &mut stats); }
                self.accumulator = 0.0;
                self.update_count = 0;
            }
        }

        if self.config.debug_draw_mask != 0 && self.debug_draw.is_some() {
            self.schedule.push(UpdateStage::DebugDraw);
            self.debug_draw_pass();
        }

        self.schedule.push(UpdateStage::SyncOut);
        after_simulation(scene, &self.solver, &mut self.reg, scene_to_world);
        stats
    }

    /// One kernel step, then per-body damping and limits.
    fn solver_step(&mut self, dt: Scalar, stats: &mut UpdateStats) {
        if dt <= 0.0 { return; }
        self.schedule.push(UpdateStage::Step);
        let mut dispatcher = Dispatcher { reg: &mut self.reg, contacts: &mut self.contacts, events: &mut self.events };
        let s = self.solver.step(dt, &mut dispatcher);
        stats.absorb(dt, s);
        for id in self.reg.bodies() {
            if let Some(body) = self.reg.bodies.get(*id) { body.update(&mut self.solver, dt); }
        }
    }
}
