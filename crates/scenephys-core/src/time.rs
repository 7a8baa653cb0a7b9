/// What a single kernel step did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub pairs_tested: u32,
    pub contacts: u32,
    pub constraints: u32,
}

/// What one `World::update` call did.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct UpdateStats {
    pub solver_steps: u32,
    /// Sum of the dt values handed to the kernel.
    pub simulated: f32,
    pub contacts: u32,
}

impl UpdateStats {
    #[inline] pub fn absorb(&mut self, dt: f32, s: StepStats) {
        self.solver_steps += 1;
        self.simulated += dt;
        self.contacts = s.contacts;
    }
}
