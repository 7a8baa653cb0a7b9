use crate::StepHasher;

/// Phases of one `World` update, in the order they are allowed to run.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UpdateStage {
    FlushBodies = 1,
    SyncIn = 2,
    FlushJoints = 3,
    Step = 4,
    DebugDraw = 5,
    SyncOut = 6,
}

pub fn schedule_digest(stages: &[UpdateStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages { h.update_bytes(&[*s as u8]); }
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_depends_on_order() {
        let a = schedule_digest(&[UpdateStage::FlushBodies, UpdateStage::SyncIn]);
        let b = schedule_digest(&[UpdateStage::SyncIn, UpdateStage::FlushBodies]);
        assert_ne!(a, b);
        assert_eq!(a, schedule_digest(&[UpdateStage::FlushBodies, UpdateStage::SyncIn]));
    }
}
