use core::fmt;
use slotmap::{new_key_type, Key, KeyData};

// World-level handles. Generational, so a stale id never aliases a live object.
new_key_type! {
    pub struct BodyId;
    pub struct ShapeId;
    pub struct JointId;
    pub struct NodeId;
    pub struct ContactId;
}

// Kernel-level handles, owned by whatever `Solver` implementation is in use.
new_key_type! {
    pub struct RigidBodyHandle;
    pub struct ColliderHandle;
    pub struct ConstraintHandle;
}

macro_rules! display_key {
    ($($name:ident),*) => {$(
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:?})"), self.data())
            }
        }
    )*};
}
display_key!(BodyId, ShapeId, JointId, NodeId, ContactId, RigidBodyHandle, ColliderHandle, ConstraintHandle);

/// Packs a key into the opaque `u64` user slot the kernel carries per shape / per pair.
#[inline] pub fn key_to_user<K: Key>(k: K) -> u64 { k.data().as_ffi() }
/// Inverse of [`key_to_user`].
#[inline] pub fn key_from_user<K: Key>(v: u64) -> K { KeyData::from_ffi(v).into() }

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn user_slot_round_trips_live_keys() {
        let mut sm: SlotMap<BodyId, u8> = SlotMap::with_key();
        let a = sm.insert(1);
        let b = sm.insert(2);
        assert_eq!(key_from_user::<BodyId>(key_to_user(a)), a);
        assert_ne!(key_to_user(a), key_to_user(b));
        assert_ne!(key_to_user(a), 0);
    }

    #[test]
    fn stale_key_does_not_resolve() {
        let mut sm: SlotMap<JointId, u8> = SlotMap::with_key();
        let a = sm.insert(1);
        sm.remove(a);
        let b = sm.insert(2);
        assert!(sm.get(a).is_none());
        assert_eq!(sm[b], 2);
        assert!(format!("{}", b).starts_with("JointId("));
    }
}
