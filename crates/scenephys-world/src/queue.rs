//! Deferred membership changes, buffered while the solver is stepping.

/// Where a body or joint stands relative to its world.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Membership {
    #[default]
    NotInWorld,
    PendingAdd,
    InWorld,
    PendingRemove,
}

impl Membership {
    /// Listed in the world's owned list.
    #[inline] pub fn is_owned(self) -> bool { matches!(self, Membership::PendingAdd | Membership::InWorld) }
    /// Registered with the solver right now.
    #[inline] pub fn in_solver(self) -> bool { matches!(self, Membership::InWorld | Membership::PendingRemove) }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mutation<K> { Add(K), Remove(K) }

/// Outcome of [`MutationQueue::push`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// The same command was already pending.
    Duplicate,
    /// The opposite command was pending; both are gone.
    Cancelled,
}

/// Insertion-ordered add/remove commands keyed by id. A key is never pending
/// in both directions at once.
#[derive(Clone, Debug)]
pub struct MutationQueue<K> {
    adds: Vec<K>,
    removes: Vec<K>,
}

impl<K> Default for MutationQueue<K> {
    fn default() -> Self { Self { adds: Vec::new(), removes: Vec::new() } }
}

impl<K: Copy + Eq> MutationQueue<K> {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, m: Mutation<K>) -> Enqueue {
        let (same, opposite, k) = match m {
            Mutation::Add(k) => (&mut self.adds, &mut self.removes, k),
            Mutation::Remove(k) => (&mut self.removes, &mut self.adds, k),
        };
        if let Some(i) = opposite.iter().position(|x| *x == k) {
            opposite.remove(i);
            return Enqueue::Cancelled;
        }
        if same.contains(&k) { return Enqueue::Duplicate; }
        same.push(k);
        Enqueue::Queued
    }

    /// Swaps the pending adds out; anything pushed while they are processed lands in a fresh list.
    pub fn take_adds(&mut self) -> Vec<K> { std::mem::take(&mut self.adds) }
    pub fn take_removes(&mut self) -> Vec<K> { std::mem::take(&mut self.removes) }

    /// Drops every command for `k`.
    pub fn purge(&mut self, k: K) {
        self.adds.retain(|x| *x != k);
        self.removes.retain(|x| *x != k);
    }

    #[inline] pub fn pending_adds(&self) -> &[K] { &self.adds }
    #[inline] pub fn pending_removes(&self) -> &[K] { &self.removes }
    #[inline] pub fn len(&self) -> usize { self.adds.len() + self.removes.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.adds.is_empty() && self.removes.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_add_is_deduplicated() {
        let mut q = MutationQueue::new();
        assert_eq!(q.push(Mutation::Add(1)), Enqueue::Queued);
        assert_eq!(q.push(Mutation::Add(1)), Enqueue::Duplicate);
        assert_eq!(q.pending_adds(), &[1]);
    }

    #[test]
    fn opposite_commands_cancel() {
        let mut q = MutationQueue::new();
        q.push(Mutation::Add(1));
        q.push(Mutation::Add(2));
        assert_eq!(q.push(Mutation::Remove(1)), Enqueue::Cancelled);
        assert_eq!(q.pending_adds(), &[2]);
        assert!(q.pending_removes().is_empty());

        q.push(Mutation::Remove(3));
        assert_eq!(q.push(Mutation::Add(3)), Enqueue::Cancelled);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn take_swaps_in_a_fresh_list() {
        let mut q = MutationQueue::new();
        q.push(Mutation::Add(1));
        q.push(Mutation::Add(2));
        let batch = q.take_adds();
        q.push(Mutation::Add(3));
        assert_eq!(batch, vec![1, 2]);
        assert_eq!(q.pending_adds(), &[3]);
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut q = MutationQueue::new();
        for k in [5, 1, 4] { q.push(Mutation::Remove(k)); }
        assert_eq!(q.take_removes(), vec![5, 1, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn membership_predicates() {
        assert!(Membership::PendingAdd.is_owned() && !Membership::PendingAdd.in_solver());
        assert!(Membership::PendingRemove.in_solver() && !Membership::PendingRemove.is_owned());
        assert!(Membership::InWorld.is_owned() && Membership::InWorld.in_solver());
    }
}
