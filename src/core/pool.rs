/// Per-event record of which parton slots have been consumed.
///
/// Slots index the event's parton list. A slot moves from free to consumed
/// at most once; [`claim`](Self::claim) is all-or-nothing, so a hadron is
/// either formed from fully available partons or not formed at all.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    consumed: Vec<bool>,
    remaining: usize,
}

impl Availability {
    /// All `n` slots free.
    pub fn new(n: usize) -> Self {
        Self {
            consumed: vec![false; n],
            remaining: n,
        }
    }

    /// Number of slots tracked.
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    /// True if no slots are tracked.
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    /// Slots not yet consumed.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// True if `slot` exists and has not been consumed.
    #[inline]
    pub fn is_free(&self, slot: usize) -> bool {
        matches!(self.consumed.get(slot), Some(false))
    }

    /// Consume every slot in `slots`, or none of them.
    ///
    /// Returns false, leaving the token untouched, if any slot is out of
    /// range, already consumed, or listed twice.
    pub fn claim(&mut self, slots: &[usize]) -> bool {
        for (i, &s) in slots.iter().enumerate() {
            if !self.is_free(s) || slots[..i].contains(&s) {
                return false;
            }
        }
        for &s in slots {
            self.consumed[s] = true;
        }
        self.remaining -= slots.len();
        true
    }

    /// Free slots among `slots`, preserving their order.
    pub fn filter_free<'a>(&'a self, slots: &'a [usize]) -> impl Iterator<Item = usize> + 'a {
        slots.iter().copied().filter(move |&s| self.is_free(s))
    }

    /// All free slots in ascending order.
    pub fn free_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.consumed
            .iter()
            .enumerate()
            .filter_map(|(i, &used)| (!used).then_some(i))
    }
}
