use crate::OrderedSet;

/// Identifier for a pipeline channel.
pub type ChannelId = u32;

/// Registry of the channel IDs currently in use.
///
/// Backed by an [`OrderedSet`], so registration is deduplicated and
/// iteration always yields IDs in ascending order.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    ids: OrderedSet<ChannelId>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel. Returns false if the ID was already taken.
    pub fn register(&mut self, id: ChannelId) -> bool {
        self.ids.insert(id)
    }

    /// Releases a channel. Returns false if the ID was not registered;
    /// releasing an unknown ID is not an error.
    pub fn release(&mut self, id: ChannelId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the registered IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.ids.iter().copied()
    }

    /// Returns the smallest ID not currently registered, for allocating a
    /// fresh channel.
    pub fn next_free(&self) -> ChannelId {
        let mut candidate = 0;
        for id in self.ids() {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_deduplicated_and_sorted() {
        let mut registry = ChannelRegistry::new();
        assert!(registry.register(5));
        assert!(registry.register(1));
        assert!(registry.register(3));
        assert!(!registry.register(3));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn release_of_unknown_id_is_a_noop() {
        let mut registry = ChannelRegistry::new();
        registry.register(2);

        assert!(!registry.release(9));
        assert!(registry.release(2));
        assert!(registry.is_empty());
    }

    #[test]
    fn next_free_fills_gaps_first() {
        let mut registry = ChannelRegistry::new();
        for id in [0, 1, 3, 4] {
            registry.register(id);
        }
        assert_eq!(registry.next_free(), 2);

        registry.register(2);
        assert_eq!(registry.next_free(), 5);

        registry.release(0);
        assert_eq!(registry.next_free(), 0);
    }
}
