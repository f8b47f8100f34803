//! Health-bar bookkeeping for damaged ships.

use crate::entities::{EntityId, HealthBars, LivingEntity};

impl HealthBars {
    /// Attach bars to damaged ships and drop bars from ships that are back at
    /// full health, sinking, sunk or gone.
    pub fn sync<'a>(&mut self, ships: impl IntoIterator<Item = &'a LivingEntity>) {
        let mut present = Vec::new();
        for ship in ships {
            present.push(ship.id());
            if ship.health < ship.max_health && ship.is_alive() {
                self.attached.insert(ship.id());
            } else {
                self.attached.remove(&ship.id());
            }
        }
        self.attached.retain(|id| present.contains(id));
    }

    pub fn is_attached(&self, id: EntityId) -> bool {
        self.attached.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}
