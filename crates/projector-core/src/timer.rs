use slotmap::SlotMap;
use web_time::{Duration, Instant};

use crate::{ComponentRef, TimerId};

/// Repeating timer owned by a component.
#[derive(Clone, Debug)]
pub struct Timer {
    pub owner: ComponentRef,
    pub interval: Duration,
    pub due: Instant,
}

#[derive(Default)]
pub struct Timers {
    timers: SlotMap<TimerId, Timer>,
}

impl Timers {
    pub fn start(&mut self, owner: ComponentRef, interval: Duration, now: Instant) -> TimerId {
        self.timers.insert(Timer {
            owner,
            interval,
            due: now + interval,
        })
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn cancel_owned(&mut self, owner: ComponentRef) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, t| t.owner != owner);
        before - self.timers.len()
    }

    pub fn owned_by(&self, owner: ComponentRef) -> usize {
        self.timers.values().filter(|t| t.owner == owner).count()
    }

    /// Timers due at `now`, rescheduled for their next period. Ordered by due time.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(TimerId, ComponentRef)> {
        let mut due: Vec<(Instant, TimerId, ComponentRef)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= now)
            .map(|(id, t)| (t.due, id, t.owner))
            .collect();
        due.sort_by_key(|(at, _, _)| *at);
        for (_, id, _) in &due {
            if let Some(t) = self.timers.get_mut(*id) {
                while t.due <= now {
                    t.due += t.interval.max(Duration::from_millis(1));
                }
            }
        }
        due.into_iter().map(|(_, id, owner)| (id, owner)).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentKind, Registry};

    #[test]
    fn test_timers_fire_and_reschedule() {
        let mut registry = Registry::default();
        let owner = registry.reserve(ComponentKind::Field);
        let other = registry.reserve(ComponentKind::Static);

        let t0 = Instant::now();
        let mut timers = Timers::default();
        let blink = timers.start(owner, Duration::from_millis(500), t0);
        timers.start(other, Duration::from_millis(200), t0);

        assert!(timers.fire_due(t0).is_empty());

        let fired = timers.fire_due(t0 + Duration::from_millis(250));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, other);

        let fired = timers.fire_due(t0 + Duration::from_millis(500));
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].1, other);
        assert_eq!(fired[1].0, blink);

        assert_eq!(timers.owned_by(owner), 1);
        assert_eq!(timers.cancel_owned(owner), 1);
        assert!(!timers.cancel(blink));
        assert_eq!(timers.len(), 1);
    }
}
