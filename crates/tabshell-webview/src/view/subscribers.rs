//! Per-View event subscribers that run before default handling.

use crate::events::HostEventKind;

use super::state::ViewState;

pub type SubscriberId = u64;

/// What a subscriber wants done with the event it just saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Continue with default handling.
    Pass,
    /// Veto default handling for this event.
    Consume,
}

pub type SubscriberFn = Box<dyn FnMut(&HostEventKind, &ViewState) -> Interception + Send>;

pub(crate) struct Subscriber {
    id: SubscriberId,
    once: bool,
    handler: SubscriberFn,
}

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: SubscriberId,
    entries: Vec<Subscriber>,
    /// Ids moved out by `take` and not yet restored.
    dispatching: Vec<SubscriberId>,
    /// Ids removed while their handler was out for dispatch.
    removed: Vec<SubscriberId>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, handler: SubscriberFn, once: bool) -> SubscriberId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Subscriber { id, once, handler });
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        if self.entries.len() != before {
            return true;
        }
        if self.dispatching.contains(&id) && !self.removed.contains(&id) {
            self.removed.push(id);
            return true;
        }
        false
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.removed.extend(self.dispatching.drain(..));
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Move the handlers out so they can run without the lock held.
    pub(crate) fn take(&mut self) -> Vec<Subscriber> {
        let taken = std::mem::take(&mut self.entries);
        self.dispatching = taken.iter().map(|s| s.id).collect();
        self.removed.clear();
        taken
    }

    /// Put surviving handlers back ahead of any added while they ran,
    /// minus those removed in the meantime.
    pub(crate) fn restore(&mut self, mut survivors: Vec<Subscriber>) {
        let removed = std::mem::take(&mut self.removed);
        self.dispatching.clear();
        survivors.retain(|s| !removed.contains(&s.id));
        let added = std::mem::replace(&mut self.entries, survivors);
        self.entries.extend(added);
    }
}

/// Run every handler in registration order until one consumes the event.
///
/// One-shot handlers are dropped after their first call; handlers after a
/// consuming one are not called and keep their registration.
pub(crate) fn dispatch(
    entries: Vec<Subscriber>,
    kind: &HostEventKind,
    state: &ViewState,
) -> (Vec<Subscriber>, Interception) {
    let mut verdict = Interception::Pass;
    let mut survivors = Vec::with_capacity(entries.len());

    for mut subscriber in entries {
        if verdict == Interception::Consume {
            survivors.push(subscriber);
            continue;
        }
        verdict = (subscriber.handler)(kind, state);
        if !subscriber.once {
            survivors.push(subscriber);
        }
    }

    (survivors, verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(hits: &Arc<AtomicUsize>, verdict: Interception) -> SubscriberFn {
        let hits = Arc::clone(hits);
        Box::new(move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
            verdict
        })
    }

    fn run(subs: &mut Subscribers, kind: &HostEventKind) -> Interception {
        let (survivors, verdict) = dispatch(subs.take(), kind, &ViewState::default());
        subs.restore(survivors);
        verdict
    }

    #[test]
    fn once_subscribers_fire_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut subs = Subscribers::default();
        subs.add(counting(&hits, Interception::Pass), true);

        run(&mut subs, &HostEventKind::DomReady);
        run(&mut subs, &HostEventKind::DomReady);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(subs.len(), 0);
    }

    #[test]
    fn consume_stops_later_subscribers() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut subs = Subscribers::default();
        subs.add(counting(&first, Interception::Consume), false);
        subs.add(counting(&second, Interception::Pass), true);

        assert_eq!(run(&mut subs, &HostEventKind::Focus), Interception::Consume);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(subs.len(), 2);
    }

    #[test]
    fn remove_by_id() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut subs = Subscribers::default();
        let id = subs.add(counting(&hits, Interception::Pass), false);
        assert!(subs.remove(id));
        assert!(!subs.remove(id));
        run(&mut subs, &HostEventKind::Blur);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handlers_added_during_dispatch_are_kept() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut subs = Subscribers::default();
        subs.add(counting(&hits, Interception::Pass), false);

        let taken = subs.take();
        subs.add(counting(&hits, Interception::Pass), false);
        let (survivors, _) = dispatch(taken, &HostEventKind::Blur, &ViewState::default());
        subs.restore(survivors);
        assert_eq!(subs.len(), 2);
    }

    #[test]
    fn handlers_removed_during_dispatch_stay_removed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut subs = Subscribers::default();
        let id = subs.add(counting(&hits, Interception::Pass), false);

        let taken = subs.take();
        assert!(subs.remove(id));
        assert!(!subs.remove(id));
        let (survivors, _) = dispatch(taken, &HostEventKind::Blur, &ViewState::default());
        subs.restore(survivors);
        assert_eq!(subs.len(), 0);

        run(&mut subs, &HostEventKind::Blur);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
