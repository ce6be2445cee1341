/// Handle returned by `Signal::subscribe`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Typed observer list.
///
/// Listeners run synchronously, in subscription order, on the thread that
/// calls `emit`.
pub struct Signal<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::<u32>::new();

        let first = log.clone();
        signal.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = log.clone();
        signal.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        signal.emit(&7);
        signal.emit(&8);

        assert_eq!(
            *log.borrow(),
            vec![("first", 7), ("second", 7), ("first", 8), ("second", 8)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut signal = Signal::<()>::new();

        let counter = hits.clone();
        let id = signal.subscribe(move |_| *counter.borrow_mut() += 1);
        signal.emit(&());
        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.emit(&());

        assert_eq!(*hits.borrow(), 1);
        assert!(signal.is_empty());
    }
}
