//=========================================================================
// Event Bus
//=========================================================================
//
// Synchronous publish/subscribe bus keyed by event type.
//
// Architecture:
//   register(key, cb) → HashMap<K, ListenerList> ← unregister(key, id)
//                              ↓
//   dispatch(key, v) → snapshot under lock → release → cb(v) for each
//
// Callbacks run on the dispatching thread with the lock released, so a
// listener may register, unregister or dispatch from inside a callback.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace};

//=== Internal Dependencies ===============================================

use super::listener_list::{Callback, ListenerList};
use crate::core::panic_reason;
use super::{EventKey, EventValue, ListenerId, DEFAULT_EVENT_VALUE};

//=== Listeners ===========================================================

struct Listeners<K: EventKey> {
    by_key: HashMap<K, ListenerList>,
    next_id: u64,
}

impl<K: EventKey> Listeners<K> {
    fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }
}

//=== EventBus ============================================================

/// In-process event bus mapping event keys to ordered listener lists.
///
/// `EventBus` is a handle: cloning it yields another handle to the same
/// listener mapping. Construct one per process (or per test) and pass it
/// to whatever needs to publish or subscribe.
///
/// # Example
///
/// ```rust
/// use quackmageddon::core::event_bus::{EventBus, GameplayEvent};
///
/// let bus = EventBus::new();
/// let id = bus.register(GameplayEvent::ScoreUpdate, |points| {
///     println!("score +{points}");
/// });
///
/// bus.dispatch(&GameplayEvent::ScoreUpdate, 10);
/// bus.unregister(&GameplayEvent::ScoreUpdate, id);
/// ```
pub struct EventBus<K: EventKey> {
    inner: Arc<Mutex<Listeners<K>>>,
}

impl<K: EventKey> EventBus<K> {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Listeners::new())),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends `callback` to the listeners of `key` and returns its token.
    ///
    /// No uniqueness check is made: registering the same behavior twice
    /// yields two tokens and two invocations per dispatch.
    pub fn register<F>(&self, key: K, callback: F) -> ListenerId
    where
        F: Fn(EventValue) + Send + Sync + 'static,
    {
        self.register_shared(key, Arc::new(callback))
    }

    /// Registers an already shared callback.
    pub fn register_shared(
        &self,
        key: K,
        callback: Arc<dyn Fn(EventValue) + Send + Sync + 'static>,
    ) -> ListenerId {
        let mut listeners = self.lock();
        let id = listeners.allocate_id();

        trace!("Registering listener {:?} for {:?}", id, key);

        listeners
            .by_key
            .entry(key)
            .or_insert_with(ListenerList::new)
            .push(id, callback);

        id
    }

    /// Removes the listener registered under `id` for `key`.
    ///
    /// Unknown keys and unknown tokens are no-ops. Returns true if a
    /// listener was removed.
    pub fn unregister(&self, key: &K, id: ListenerId) -> bool {
        let mut listeners = self.lock();

        let Some(list) = listeners.by_key.get_mut(key) else {
            return false;
        };

        let removed = list.remove(id);
        if list.is_empty() {
            listeners.by_key.remove(key);
        }

        if removed {
            trace!("Unregistered listener {:?} from {:?}", id, key);
        }
        removed
    }

    //--- Dispatch ---------------------------------------------------------

    /// Invokes every listener of `key`, in registration order, with `value`.
    ///
    /// Returns the number of listeners invoked. Dispatching a key without
    /// listeners does nothing.
    ///
    /// Listeners removed by an earlier callback of the same dispatch are
    /// skipped; listeners added during the dispatch fire from the next one.
    /// A panicking listener is logged and does not stop the others.
    pub fn dispatch(&self, key: &K, value: EventValue) -> usize {
        let snapshot = match self.lock().by_key.get(key) {
            Some(list) => list.snapshot(),
            None => return 0,
        };

        let mut invoked = 0;
        for entry in snapshot {
            if !self.is_registered(key, entry.id) {
                continue;
            }

            invoked += 1;
            Self::invoke(key, entry.id, &entry.callback, value);
        }

        debug!("Dispatched {:?} ({}) to {} listener(s)", key, value, invoked);
        invoked
    }

    /// Dispatches `key` with the default payload of zero.
    pub fn dispatch_default(&self, key: &K) -> usize {
        self.dispatch(key, DEFAULT_EVENT_VALUE)
    }

    //--- Query API --------------------------------------------------------

    /// Returns the number of listeners registered for `key`.
    pub fn listener_count(&self, key: &K) -> usize {
        self.lock().by_key.get(key).map_or(0, ListenerList::len)
    }

    /// Returns true if at least one listener is registered for `key`.
    pub fn has_listeners(&self, key: &K) -> bool {
        self.listener_count(key) > 0
    }

    /// Returns true if `id` is currently registered for `key`.
    pub fn is_registered(&self, key: &K, id: ListenerId) -> bool {
        self.lock()
            .by_key
            .get(key)
            .is_some_and(|list| list.contains(id))
    }

    /// Removes every listener of `key`.
    pub fn clear(&self, key: &K) {
        self.lock().by_key.remove(key);
    }

    /// Removes every listener of every key.
    pub fn clear_all(&self) {
        self.lock().by_key.clear();
    }

    //--- Internal Helpers -------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Listeners<K>> {
        // Callbacks never run under the lock, so poisoning can only come
        // from a panic inside the bus itself; the map is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn invoke(key: &K, id: ListenerId, callback: &Callback, value: EventValue) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| callback(value)));

        if let Err(payload) = result {
            let reason = panic_reason(payload.as_ref());
            error!("Listener {:?} for {:?} panicked: {}", id, key, reason);
        }
    }
}

impl<K: EventKey> Clone for EventBus<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: EventKey> Default for EventBus<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EventKey> std::fmt::Debug for EventBus<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.lock();
        f.debug_struct("EventBus")
            .field("keys", &listeners.by_key.len())
            .field("next_id", &listeners.next_id)
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::GameplayEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<(&'static str, EventValue)>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn(EventValue) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |value| log.lock().unwrap().push((name, value))
    }

    fn new_log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    //--- Registration -----------------------------------------------------

    #[test]
    fn new_bus_has_no_listeners() {
        let bus: EventBus<GameplayEvent> = EventBus::new();
        for event in GameplayEvent::ALL {
            assert!(!bus.has_listeners(&event));
            assert_eq!(bus.listener_count(&event), 0);
        }
    }

    #[test]
    fn register_returns_distinct_ids() {
        let bus = EventBus::new();
        let a = bus.register(GameplayEvent::EnemyHit, |_| {});
        let b = bus.register(GameplayEvent::EnemyHit, |_| {});
        let c = bus.register(GameplayEvent::PlayerHit, |_| {});

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(bus.listener_count(&GameplayEvent::EnemyHit), 2);
        assert_eq!(bus.listener_count(&GameplayEvent::PlayerHit), 1);
    }

    #[test]
    fn clones_share_the_same_mapping() {
        let bus = EventBus::new();
        let other = bus.clone();

        let id = other.register(GameplayEvent::ScoreUpdate, |_| {});
        assert!(bus.is_registered(&GameplayEvent::ScoreUpdate, id));
    }

    //--- Dispatch ---------------------------------------------------------

    #[test]
    fn dispatch_without_listeners_is_noop() {
        let bus: EventBus<GameplayEvent> = EventBus::new();
        assert_eq!(bus.dispatch(&GameplayEvent::HealthUpdate, 3), 0);
        assert_eq!(bus.dispatch_default(&GameplayEvent::EnemyDestroyed), 0);
        assert!(!bus.has_listeners(&GameplayEvent::HealthUpdate));
    }

    #[test]
    fn dispatch_calls_all_listeners_in_registration_order() {
        let log = new_log();
        let bus = EventBus::new();
        bus.register(GameplayEvent::EnemyHit, recorder(&log, "first"));
        bus.register(GameplayEvent::EnemyHit, recorder(&log, "second"));
        bus.register(GameplayEvent::EnemyHit, recorder(&log, "third"));

        assert_eq!(bus.dispatch(&GameplayEvent::EnemyHit, 2), 3);

        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 2), ("second", 2), ("third", 2)]
        );
    }

    #[test]
    fn dispatch_default_passes_zero() {
        let log = new_log();
        let bus = EventBus::new();
        bus.register(GameplayEvent::PauseSpawning, recorder(&log, "pause"));

        bus.dispatch_default(&GameplayEvent::PauseSpawning);

        assert_eq!(*log.lock().unwrap(), vec![("pause", 0)]);
    }

    #[test]
    fn dispatch_only_reaches_matching_key() {
        let log = new_log();
        let bus = EventBus::new();
        bus.register(GameplayEvent::EnemyHit, recorder(&log, "hit"));
        bus.register(GameplayEvent::PlayerHit, recorder(&log, "player"));

        bus.dispatch(&GameplayEvent::PlayerHit, 1);

        assert_eq!(*log.lock().unwrap(), vec![("player", 1)]);
    }

    #[test]
    fn duplicate_registration_fires_twice() {
        let hits = Arc::new(AtomicUsize::new(0));
        let shared: Arc<dyn Fn(EventValue) + Send + Sync> = {
            let hits = Arc::clone(&hits);
            Arc::new(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        let bus = EventBus::new();
        let first = bus.register_shared(GameplayEvent::EnemyBeakshot, Arc::clone(&shared));
        bus.register_shared(GameplayEvent::EnemyBeakshot, Arc::clone(&shared));

        bus.dispatch_default(&GameplayEvent::EnemyBeakshot);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        // Removing one token leaves the other occurrence in place
        assert!(bus.unregister(&GameplayEvent::EnemyBeakshot, first));
        bus.dispatch_default(&GameplayEvent::EnemyBeakshot);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn hit_scenario_register_dispatch_unregister() {
        let log = new_log();
        let bus = EventBus::new();
        let a = bus.register(GameplayEvent::EnemyHit, recorder(&log, "A"));
        bus.register(GameplayEvent::EnemyHit, recorder(&log, "B"));

        bus.dispatch(&GameplayEvent::EnemyHit, 5);
        assert_eq!(*log.lock().unwrap(), vec![("A", 5), ("B", 5)]);

        log.lock().unwrap().clear();
        assert!(bus.unregister(&GameplayEvent::EnemyHit, a));
        bus.dispatch(&GameplayEvent::EnemyHit, 7);

        assert_eq!(*log.lock().unwrap(), vec![("B", 7)]);
    }

    //--- Unregistration ---------------------------------------------------

    #[test]
    fn unregister_unknown_key_is_noop() {
        let bus: EventBus<GameplayEvent> = EventBus::new();
        let id = bus.register(GameplayEvent::EnemyHit, |_| {});

        assert!(!bus.unregister(&GameplayEvent::ScoreUpdate, id));
        assert!(bus.is_registered(&GameplayEvent::EnemyHit, id));
    }

    #[test]
    fn unregister_unknown_id_is_noop() {
        let bus = EventBus::new();
        let kept = bus.register(GameplayEvent::EnemyHit, |_| {});
        let other_bus = EventBus::new();
        let _ = other_bus.register(GameplayEvent::EnemyHit, |_| {});
        let foreign = other_bus.register(GameplayEvent::EnemyHit, |_| {});

        assert!(!bus.unregister(&GameplayEvent::EnemyHit, foreign));
        assert!(bus.is_registered(&GameplayEvent::EnemyHit, kept));
        assert_eq!(bus.listener_count(&GameplayEvent::EnemyHit), 1);
    }

    #[test]
    fn unregister_twice_returns_false_second_time() {
        let bus = EventBus::new();
        let id = bus.register(GameplayEvent::HealthUpdate, |_| {});

        assert!(bus.unregister(&GameplayEvent::HealthUpdate, id));
        assert!(!bus.unregister(&GameplayEvent::HealthUpdate, id));
        assert!(!bus.has_listeners(&GameplayEvent::HealthUpdate));
    }

    #[test]
    fn clear_and_clear_all() {
        let bus = EventBus::new();
        bus.register(GameplayEvent::EnemyHit, |_| {});
        bus.register(GameplayEvent::PlayerHit, |_| {});

        bus.clear(&GameplayEvent::EnemyHit);
        assert!(!bus.has_listeners(&GameplayEvent::EnemyHit));
        assert!(bus.has_listeners(&GameplayEvent::PlayerHit));

        bus.clear_all();
        assert!(!bus.has_listeners(&GameplayEvent::PlayerHit));
    }

    //--- Mutation During Dispatch -----------------------------------------

    #[test]
    fn listener_can_unregister_itself_during_dispatch() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let id = {
            let bus_handle = bus.clone();
            let hits = Arc::clone(&hits);
            let slot = Arc::clone(&slot);
            bus.register(GameplayEvent::PauseSpawning, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(own) = *slot.lock().unwrap() {
                    bus_handle.unregister(&GameplayEvent::PauseSpawning, own);
                }
            })
        };
        *slot.lock().unwrap() = Some(id);

        bus.dispatch_default(&GameplayEvent::PauseSpawning);
        bus.dispatch_default(&GameplayEvent::PauseSpawning);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!bus.has_listeners(&GameplayEvent::PauseSpawning));
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let log = new_log();
        let bus = EventBus::new();
        let victim_slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        {
            let bus_handle = bus.clone();
            let slot = Arc::clone(&victim_slot);
            let log = Arc::clone(&log);
            bus.register(GameplayEvent::EnemyDestroyed, move |v| {
                log.lock().unwrap().push(("remover", v));
                if let Some(victim) = slot.lock().unwrap().take() {
                    bus_handle.unregister(&GameplayEvent::EnemyDestroyed, victim);
                }
            });
        }
        let victim = bus.register(GameplayEvent::EnemyDestroyed, recorder(&log, "victim"));
        *victim_slot.lock().unwrap() = Some(victim);

        assert_eq!(bus.dispatch(&GameplayEvent::EnemyDestroyed, 1), 1);
        assert_eq!(*log.lock().unwrap(), vec![("remover", 1)]);
    }

    #[test]
    fn listener_added_mid_dispatch_fires_next_time() {
        let log = new_log();
        let bus = EventBus::new();

        {
            let bus_handle = bus.clone();
            let log_inner = Arc::clone(&log);
            let added = Arc::new(AtomicUsize::new(0));
            bus.register(GameplayEvent::ScoreUpdate, move |_| {
                if added.fetch_add(1, Ordering::SeqCst) == 0 {
                    bus_handle.register(GameplayEvent::ScoreUpdate, recorder(&log_inner, "late"));
                }
            });
        }

        assert_eq!(bus.dispatch(&GameplayEvent::ScoreUpdate, 1), 1);
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(bus.dispatch(&GameplayEvent::ScoreUpdate, 2), 2);
        assert_eq!(*log.lock().unwrap(), vec![("late", 2)]);
    }

    #[test]
    fn listener_can_dispatch_reentrantly() {
        let log = new_log();
        let bus = EventBus::new();

        {
            let bus_handle = bus.clone();
            bus.register(GameplayEvent::EnemyDestroyed, move |points| {
                bus_handle.dispatch(&GameplayEvent::ScoreUpdate, points * 10);
            });
        }
        bus.register(GameplayEvent::ScoreUpdate, recorder(&log, "score"));

        bus.dispatch(&GameplayEvent::EnemyDestroyed, 3);

        assert_eq!(*log.lock().unwrap(), vec![("score", 30)]);
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let log = new_log();
        let bus = EventBus::new();
        bus.register(GameplayEvent::PlayerHit, recorder(&log, "before"));
        bus.register(GameplayEvent::PlayerHit, |_| panic!("listener failure"));
        bus.register(GameplayEvent::PlayerHit, recorder(&log, "after"));

        assert_eq!(bus.dispatch(&GameplayEvent::PlayerHit, 9), 3);
        assert_eq!(*log.lock().unwrap(), vec![("before", 9), ("after", 9)]);

        // Bus stays usable afterwards
        assert_eq!(bus.listener_count(&GameplayEvent::PlayerHit), 3);
    }

    //--- Key Types --------------------------------------------------------

    #[test]
    fn string_keys_are_supported() {
        let log = new_log();
        let bus: EventBus<String> = EventBus::new();
        bus.register("Enemy hit".to_string(), recorder(&log, "hit"));

        bus.dispatch(&"Enemy hit".to_string(), 4);
        bus.dispatch(&"Unknown".to_string(), 4);

        assert_eq!(*log.lock().unwrap(), vec![("hit", 4)]);
    }

    #[test]
    fn dispatch_from_other_threads() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            bus.register(GameplayEvent::EnemyHit, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let bus = bus.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        bus.dispatch_default(&GameplayEvent::EnemyHit);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(hits.load(Ordering::SeqCst), 100);
    }
}
