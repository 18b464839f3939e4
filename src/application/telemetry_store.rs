// Telemetry store - Owns the tree, advances it on a timer and fans out topic updates
use crate::application::simulator::{SimulationConfig, Simulator, TickReport};
use crate::domain::telemetry::{TelemetryTree, Topic, TopicUpdate};
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1);

/// Receives the current subtree of a topic after every tick that touched it.
pub trait TelemetrySubscriber: Send + Sync {
    fn on_update(&self, update: &TopicUpdate);
}

impl<F> TelemetrySubscriber for F
where
    F: Fn(&TopicUpdate) + Send + Sync,
{
    fn on_update(&self, update: &TopicUpdate) {
        self(update)
    }
}

pub type SubscriberHandle = Arc<dyn TelemetrySubscriber>;

fn same_handler(a: &SubscriberHandle, b: &SubscriberHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

struct StoreInner {
    tree: Mutex<TelemetryTree>,
    rng: Mutex<StdRng>,
    subscribers: Mutex<HashMap<Topic, Vec<SubscriberHandle>>>,
    updater: Mutex<Option<JoinHandle<()>>>,
    /// Held from mutation through fan-out so subscribers see changes in order.
    publish: Mutex<()>,
    simulator: Simulator,
}

impl StoreInner {
    fn tick(&self) -> TickReport {
        let _publish = self.publish.lock();
        // Mutate and snapshot under one lock; subscribers run after it is released.
        let (report, updates) = {
            let mut tree = self.tree.lock();
            let mut rng = self.rng.lock();
            let report = self.simulator.advance(&mut tree, &mut *rng, Utc::now());
            let updates: Vec<TopicUpdate> = report.topics.iter().map(|t| tree.topic(*t)).collect();
            (report, updates)
        };

        for update in &updates {
            self.notify(update);
        }

        tracing::debug!(topics = ?report.topics, "telemetry tick");
        report
    }

    fn replace_tree(&self, tree: TelemetryTree) {
        let _publish = self.publish.lock();
        let updates: Vec<TopicUpdate> = {
            let mut current = self.tree.lock();
            *current = tree;
            Topic::ALL.iter().map(|t| current.topic(*t)).collect()
        };

        for update in &updates {
            self.notify(update);
        }
    }

    fn notify(&self, update: &TopicUpdate) {
        let handlers = self
            .subscribers
            .lock()
            .get(&update.topic())
            .cloned()
            .unwrap_or_default();

        for handler in handlers {
            handler.on_update(update);
        }
    }
}

/// Shared handle to the simulated telemetry. Cloning is cheap and every clone
/// sees the same tree and subscription table.
#[derive(Clone)]
pub struct TelemetryStore {
    inner: Arc<StoreInner>,
}

impl TelemetryStore {
    pub fn new(tree: TelemetryTree, config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                tree: Mutex::new(tree),
                rng: Mutex::new(rng),
                subscribers: Mutex::new(HashMap::new()),
                updater: Mutex::new(None),
                publish: Mutex::new(()),
                simulator: Simulator::new(config),
            }),
        }
    }

    /// Registers `handler` for `topic`. Registering the same handle twice is
    /// allowed and makes it fire twice per update.
    pub fn subscribe(&self, topic: Topic, handler: SubscriberHandle) {
        let mut subscribers = self.inner.subscribers.lock();
        let handlers = subscribers.entry(topic).or_default();
        if handlers.iter().any(|h| same_handler(h, &handler)) {
            tracing::warn!(%topic, "handler subscribed more than once; it will be invoked per registration");
        }
        handlers.push(handler);
    }

    /// Removes the first registration of `handler` under `topic`.
    pub fn unsubscribe(&self, topic: Topic, handler: &SubscriberHandle) -> bool {
        let mut subscribers = self.inner.subscribers.lock();
        let Some(handlers) = subscribers.get_mut(&topic) else {
            return false;
        };
        match handlers.iter().position(|h| same_handler(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .subscribers
            .lock()
            .get(&topic)
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    /// Starts the periodic update loop. Returns `false` if it was already running.
    ///
    /// The first tick happens one full `interval` after the call. Must be called
    /// from within a Tokio runtime.
    pub fn start_updates(&self, interval: Duration) -> bool {
        let mut updater = self.inner.updater.lock();
        if updater.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let period = interval.max(MIN_UPDATE_INTERVAL);
        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
        *updater = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.tick();
            }
        }));

        tracing::info!(
            interval_ms = period.as_millis() as u64,
            alert_probability = self.inner.simulator.config().alert_probability,
            "real-time telemetry updates started"
        );
        true
    }

    /// Cancels the update loop. Safe to call when it is not running.
    pub fn stop_updates(&self) {
        if let Some(handle) = self.inner.updater.lock().take() {
            handle.abort();
            tracing::info!("real-time telemetry updates stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .updater
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs one update cycle synchronously and notifies subscribers.
    ///
    /// Serialized with the update loop, so calling it while updates run is safe,
    /// but a subscriber must not call it from `on_update`.
    pub(crate) fn tick(&self) -> TickReport {
        self.inner.tick()
    }

    /// Swaps in a fresh tree and pushes every topic to its subscribers.
    /// The update loop, if running, keeps running against the new tree.
    pub fn replace_tree(&self, tree: TelemetryTree) {
        self.inner.replace_tree(tree);
        tracing::info!("telemetry tree replaced");
    }

    pub fn snapshot(&self, topic: Topic) -> TopicUpdate {
        self.inner.tree.lock().topic(topic)
    }

    pub fn get_all(&self) -> TelemetryTree {
        self.inner.tree.lock().clone()
    }

    /// Stops updates and drops every subscription.
    pub fn dispose(&self) {
        self.stop_updates();
        self.inner.subscribers.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::synthetic::synthesize_tree;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store(alert_probability: f64) -> TelemetryStore {
        let mut rng = StdRng::seed_from_u64(21);
        let tree = synthesize_tree(&mut rng, Utc::now());
        TelemetryStore::new(tree, SimulationConfig { alert_probability }, rng)
    }

    fn counter() -> (Arc<AtomicUsize>, SubscriberHandle) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let handler: SubscriberHandle = Arc::new(move |_: &TopicUpdate| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, handler)
    }

    #[test]
    fn test_subscribers_run_in_registration_order() {
        let store = store(0.0);
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            store.subscribe(
                Topic::Environment,
                Arc::new(move |_: &TopicUpdate| order.lock().push(label)),
            );
        }

        store.tick();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_duplicate_subscription_fires_twice_and_unsubscribe_removes_one() {
        let store = store(0.0);
        let (count, handler) = counter();

        store.subscribe(Topic::Equipment, handler.clone());
        store.subscribe(Topic::Equipment, handler.clone());
        store.tick();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        assert!(store.unsubscribe(Topic::Equipment, &handler));
        store.tick();
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(store.unsubscribe(Topic::Equipment, &handler));
        assert!(!store.unsubscribe(Topic::Equipment, &handler));
        assert_eq!(store.subscriber_count(Topic::Equipment), 0);
    }

    #[test]
    fn test_payload_matches_topic() {
        let store = store(1.0);
        let topics = Arc::new(Mutex::new(Vec::new()));
        for topic in Topic::ALL {
            let topics = topics.clone();
            store.subscribe(
                topic,
                Arc::new(move |update: &TopicUpdate| topics.lock().push(update.topic())),
            );
        }

        let report = store.tick();
        assert!(report.alert.is_some());
        assert_eq!(*topics.lock(), Topic::ALL.to_vec());
    }

    #[test]
    fn test_alert_topic_quiet_without_new_alert() {
        let store = store(0.0);
        let (count, handler) = counter();
        store.subscribe(Topic::Alerts, handler);
        for _ in 0..10 {
            store.tick();
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handlers_may_read_the_store() {
        let store = store(0.0);
        let reader = store.clone();
        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();

        store.subscribe(
            Topic::Environment,
            Arc::new(move |update: &TopicUpdate| {
                *sink.lock() = Some(reader.snapshot(Topic::Environment) == *update);
            }),
        );

        store.tick();
        assert_eq!(*observed.lock(), Some(true));
    }

    #[test]
    fn test_dispose_clears_subscriptions() {
        let store = store(0.0);
        let (count, handler) = counter();
        store.subscribe(Topic::Production, handler);
        store.dispose();
        store.tick();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!store.is_running());
    }

    #[test]
    fn test_replace_tree_restores_seed_and_notifies_every_topic() {
        let mut rng = StdRng::seed_from_u64(5);
        let seed = synthesize_tree(&mut rng, Utc::now());
        let store = TelemetryStore::new(seed.clone(), SimulationConfig::default(), rng);
        for _ in 0..5 {
            store.tick();
        }
        assert_ne!(store.get_all().environment_data, seed.environment_data);

        let topics = Arc::new(Mutex::new(Vec::new()));
        for topic in Topic::ALL {
            let topics = topics.clone();
            store.subscribe(
                topic,
                Arc::new(move |update: &TopicUpdate| topics.lock().push(update.topic())),
            );
        }

        store.replace_tree(seed.clone());
        assert_eq!(*topics.lock(), Topic::ALL.to_vec());
        for (name, metric) in &seed.environment_data {
            assert_eq!(store.get_all().environment_data[name].current, metric.current);
        }
        assert_eq!(store.snapshot(Topic::Alerts), seed.topic(Topic::Alerts));
    }

    #[test]
    fn test_concurrent_ticks_publish_in_order() {
        let store = store(0.0);
        let levels = Arc::new(Mutex::new(Vec::new()));
        let sink = levels.clone();
        store.subscribe(
            Topic::Equipment,
            Arc::new(move |update: &TopicUpdate| {
                if let TopicUpdate::Equipment(equipment) = update {
                    sink.lock().push(equipment["grassLayingMachine"].power_level());
                }
            }),
        );

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        store.tick();
                    }
                });
            }
        });

        let levels = levels.lock();
        assert_eq!(levels.len(), 200);
        assert!(levels.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_does_not_double_rate() {
        let store = store(0.0);
        let (count, handler) = counter();
        store.subscribe(Topic::Environment, handler);

        assert!(store.start_updates(Duration::from_secs(3)));
        assert!(!store.start_updates(Duration::from_secs(3)));
        assert!(store.is_running());

        tokio::time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        store.stop_updates();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_start_resumes() {
        let store = store(0.0);
        let (count, handler) = counter();
        store.subscribe(Topic::Environment, handler);

        store.stop_updates();
        store.start_updates(Duration::from_secs(3));
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        store.stop_updates();
        store.stop_updates();
        assert!(!store.is_running());
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(store.start_updates(Duration::from_secs(3)));
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        store.dispose();
    }
}
