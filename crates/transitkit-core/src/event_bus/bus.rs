//! Event bus implementation.
//!
//! Consumers are delivered to in subscription order. Every published event
//! gets a sequence number; with a history capacity the bus keeps the most
//! recent events so a late consumer can catch up with [`EventBus::since`].

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by the subscribe calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Which events a consumer receives
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events of any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(AppEvent) + Send + Sync>;

#[derive(Clone)]
enum Consumer {
    /// Runs on the publishing thread.
    Handler(EventHandler),
    /// Drained by the consumer on its own thread.
    Queue(mpsc::UnboundedSender<AppEvent>),
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    consumer: Consumer,
}

/// Configuration for the event bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Capacity of the broadcast channel.
    pub channel_capacity: usize,
    /// Number of recent events kept for [`EventBus::since`]; 0 keeps none.
    pub history_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            history_capacity: 0,
        }
    }
}

/// An event together with its sequence number
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent {
    pub sequence: u64,
    pub event: AppEvent,
}

/// Publish/subscribe hub shared by the model thread and the UI side
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscriptions: RwLock<Vec<Subscription>>,
    sequence: AtomicU64,
    history: Mutex<VecDeque<SequencedEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscriptions: RwLock::new(Vec::new()),
            sequence: AtomicU64::new(0),
            history: Mutex::new(VecDeque::with_capacity(config.history_capacity)),
            config,
        }
    }

    /// Publish an event to every matching consumer
    ///
    /// Returns the number of consumers reached, broadcast receivers
    /// included. Queues whose receiver was dropped are removed.
    pub fn publish(&self, event: AppEvent) -> usize {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(sequence, "Publishing {}", event.description());
        self.record(sequence, &event);

        // Handlers run without the lock held so they may publish or
        // subscribe themselves
        let targets: Vec<(SubscriptionId, Consumer)> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| (s.id, s.consumer.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, consumer) in targets {
            match consumer {
                Consumer::Handler(handler) => {
                    handler(event.clone());
                    delivered += 1;
                }
                Consumer::Queue(queue) => match queue.send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => closed.push(id),
                },
            }
        }

        if !closed.is_empty() {
            self.subscriptions.write().retain(|s| !closed.contains(&s.id));
            for id in closed {
                tracing::debug!("Subscription {} closed by consumer", id);
            }
        }

        // Having no broadcast receiver is normal
        delivered + self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe a handler called on the publishing thread
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        self.add(filter, Consumer::Handler(Arc::new(handler)))
    }

    /// Subscribe with a dedicated queue drained by the consumer
    pub fn subscribe_queue(
        &self,
        filter: EventFilter,
    ) -> (SubscriptionId, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.add(filter, Consumer::Queue(tx)), rx)
    }

    fn add(&self, filter: EventFilter, consumer: Consumer) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            consumer,
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// A broadcast receiver for async tasks
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Returns true if the subscription existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Sequence number of the last published event, 0 before the first
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Retained events published after `sequence`, oldest first
    pub fn since(&self, sequence: u64) -> Vec<SequencedEvent> {
        self.history
            .lock()
            .iter()
            .filter(|e| e.sequence > sequence)
            .cloned()
            .collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, sequence: u64, event: &AppEvent) {
        if self.config.history_capacity == 0 {
            return;
        }
        let mut history = self.history.lock();
        if history.len() == self.config.history_capacity {
            history.pop_front();
        }
        history.push_back(SequencedEvent {
            sequence,
            event: event.clone(),
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("last_sequence", &self.last_sequence())
            .field("config", &self.config)
            .finish()
    }
}

static EVENT_BUS: OnceLock<Arc<EventBus>> = OnceLock::new();

/// The process-wide event bus
///
/// The application shell hands this instance to the model thread and the UI
/// queue; tests usually create their own `EventBus`.
pub fn event_bus() -> Arc<EventBus> {
    EVENT_BUS.get_or_init(|| Arc::new(EventBus::new())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{HistoryEvent, ProjectEvent, WorldEvent};

    fn history_changed(past: usize) -> AppEvent {
        AppEvent::History(HistoryEvent::Changed { past, future: 0 })
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..4 {
            let order = order.clone();
            bus.subscribe(EventFilter::All, move |_| order.lock().push(n));
        }
        assert_eq!(bus.publish(history_changed(1)), 4);
        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(EventBus::new());
        let (_, mut projects) =
            bus.subscribe_queue(EventFilter::Categories(vec![EventCategory::Project]));
        let inner = bus.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::History]),
            move |_| {
                inner.publish(AppEvent::Project(ProjectEvent::NewProject {
                    name: "nested".to_string(),
                    path: None,
                }));
            },
        );

        bus.publish(history_changed(1));
        assert!(matches!(projects.try_recv(), Ok(AppEvent::Project(_))));
        assert_eq!(bus.last_sequence(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(history_changed(1)), 0);
        assert_eq!(bus.last_sequence(), 1);
    }

    #[test]
    fn test_queue_subscription_filters() {
        let bus = EventBus::new();
        let (_, mut history_queue) =
            bus.subscribe_queue(EventFilter::Categories(vec![EventCategory::History]));
        let (_, mut world_queue) =
            bus.subscribe_queue(EventFilter::Categories(vec![EventCategory::World]));

        bus.publish(history_changed(2));
        bus.publish(AppEvent::World(WorldEvent::SegmentUsageChanged {
            columns: 1,
            rows: 1,
            in_use: vec![],
        }));

        assert_eq!(history_queue.try_recv().ok(), Some(history_changed(2)));
        assert!(history_queue.try_recv().is_err());
        assert!(matches!(world_queue.try_recv(), Ok(AppEvent::World(_))));
    }

    #[test]
    fn test_dropped_queue_is_pruned() {
        let bus = EventBus::new();
        let (_, queue) = bus.subscribe_queue(EventFilter::All);
        drop(queue);
        assert_eq!(bus.publish(history_changed(1)), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_history_keeps_latest_events() {
        let bus = EventBus::with_config(EventBusConfig {
            history_capacity: 5,
            ..Default::default()
        });
        for i in 0..10 {
            bus.publish(history_changed(i));
        }

        let all = bus.since(0);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].sequence, 6);
        assert_eq!(all[0].event, history_changed(5));

        let tail = bus.since(8);
        assert_eq!(
            tail.iter().map(|e| e.sequence).collect::<Vec<_>>(),
            vec![9, 10]
        );

        bus.clear_history();
        assert!(bus.since(0).is_empty());
    }

    #[test]
    fn test_history_disabled_by_default() {
        let bus = EventBus::new();
        bus.publish(history_changed(1));
        assert!(bus.since(0).is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let event = AppEvent::Project(ProjectEvent::NewProject {
            name: "test".to_string(),
            path: None,
        });
        assert!(EventFilter::All.matches(&event));
        assert!(EventFilter::Categories(vec![EventCategory::Project]).matches(&event));
        assert!(!EventFilter::Categories(vec![EventCategory::Camera]).matches(&event));
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();
        bus.publish(history_changed(3));
        match receiver.recv().await {
            Ok(AppEvent::History(HistoryEvent::Changed { past, .. })) => assert_eq!(past, 3),
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
