//! Poll dispatcher: one fetch/filter/dispatch cycle over every source.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use super::dedup::{DedupScope, DedupStore};
use super::error::{RecoveryScope, ScanError};
use super::filter::{KeywordMatcher, RecencyWindow};
use super::message::format_notification;
use crate::config::ScannerConfig;
use crate::datetime::parse_timezone;
use crate::notify::Notifier;
use crate::registry::{Subscriber, SubscriberRegistry};
use crate::source::{FeedItem, FeedSource, SourceError};
use crate::Result;

/// Tunables for a poll cycle.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub window: RecencyWindow,
    pub fetch_limit: usize,
    pub source_timeout: Duration,
    pub source_delay: Duration,
    pub dedup_capacity: usize,
    pub dedup_scope: DedupScope,
    pub timezone: Tz,
}

impl DispatchSettings {
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            window: RecencyWindow::from_secs(config.window_secs),
            fetch_limit: config.fetch_limit,
            source_timeout: Duration::from_secs(config.source_timeout_secs),
            source_delay: Duration::from_secs(config.source_delay_secs),
            dedup_capacity: config.dedup_capacity,
            dedup_scope: config.dedup_scope,
            timezone: parse_timezone(&config.timezone),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&ScannerConfig::default())
    }
}

/// Counters for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Subscribers in the registry snapshot.
    pub subscribers: usize,
    /// Subscribers skipped because their destination did not resolve.
    pub skipped_subscribers: usize,
    /// Sources fetched successfully.
    pub sources_ok: usize,
    /// Sources that failed or timed out.
    pub sources_failed: usize,
    /// Items returned by all sources.
    pub items_fetched: usize,
    /// Notifications delivered.
    pub sent: usize,
    /// Notifications that failed to deliver.
    pub failed_sends: usize,
}

struct Target {
    subscriber: Subscriber,
    gone: bool,
}

/// Fetches every source once per cycle and fans matches out to subscribers.
///
/// The dispatcher owns the dedup caches; it must be driven from one task.
pub struct PollDispatcher {
    registry: Arc<dyn SubscriberRegistry>,
    notifier: Arc<dyn Notifier>,
    sources: Vec<Arc<dyn FeedSource>>,
    matcher: KeywordMatcher,
    settings: DispatchSettings,
    seen: DedupStore,
}

impl PollDispatcher {
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        notifier: Arc<dyn Notifier>,
        sources: Vec<Arc<dyn FeedSource>>,
        keywords: &[String],
        settings: DispatchSettings,
    ) -> Result<Self> {
        let matcher = KeywordMatcher::new(keywords)?;
        let seen = DedupStore::new(settings.dedup_scope, settings.dedup_capacity);
        Ok(Self {
            registry,
            notifier,
            sources,
            matcher,
            settings,
            seen,
        })
    }

    /// Names of the configured sources, in poll order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Items already dispatched.
    pub fn seen(&self) -> &DedupStore {
        &self.seen
    }

    /// Run one cycle at the current time.
    pub async fn run_cycle(&mut self) -> std::result::Result<CycleReport, ScanError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle, judging recency against `now`.
    ///
    /// Only a registry failure aborts the cycle; source and delivery
    /// failures are logged and counted in the report.
    pub async fn run_cycle_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> std::result::Result<CycleReport, ScanError> {
        let mut report = CycleReport::default();

        let subscribers = self
            .registry
            .list_subscribers()
            .await
            .map_err(ScanError::Registry)?;
        report.subscribers = subscribers.len();

        let mut targets = Vec::with_capacity(subscribers.len());
        for subscriber in subscribers {
            match self.resolve(&subscriber).await {
                Ok(()) => targets.push(Target {
                    subscriber,
                    gone: false,
                }),
                Err(e) => {
                    warn!("Skipping subscriber: {}", e);
                    report.skipped_subscribers += 1;
                }
            }
        }

        if targets.is_empty() {
            debug!("No subscribers with a reachable destination");
            return Ok(report);
        }

        for index in 0..self.sources.len() {
            let source = Arc::clone(&self.sources[index]);

            match self.fetch(source.as_ref()).await {
                Ok(items) => {
                    report.sources_ok += 1;
                    report.items_fetched += items.len();
                    debug!("Fetched {} item(s) from {}", items.len(), source.name());
                    self.fan_out(source.name(), &items, &mut targets, now, &mut report)
                        .await;
                }
                Err(e) => {
                    warn!("{}", e);
                    report.sources_failed += 1;
                }
            }

            if !self.settings.source_delay.is_zero() {
                tokio::time::sleep(self.settings.source_delay).await;
            }
        }

        Ok(report)
    }

    async fn resolve(&self, subscriber: &Subscriber) -> std::result::Result<(), ScanError> {
        let destination = subscriber.destination;
        let reason = match self.notifier.resolve_channel(destination).await {
            Ok(Some(_)) => return Ok(()),
            Ok(None) => "channel not found".to_string(),
            Err(e) => e.to_string(),
        };
        Err(ScanError::Destination {
            subscriber_id: subscriber.subscriber_id.clone(),
            channel: destination,
            reason,
        })
    }

    async fn fetch(&self, source: &dyn FeedSource) -> std::result::Result<Vec<FeedItem>, ScanError> {
        let fetched = tokio::time::timeout(
            self.settings.source_timeout,
            source.fetch_recent(self.settings.fetch_limit),
        )
        .await
        .unwrap_or(Err(SourceError::Timeout));

        fetched.map_err(|error| ScanError::Source {
            source_name: source.name().to_string(),
            error,
        })
    }

    async fn fan_out(
        &mut self,
        source: &str,
        items: &[FeedItem],
        targets: &mut [Target],
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        for target in targets.iter_mut().filter(|t| !t.gone) {
            for item in items {
                match self.dispatch(&target.subscriber, source, item, now).await {
                    Ok(true) => report.sent += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!("{}", e);
                        report.failed_sends += 1;
                        if e.scope() >= RecoveryScope::Subscriber {
                            target.gone = true;
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Filter one item for one subscriber and send it if it qualifies.
    ///
    /// Returns whether a notification was delivered.
    async fn dispatch(
        &mut self,
        subscriber: &Subscriber,
        source: &str,
        item: &FeedItem,
        now: DateTime<Utc>,
    ) -> std::result::Result<bool, ScanError> {
        if !self.settings.window.contains(item.created_at, now) {
            return Ok(false);
        }

        if self.seen.contains(&subscriber.subscriber_id, source, &item.id) {
            debug!("Already dispatched {} from {}", item.id, source);
            return Ok(false);
        }

        let Some(keyword) = self.matcher.first_match(&item.title).map(str::to_string) else {
            return Ok(false);
        };

        // Recorded before sending; a failed send is not retried.
        self.seen.record(&subscriber.subscriber_id, source, &item.id);

        let text = format_notification(item, now, self.settings.timezone);
        self.notifier
            .send_message(subscriber.destination, &text)
            .await
            .map_err(|error| ScanError::Delivery {
                subscriber_id: subscriber.subscriber_id.clone(),
                error,
            })?;

        info!(
            "Sent \"{}\" from {} to {} ({}), matched \"{}\"",
            item.title, source, subscriber.subscriber_id, subscriber.destination, keyword
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::DeliveryError;
    use crate::registry::ChannelId;
    use crate::ScoutError;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct MemoryRegistry {
        subscribers: Mutex<Vec<Subscriber>>,
        fail: bool,
    }

    impl MemoryRegistry {
        fn with(subscribers: &[(&str, u64)]) -> Arc<Self> {
            Arc::new(Self {
                subscribers: Mutex::new(
                    subscribers
                        .iter()
                        .map(|(id, ch)| Subscriber::new(*id, ChannelId(*ch)))
                        .collect(),
                ),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                subscribers: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl SubscriberRegistry for MemoryRegistry {
        async fn get_destination(&self, subscriber_id: &str) -> Result<Option<ChannelId>> {
            Ok(self
                .subscribers
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.subscriber_id == subscriber_id)
                .map(|s| s.destination))
        }

        async fn set_destination(&self, subscriber_id: &str, destination: ChannelId) -> Result<()> {
            let mut subs = self.subscribers.lock().unwrap();
            subs.retain(|s| s.subscriber_id != subscriber_id);
            subs.push(Subscriber::new(subscriber_id, destination));
            Ok(())
        }

        async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
            if self.fail {
                return Err(ScoutError::Database("database is locked".to_string()));
            }
            Ok(self.subscribers.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(ChannelId, String)>>,
        missing: HashSet<u64>,
        gone: HashSet<u64>,
        failing: HashSet<u64>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<(ChannelId, String)> {
            self.sent.lock().unwrap().clone()
        }

        fn sent_to(&self, channel: u64) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter(|(c, _)| c.get() == channel)
                .map(|(_, text)| text)
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn resolve_channel(
            &self,
            channel: ChannelId,
        ) -> std::result::Result<Option<String>, DeliveryError> {
            if self.missing.contains(&channel.get()) {
                Ok(None)
            } else {
                Ok(Some(format!("#chan-{}", channel)))
            }
        }

        async fn send_message(
            &self,
            channel: ChannelId,
            text: &str,
        ) -> std::result::Result<(), DeliveryError> {
            if self.gone.contains(&channel.get()) {
                return Err(DeliveryError::DestinationGone(channel));
            }
            if self.failing.contains(&channel.get()) {
                return Err(DeliveryError::Failed("500 Internal Server Error".to_string()));
            }
            self.sent.lock().unwrap().push((channel, text.to_string()));
            Ok(())
        }
    }

    enum Behavior {
        Items(Vec<FeedItem>),
        Fail,
        Hang,
    }

    struct StaticSource {
        name: String,
        behavior: Behavior,
        fetches: Mutex<usize>,
    }

    impl StaticSource {
        fn new(name: &str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                behavior,
                fetches: Mutex::new(0),
            })
        }

        fn fetches(&self) -> usize {
            *self.fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl FeedSource for StaticSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_recent(&self, limit: usize) -> std::result::Result<Vec<FeedItem>, SourceError> {
            *self.fetches.lock().unwrap() += 1;
            match &self.behavior {
                Behavior::Items(items) => Ok(items.iter().take(limit).cloned().collect()),
                Behavior::Fail => Err(SourceError::Status(reqwest::StatusCode::BAD_GATEWAY)),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_736_157_600, 0).unwrap()
    }

    fn item(id: &str, title: &str, age_secs: i64) -> FeedItem {
        FeedItem::new(
            id,
            title,
            format!("https://example.com/{id}"),
            now() - ChronoDuration::seconds(age_secs),
        )
    }

    fn settings() -> DispatchSettings {
        DispatchSettings {
            source_timeout: Duration::from_millis(100),
            source_delay: Duration::ZERO,
            ..DispatchSettings::default()
        }
    }

    fn keywords() -> Vec<String> {
        vec!["giveaway".to_string(), "steam key".to_string()]
    }

    fn dispatcher(
        registry: Arc<dyn SubscriberRegistry>,
        notifier: Arc<RecordingNotifier>,
        sources: Vec<Arc<StaticSource>>,
        settings: DispatchSettings,
    ) -> PollDispatcher {
        let sources = sources
            .into_iter()
            .map(|s| s as Arc<dyn FeedSource>)
            .collect();
        PollDispatcher::new(registry, notifier, sources, &keywords(), settings).unwrap()
    }

    #[tokio::test]
    async fn test_single_match_is_sent_once() {
        let registry = MemoryRegistry::with(&[("S1", 100)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new(
            "r/pcgaming",
            Behavior::Items(vec![FeedItem::new(
                "abc",
                "Free Steam Key Giveaway!",
                "http://x",
                now() - ChronoDuration::seconds(600),
            )]),
        );
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![source], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.sent, 1);
        let sent = notifier.sent_to(100);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Free Steam Key Giveaway!"));
        assert!(sent[0].contains("http://x"));
        assert!(sent[0].contains("**Time Ago:** 10 minutes ago"));

        let report = dispatcher
            .run_cycle_at(now() + ChronoDuration::seconds(30))
            .await
            .unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_filters_stale_and_unmatched() {
        let registry = MemoryRegistry::with(&[("S1", 100)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new(
            "r/pcgaming",
            Behavior::Items(vec![
                item("fresh", "GIVEAWAY: Hades", 60),
                item("edge", "Steam key giveaway", 3600),
                item("stale", "Giveaway from yesterday", 3601),
                item("cats", "cat pictures", 10),
            ]),
        );
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![source], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.items_fetched, 4);
        assert_eq!(report.sent, 2);

        let sent = notifier.sent_to(100);
        assert!(sent[0].contains("Hades"));
        assert!(sent[1].contains("Steam key giveaway"));
    }

    #[tokio::test]
    async fn test_unmatched_items_are_not_recorded() {
        let registry = MemoryRegistry::with(&[("S1", 100)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new(
            "r/pcgaming",
            Behavior::Items(vec![item("cats", "cat pictures", 10), item("old", "giveaway", 9000)]),
        );
        let mut dispatcher = dispatcher(registry, notifier, vec![source], settings());

        dispatcher.run_cycle_at(now()).await.unwrap();
        assert!(dispatcher.seen().is_empty());
    }

    #[tokio::test]
    async fn test_failing_and_hanging_sources_do_not_block_others() {
        let registry = MemoryRegistry::with(&[("S1", 100)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let first = StaticSource::new("r/a", Behavior::Items(vec![item("1", "giveaway one", 5)]));
        let hanging = StaticSource::new("r/slow", Behavior::Hang);
        let last = StaticSource::new("r/c", Behavior::Items(vec![item("3", "giveaway three", 5)]));
        let mut dispatcher = dispatcher(
            registry,
            notifier.clone(),
            vec![first, hanging, last],
            settings(),
        );

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.sources_ok, 2);
        assert_eq!(report.sources_failed, 1);
        assert_eq!(report.sent, 2);

        let failing = StaticSource::new("r/broken", Behavior::Fail);
        let fresh = StaticSource::new("r/d", Behavior::Items(vec![item("4", "giveaway four", 5)]));
        let mut dispatcher = dispatcher_with(notifier.clone(), vec![failing, fresh]);
        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.sources_failed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(notifier.sent().len(), 3);
    }

    fn dispatcher_with(
        notifier: Arc<RecordingNotifier>,
        sources: Vec<Arc<StaticSource>>,
    ) -> PollDispatcher {
        dispatcher(MemoryRegistry::with(&[("S1", 100)]), notifier, sources, settings())
    }

    #[tokio::test]
    async fn test_each_source_fetched_once_per_cycle() {
        let registry = MemoryRegistry::with(&[("S1", 100), ("S2", 200), ("S3", 300)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new("r/a", Behavior::Items(vec![item("1", "giveaway", 5)]));
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![source.clone()], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(source.fetches(), 1);
        assert_eq!(report.sent, 3);
        assert_eq!(notifier.sent_to(100).len(), 1);
        assert_eq!(notifier.sent_to(200).len(), 1);
        assert_eq!(notifier.sent_to(300).len(), 1);
    }

    #[tokio::test]
    async fn test_global_scope_delivers_to_first_subscriber_only() {
        let registry = MemoryRegistry::with(&[("S1", 100), ("S2", 200)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new("r/a", Behavior::Items(vec![item("1", "giveaway", 5)]));
        let settings = DispatchSettings {
            dedup_scope: DedupScope::Global,
            ..settings()
        };
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![source], settings);

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(notifier.sent_to(100).len(), 1);
        assert!(notifier.sent_to(200).is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_destination_is_skipped() {
        let registry = MemoryRegistry::with(&[("S1", 100), ("S2", 200)]);
        let notifier = Arc::new(RecordingNotifier {
            missing: HashSet::from([100]),
            ..Default::default()
        });
        let source = StaticSource::new("r/a", Behavior::Items(vec![item("1", "giveaway", 5)]));
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![source], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.subscribers, 2);
        assert_eq!(report.skipped_subscribers, 1);
        assert!(notifier.sent_to(100).is_empty());
        assert_eq!(notifier.sent_to(200).len(), 1);
    }

    #[tokio::test]
    async fn test_no_subscribers_skips_fetch() {
        let registry = MemoryRegistry::with(&[]);
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new("r/a", Behavior::Items(vec![item("1", "giveaway", 5)]));
        let mut dispatcher = dispatcher(registry, notifier, vec![source.clone()], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report, CycleReport::default());
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_destination_gone_skips_rest_of_subscriber() {
        let registry = MemoryRegistry::with(&[("S1", 100), ("S2", 200)]);
        let notifier = Arc::new(RecordingNotifier {
            gone: HashSet::from([100]),
            ..Default::default()
        });
        let a = StaticSource::new(
            "r/a",
            Behavior::Items(vec![item("1", "giveaway one", 5), item("2", "giveaway two", 5)]),
        );
        let b = StaticSource::new("r/b", Behavior::Items(vec![item("3", "giveaway three", 5)]));
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![a, b], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.failed_sends, 1);
        assert_eq!(report.sent, 3);
        assert_eq!(notifier.sent_to(200).len(), 3);
    }

    #[tokio::test]
    async fn test_failed_send_continues_and_is_not_retried() {
        let registry = MemoryRegistry::with(&[("S1", 100)]);
        let notifier = Arc::new(RecordingNotifier {
            failing: HashSet::from([100]),
            ..Default::default()
        });
        let source = StaticSource::new(
            "r/a",
            Behavior::Items(vec![item("1", "giveaway one", 5), item("2", "giveaway two", 5)]),
        );
        let mut dispatcher = dispatcher(registry, notifier, vec![source], settings());

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.failed_sends, 2);

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.failed_sends, 0);
        assert_eq!(dispatcher.seen().len(), 2);
    }

    #[tokio::test]
    async fn test_many_subscribers_do_not_overflow_dedup() {
        // 41 guilds x 25 fresh posts is more than one cache of 1000 keys
        let guilds: Vec<(String, u64)> = (0..41).map(|i| (format!("G{i}"), 1000 + i)).collect();
        let guild_refs: Vec<(&str, u64)> = guilds.iter().map(|(id, ch)| (id.as_str(), *ch)).collect();
        let registry = MemoryRegistry::with(&guild_refs);
        let notifier = Arc::new(RecordingNotifier::default());
        let items = (0..25)
            .map(|i| item(&format!("post{i}"), "Steam key giveaway", 60))
            .collect();
        let source = StaticSource::new("r/pcgaming", Behavior::Items(items));
        let mut dispatcher = dispatcher(registry, notifier.clone(), vec![source], settings());
        assert_eq!(dispatcher.settings.dedup_capacity, 1000);

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.sent, 41 * 25);

        for later in [30, 60] {
            let report = dispatcher
                .run_cycle_at(now() + ChronoDuration::seconds(later))
                .await
                .unwrap();
            assert_eq!(report.sent, 0);
        }
        assert_eq!(notifier.sent().len(), 41 * 25);
        assert_eq!(dispatcher.seen().len(), 41 * 25);
    }

    #[tokio::test]
    async fn test_registry_failure_aborts_cycle() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = StaticSource::new("r/a", Behavior::Items(vec![item("1", "giveaway", 5)]));
        let mut dispatcher = dispatcher(
            MemoryRegistry::failing(),
            notifier,
            vec![source.clone()],
            settings(),
        );

        let err = dispatcher.run_cycle_at(now()).await.unwrap_err();
        assert_eq!(err.scope(), RecoveryScope::Cycle);
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_fetch_limit_is_passed_to_source() {
        let registry = MemoryRegistry::with(&[("S1", 100)]);
        let notifier = Arc::new(RecordingNotifier::default());
        let items = (0..10)
            .map(|i| item(&i.to_string(), "giveaway", 5))
            .collect();
        let source = StaticSource::new("r/a", Behavior::Items(items));
        let settings = DispatchSettings {
            fetch_limit: 3,
            ..settings()
        };
        let mut dispatcher = dispatcher(registry, notifier, vec![source], settings);

        let report = dispatcher.run_cycle_at(now()).await.unwrap();
        assert_eq!(report.items_fetched, 3);
        assert_eq!(report.sent, 3);
    }

    #[test]
    fn test_settings_from_config() {
        let config = ScannerConfig {
            source_timeout_secs: 12,
            timezone: "Asia/Kolkata".to_string(),
            ..ScannerConfig::default()
        };
        let settings = DispatchSettings::from_config(&config);
        assert_eq!(settings.source_timeout, Duration::from_secs(12));
        assert_eq!(settings.source_delay, Duration::from_secs(2));
        assert_eq!(settings.timezone, Tz::Asia__Kolkata);
        assert_eq!(settings.dedup_scope, DedupScope::PerSubscriber);
        assert_eq!(settings.fetch_limit, 25);
        assert_eq!(settings.dedup_capacity, 1000);
    }
}
