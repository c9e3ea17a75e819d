//! Report orchestration.
//!
//! The pipeline behind "generate my weekly report": resolve the user, try
//! the cache, fan out to whichever integrations the user has connected,
//! merge the results, generate, cache, return.
//!
//! Partial failure policy: graceful degradation. A failed or timed-out
//! integration fetch is logged and omitted from the merged dataset; the
//! report still generates from whatever arrived. Generator failures are the
//! only fatal error on the miss path — in that case nothing is cached.

use crate::cache::{report_key, ReportCache};
use crate::db::{CredentialSet, Database};
use crate::error::{Error, Result};
use crate::generator::ReportGenerator;
use crate::integrations::IntegrationClient;
use crate::window::{ActivityWindow, DEFAULT_LOOKBACK_DAYS};
use futures::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Tuning knobs for report generation
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Lookback window applied to every integration query
    pub lookback_days: i64,
    /// Per-integration fetch deadline
    pub fetch_timeout: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// ReportService orchestrates report generation for one user at a time.
///
/// All collaborators are injected at construction so tests can substitute
/// in-memory fakes for the cache, the generator, and the clients.
pub struct ReportService {
    db: Arc<Database>,
    cache: Arc<dyn ReportCache>,
    generator: Arc<dyn ReportGenerator>,
    clients: Vec<Arc<dyn IntegrationClient>>,
    config: ReportConfig,
}

impl ReportService {
    /// Create a new report service with default tuning
    pub fn new(
        db: Arc<Database>,
        cache: Arc<dyn ReportCache>,
        generator: Arc<dyn ReportGenerator>,
        clients: Vec<Arc<dyn IntegrationClient>>,
    ) -> Self {
        Self::with_config(db, cache, generator, clients, ReportConfig::default())
    }

    pub fn with_config(
        db: Arc<Database>,
        cache: Arc<dyn ReportCache>,
        generator: Arc<dyn ReportGenerator>,
        clients: Vec<Arc<dyn IntegrationClient>>,
        config: ReportConfig,
    ) -> Self {
        Self {
            db,
            cache,
            generator,
            clients,
            config,
        }
    }

    /// Generate (or serve from cache) the user's after-action report
    pub async fn generate_report(&self, user_id: &str) -> Result<String> {
        // Unknown identities fail before any cache or upstream access
        let user = self.db.get_user(user_id)?.ok_or(Error::Unauthorized)?;

        let key = report_key(user_id);
        match self.cache.get(&key) {
            Ok(Some(text)) => {
                info!(user_id = %user_id, "Report cache hit");
                return Ok(text);
            }
            Ok(None) => {}
            // Cache trouble degrades to a regular miss
            Err(e) => warn!(user_id = %user_id, error = %e, "Report cache unavailable"),
        }

        let window = ActivityWindow::last_days(self.config.lookback_days);
        let data = self.fetch_enabled(&user.credentials(), &window).await;
        info!(
            user_id = %user_id,
            integrations = data.len(),
            "Generating report"
        );

        let text = self.generator.generate(&data).await?;

        if let Err(e) = self.cache.put(&key, &text) {
            warn!(user_id = %user_id, error = %e, "Report cache write failed");
        }

        Ok(text)
    }

    /// Fan out to every integration with a credential, joined concurrently.
    ///
    /// Missing credentials are skipped silently; fetch errors and timeouts
    /// drop that integration from the result.
    async fn fetch_enabled(
        &self,
        credentials: &CredentialSet,
        window: &ActivityWindow,
    ) -> Map<String, Value> {
        let enabled: Vec<_> = self
            .clients
            .iter()
            .filter_map(|client| {
                credentials
                    .token_for(client.name())
                    .map(|token| (Arc::clone(client), token.to_string()))
            })
            .collect();

        let deadline = self.config.fetch_timeout;
        let fetches = enabled.into_iter().map(|(client, token)| {
            let window = *window;
            async move {
                let name = client.name();
                match tokio::time::timeout(
                    deadline,
                    client.fetch_recent_activity(&token, &window),
                )
                .await
                {
                    Ok(Ok(dataset)) => Some((name.to_string(), dataset)),
                    Ok(Err(e)) => {
                        warn!(integration = name, error = %e, "Integration fetch failed, omitting");
                        None
                    }
                    Err(_) => {
                        warn!(
                            integration = name,
                            timeout_ms = deadline.as_millis() as u64,
                            "Integration fetch timed out, omitting"
                        );
                        None
                    }
                }
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // ─────────────────────────────────────────────────────────────────────
    // Fakes
    // ─────────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeCache {
        entries: Mutex<HashMap<String, String>>,
        gets: AtomicUsize,
        puts: AtomicUsize,
        fail_reads: bool,
    }

    impl FakeCache {
        fn unreliable() -> Self {
            Self {
                fail_reads: true,
                ..Self::default()
            }
        }

        fn preloaded(key: &str, text: &str) -> Self {
            let cache = Self::default();
            cache
                .entries
                .lock()
                .unwrap()
                .insert(key.to_string(), text.to_string());
            cache
        }
    }

    impl ReportCache for FakeCache {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(Error::CacheUnavailable("store offline".to_string()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn put(&self, key: &str, text: &str) -> Result<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), text.to_string());
            Ok(())
        }
    }

    /// Generator producing different text on every call, so tests can tell
    /// a cached response from a regenerated one.
    #[derive(Default)]
    struct FakeGenerator {
        calls: AtomicUsize,
        fail: bool,
        last_dataset: Mutex<Option<Map<String, Value>>>,
    }

    impl FakeGenerator {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn seen_dataset(&self) -> Map<String, Value> {
            self.last_dataset.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl ReportGenerator for FakeGenerator {
        async fn generate(&self, data: &Map<String, Value>) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(Error::Generation("model offline".to_string()));
            }
            *self.last_dataset.lock().unwrap() = Some(data.clone());

            let mut keys: Vec<_> = data.keys().cloned().collect();
            keys.sort();
            Ok(format!("report v{} [{}]", call, keys.join(",")))
        }
    }

    struct FakeClient {
        name: &'static str,
        dataset: Value,
        fail: bool,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeClient {
        fn returning(name: &'static str, dataset: Value) -> Arc<Self> {
            Arc::new(Self {
                name,
                dataset,
                fail: false,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                dataset: Value::Null,
                fail: true,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                dataset: json!({ "late": true }),
                fail: false,
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl IntegrationClient for FakeClient {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_recent_activity(
            &self,
            _token: &str,
            _window: &ActivityWindow,
        ) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(Error::integration_fetch(self.name, "HTTP 502"));
            }
            Ok(self.dataset.clone())
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Harness
    // ─────────────────────────────────────────────────────────────────────

    fn seeded_db(tokens: &[(&str, &str)]) -> (Arc<Database>, String) {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        let user_id = db
            .create_user(&NewUser {
                email: "u@example.com".to_string(),
                password_hash: "h".to_string(),
                password_salt: "s".to_string(),
            })
            .unwrap();
        for &(integration, token) in tokens {
            db.set_integration_token(&user_id, integration, token).unwrap();
        }
        (Arc::new(db), user_id)
    }

    fn service(
        db: Arc<Database>,
        cache: Arc<FakeCache>,
        generator: Arc<FakeGenerator>,
        clients: Vec<Arc<dyn IntegrationClient>>,
    ) -> ReportService {
        ReportService::with_config(
            db,
            cache,
            generator,
            clients,
            ReportConfig {
                lookback_days: 7,
                fetch_timeout: Duration::from_millis(200),
            },
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unknown_user_fails_before_cache_access() {
        let (db, _) = seeded_db(&[]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let svc = service(db, cache.clone(), generator.clone(), vec![]);

        let err = svc.generate_report("not-a-user").await.unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits_everything() {
        let (db, user_id) = seeded_db(&[("notion", "t")]);
        let cache = Arc::new(FakeCache::preloaded(
            &report_key(&user_id),
            "cached report",
        ));
        let generator = Arc::new(FakeGenerator::default());
        let notion = FakeClient::returning("notion", json!({ "db1": [] }));
        let svc = service(db, cache, generator.clone(), vec![notion.clone()]);

        let text = svc.generate_report(&user_id).await.unwrap();

        assert_eq!(text, "cached report");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(notion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_integrations_still_generates() {
        let (db, user_id) = seeded_db(&[]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let svc = service(db, cache, generator.clone(), vec![]);

        let text = svc.generate_report(&user_id).await.unwrap();

        assert_eq!(text, "report v1 []");
        assert!(generator.seen_dataset().is_empty());
    }

    #[tokio::test]
    async fn test_partial_availability_only_connected_keys() {
        let (db, user_id) = seeded_db(&[("clockify", "t")]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let clients: Vec<Arc<dyn IntegrationClient>> = vec![
            FakeClient::returning("notion", json!({})),
            FakeClient::returning("github", json!({})),
            FakeClient::returning("clockify", json!({ "time_entries": [] })),
        ];
        let svc = service(db, cache, generator.clone(), clients);

        svc.generate_report(&user_id).await.unwrap();

        let dataset = generator.seen_dataset();
        assert_eq!(dataset.len(), 1);
        // Absent integrations are omitted, not present as null
        assert!(dataset.contains_key("clockify"));
        assert!(!dataset.contains_key("notion"));
        assert!(!dataset.contains_key("github"));
    }

    #[tokio::test]
    async fn test_notes_only_scenario_caches_and_returns() {
        let (db, user_id) = seeded_db(&[("notion", "secret")]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let notion = FakeClient::returning("notion", json!({ "db1": [{ "page": 1 }] }));
        let svc = service(db, cache.clone(), generator.clone(), vec![notion]);

        let text = svc.generate_report(&user_id).await.unwrap();

        let dataset = generator.seen_dataset();
        assert_eq!(dataset["notion"], json!({ "db1": [{ "page": 1 }] }));

        assert_eq!(cache.puts.load(Ordering::SeqCst), 1);
        let cached = cache.entries.lock().unwrap()[&report_key(&user_id)].clone();
        assert_eq!(cached, text);
    }

    #[tokio::test]
    async fn test_failing_integration_is_omitted() {
        let (db, user_id) = seeded_db(&[("notion", "t1"), ("github", "t2")]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let clients: Vec<Arc<dyn IntegrationClient>> = vec![
            FakeClient::returning("notion", json!({ "db1": [] })),
            FakeClient::failing("github"),
        ];
        let svc = service(db, cache, generator.clone(), clients);

        // The report succeeds without the broken integration
        svc.generate_report(&user_id).await.unwrap();

        let dataset = generator.seen_dataset();
        assert!(dataset.contains_key("notion"));
        assert!(!dataset.contains_key("github"));
    }

    #[tokio::test]
    async fn test_slow_integration_hits_deadline_and_is_omitted() {
        let (db, user_id) = seeded_db(&[("notion", "t1"), ("github", "t2")]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let clients: Vec<Arc<dyn IntegrationClient>> = vec![
            FakeClient::returning("notion", json!({ "db1": [] })),
            FakeClient::slow("github", Duration::from_secs(5)),
        ];
        let svc = service(db, cache, generator.clone(), clients);

        svc.generate_report(&user_id).await.unwrap();

        let dataset = generator.seen_dataset();
        assert!(dataset.contains_key("notion"));
        assert!(!dataset.contains_key("github"));
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_idempotent() {
        let (db, user_id) = seeded_db(&[("notion", "t")]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let notion = FakeClient::returning("notion", json!({ "db1": [] }));
        let svc = service(db, cache, generator.clone(), vec![notion]);

        let first = svc.generate_report(&user_id).await.unwrap();
        let second = svc.generate_report(&user_id).await.unwrap();

        // The generator would have produced "report v2 ..." on a live call
        assert_eq!(first, second);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_caches_nothing() {
        let (db, user_id) = seeded_db(&[]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::failing());
        let svc = service(db, cache.clone(), generator, vec![]);

        let err = svc.generate_report(&user_id).await.unwrap_err();

        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(cache.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_read_failure_degrades_to_regenerate() {
        let (db, user_id) = seeded_db(&[]);
        let cache = Arc::new(FakeCache::unreliable());
        let generator = Arc::new(FakeGenerator::default());
        let svc = service(db, cache, generator.clone(), vec![]);

        let text = svc.generate_report(&user_id).await.unwrap();

        assert_eq!(text, "report v1 []");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clients_without_credentials_never_called() {
        let (db, user_id) = seeded_db(&[("github", "t")]);
        let cache = Arc::new(FakeCache::default());
        let generator = Arc::new(FakeGenerator::default());
        let notion = FakeClient::returning("notion", json!({}));
        let github = FakeClient::returning("github", json!({ "commits": [] }));
        let svc = service(
            db,
            cache,
            generator,
            vec![notion.clone(), github.clone()],
        );

        svc.generate_report(&user_id).await.unwrap();

        assert_eq!(notion.calls.load(Ordering::SeqCst), 0);
        assert_eq!(github.calls.load(Ordering::SeqCst), 1);
    }
}
