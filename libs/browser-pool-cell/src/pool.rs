use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared_models::{HealthReport, HealthStatus};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::PoolError;
use crate::factory::SessionFactory;
use crate::page::{NavigationWait, Page};
use crate::session::Session;

/// Sentinel court id used by the emergency-fallback recovery strategy
/// (spec.md §4.F / §4.I rule 4).
pub const EMERGENCY_COURT_ID: u32 = 99;

const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// Fixed pool of per-court pre-warmed browser sessions (spec.md §4.E).
///
/// `critical_operation` is a bare `AtomicBool`, not behind the session lock,
/// so pre-dispatch readers never block on it (Design Notes §9).
pub struct BrowserPool {
    court_urls: HashMap<u32, String>,
    factory: Arc<dyn SessionFactory>,
    sessions: RwLock<HashMap<u32, Session>>,
    critical_operation: AtomicBool,
    stale_after: Duration,
}

impl BrowserPool {
    pub fn new(court_urls: HashMap<u32, String>, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            court_urls,
            factory,
            sessions: RwLock::new(HashMap::new()),
            critical_operation: AtomicBool::new(false),
            stale_after: DEFAULT_STALE_AFTER,
        }
    }

    pub fn courts(&self) -> Vec<u32> {
        let mut courts: Vec<u32> = self.court_urls.keys().copied().collect();
        courts.sort_unstable();
        courts
    }

    /// Spins up a session for every configured court. Individual failures
    /// are logged and left for the recovery orchestrator to pick up on the
    /// next health gate rather than aborting startup entirely.
    pub async fn start(&self) -> Result<(), PoolError> {
        for court in self.courts() {
            if let Err(err) = self.create_session(court).await {
                warn!(court, %err, "failed to start session during pool start");
            }
        }
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), PoolError> {
        let mut sessions = self.sessions.write().await;
        for (court, session) in sessions.drain() {
            if let Err(err) = session.page.close().await {
                warn!(court, %err, "error closing session during pool stop");
            }
        }
        Ok(())
    }

    async fn create_session(&self, court: u32) -> Result<(), PoolError> {
        let base_url = self
            .court_urls
            .get(&court)
            .cloned()
            .ok_or(PoolError::NoSession(court))?;
        let page = self.factory.create(court, &base_url).await?;
        let mut sessions = self.sessions.write().await;
        sessions.insert(court, Session::new(court, page, base_url));
        Ok(())
    }

    /// Closes and replaces a single court's session. Used directly by the
    /// individual-court recovery strategy.
    pub async fn recreate_session(&self, court: u32) -> Result<(), PoolError> {
        {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.remove(&court) {
                let _ = session.page.close().await;
            }
        }
        self.create_session(court).await
    }

    /// Returns a healthy page handle for `court`, creating one on demand if
    /// none exists yet or the existing one fails a cheap liveness probe.
    pub async fn get_page(&self, court: u32) -> Result<Arc<dyn Page>, PoolError> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&court) {
                if session.page.current_url().await.is_ok() {
                    return Ok(session.page.clone());
                }
            }
        }
        warn!(court, "session missing or dead, recreating on demand");
        self.recreate_session(court).await?;
        let sessions = self.sessions.read().await;
        sessions
            .get(&court)
            .map(|s| s.page.clone())
            .ok_or(PoolError::NoSession(court))
    }

    /// Reloads every session's base schedule URL. Called before any
    /// dispatch (spec.md §4.E).
    pub async fn refresh_browser_pages(&self) -> HashMap<u32, bool> {
        let sessions = self.sessions.read().await;
        let mut results = HashMap::new();
        for (court, session) in sessions.iter() {
            let ok = session
                .page
                .goto(&session.base_url, NavigationWait::DomContentLoaded)
                .await
                .is_ok();
            results.insert(*court, ok);
        }
        results
    }

    /// Courts currently backed by a session that isn't CRITICAL/FAILED.
    pub async fn get_available_courts(&self) -> Vec<u32> {
        let report = self.health_check().await;
        let mut available: Vec<u32> = report
            .courts
            .into_iter()
            .filter(|(_, status)| !matches!(status, HealthStatus::Critical | HealthStatus::Failed))
            .map(|(court, _)| court)
            .collect();
        available.sort_unstable();
        available
    }

    pub async fn health_check(&self) -> HealthReport {
        let sessions = self.sessions.read().await;
        let mut courts = HashMap::new();
        for court in self.courts() {
            let status = match sessions.get(&court) {
                None => HealthStatus::Failed,
                Some(session) => match session.page.current_url().await {
                    Ok(_) => HealthStatus::Healthy,
                    Err(_) => HealthStatus::Critical,
                },
            };
            courts.insert(court, status);
        }
        HealthReport::from_courts(courts)
    }

    /// Acquires the critical-operation flag for the duration of one booking
    /// attempt. While set, background maintenance must not touch sessions.
    pub fn set_critical_operation(&self, flag: bool) {
        self.critical_operation.store(flag, Ordering::SeqCst);
    }

    pub fn is_critical_operation(&self) -> bool {
        self.critical_operation.load(Ordering::SeqCst)
    }

    /// Recycles sessions older than the staleness threshold. No-op while a
    /// critical operation is in flight.
    pub async fn recycle_stale(&self) -> Vec<u32> {
        if self.is_critical_operation() {
            return Vec::new();
        }
        let stale: Vec<u32> = {
            let sessions = self.sessions.read().await;
            sessions
                .values()
                .filter(|s| s.created_at.elapsed() > self.stale_after)
                .map(|s| s.court)
                .collect()
        };
        for &court in &stale {
            info!(court, "recycling stale browser session");
            if let Err(err) = self.recreate_session(court).await {
                warn!(court, %err, "failed to recycle stale session");
            }
        }
        stale
    }

    pub async fn register_emergency_session(&self, page: Arc<dyn Page>, base_url: String) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(EMERGENCY_COURT_ID, Session::new(EMERGENCY_COURT_ID, page, base_url));
    }
}
