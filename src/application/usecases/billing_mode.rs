use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, error, info, warn};

use crate::domain::{
    repositories::platform_settings::{BILLING_MODE_KEY, PlatformSettingsRepository},
    value_objects::enums::billing_modes::BillingMode,
};

pub const BILLING_MODE_TTL: Duration = Duration::from_secs(60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Source of the platform-wide billing mode used by the billing usecases.
#[automock]
#[async_trait]
pub trait BillingModeSource: Send + Sync {
    async fn current_mode(&self) -> Result<BillingMode>;
}

#[derive(Debug, Clone, Copy)]
struct CachedMode {
    mode: BillingMode,
    loaded_at: Instant,
}

/// Process-wide billing mode, read from `platform_settings` at most once per TTL.
/// Readers may see a value up to `BILLING_MODE_TTL` old; `set_mode` invalidates.
pub struct BillingModeCache<R, C = MonotonicClock>
where
    R: PlatformSettingsRepository + Send + Sync + 'static,
    C: Clock,
{
    settings_repo: Arc<R>,
    clock: C,
    ttl: Duration,
    cached: Mutex<Option<CachedMode>>,
}

impl<R> BillingModeCache<R, MonotonicClock>
where
    R: PlatformSettingsRepository + Send + Sync + 'static,
{
    pub fn new(settings_repo: Arc<R>) -> Self {
        Self::with_clock(settings_repo, MonotonicClock, BILLING_MODE_TTL)
    }
}

impl<R, C> BillingModeCache<R, C>
where
    R: PlatformSettingsRepository + Send + Sync + 'static,
    C: Clock,
{
    pub fn with_clock(settings_repo: Arc<R>, clock: C, ttl: Duration) -> Self {
        Self {
            settings_repo,
            clock,
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Result<BillingMode> {
        let now = self.clock.now();
        if let Some(cached) = self.fresh_entry(now)? {
            return Ok(cached);
        }

        let stored = self
            .settings_repo
            .find_value(BILLING_MODE_KEY)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "billing_mode: failed to load billing mode setting");
                err
            })?;

        let mode = match stored.as_deref() {
            Some(raw) => BillingMode::from_str(raw).unwrap_or_else(|| {
                warn!(value = raw, "billing_mode: unknown stored value, using test mode");
                BillingMode::Test
            }),
            None => BillingMode::Test,
        };

        debug!(mode = %mode, "billing_mode: cache refreshed");
        *self.lock()? = Some(CachedMode {
            mode,
            loaded_at: now,
        });

        Ok(mode)
    }

    pub fn invalidate(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }

    pub async fn set_mode(&self, mode: BillingMode) -> Result<()> {
        self.settings_repo
            .upsert_value(BILLING_MODE_KEY, mode.as_str())
            .await
            .map_err(|err| {
                error!(mode = %mode, db_error = ?err, "billing_mode: failed to store billing mode");
                err
            })?;
        self.invalidate()?;

        info!(mode = %mode, "billing_mode: billing mode changed");
        Ok(())
    }

    fn fresh_entry(&self, now: Instant) -> Result<Option<BillingMode>> {
        let cached = *self.lock()?;
        Ok(cached
            .filter(|cached| now.saturating_duration_since(cached.loaded_at) < self.ttl)
            .map(|cached| cached.mode))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<CachedMode>>> {
        self.cached
            .lock()
            .map_err(|_| anyhow!("billing mode cache lock poisoned"))
    }
}

#[async_trait]
impl<R, C> BillingModeSource for BillingModeCache<R, C>
where
    R: PlatformSettingsRepository + Send + Sync + 'static,
    C: Clock,
{
    async fn current_mode(&self) -> Result<BillingMode> {
        self.get().await
    }
}
