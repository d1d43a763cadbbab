//! Find-or-create resolution of academic periods

use crate::retry::StepPolicy;
use crate::single_flight::KeyedLocks;
use crate::{PlannerConfig, PlannerError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use trayecto_domain::{CurriculumBackend, PeriodId, PeriodKey};

/// Resolves a (year, term) to the store's period id, creating it if needed
///
/// Concurrent resolutions of one key inside this process are serialized and
/// resolved ids are memoized for the registry's lifetime. Another process can
/// still race the lookup and create a second period; such duplicates surface
/// on the next load.
pub struct PeriodRegistry<B> {
    backend: Arc<B>,
    policy: StepPolicy,
    locks: KeyedLocks<PeriodKey>,
    resolved: Mutex<HashMap<PeriodKey, PeriodId>>,
}

impl<B: CurriculumBackend> PeriodRegistry<B> {
    /// Create a registry over a backend
    pub fn new(backend: Arc<B>, config: &PlannerConfig) -> Self {
        Self {
            backend,
            policy: StepPolicy::from_config(config),
            locks: KeyedLocks::default(),
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Period id already resolved for `key`, if any
    pub fn cached(&self, key: PeriodKey) -> Option<PeriodId> {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
    }

    /// Look up the period for `key`, creating it when the lookup finds
    /// nothing or fails
    ///
    /// # Errors
    ///
    /// `PeriodResolutionFailed` when neither the lookup nor the create
    /// produced a period.
    pub async fn resolve_period(&self, key: PeriodKey) -> Result<PeriodId, PlannerError> {
        if let Some(id) = self.cached(key) {
            return Ok(id);
        }

        let _flight = self.locks.lock(key).await;
        if let Some(id) = self.cached(key) {
            return Ok(id);
        }

        let backend = &*self.backend;
        let lookup = self
            .policy
            .run("find_period", move || backend.find_period(key))
            .await;

        let lookup_failure = match lookup {
            Ok(Some(period)) => {
                tracing::debug!(%key, period = %period.id, "Found existing period");
                self.remember(key, period.id);
                return Ok(period.id);
            }
            Ok(None) => "not found".to_string(),
            Err(e) => {
                tracing::warn!(%key, error = %e, "Period lookup failed, attempting create");
                e.to_string()
            }
        };

        match self
            .policy
            .run("create_period", move || backend.create_period(key))
            .await
        {
            Ok(period) => {
                tracing::info!(%key, period = %period.id, "Created period");
                self.remember(key, period.id);
                Ok(period.id)
            }
            Err(e) => Err(PlannerError::PeriodResolutionFailed {
                key,
                reason: format!("lookup: {}; create: {}", lookup_failure, e),
            }),
        }
    }

    fn remember(&self, key: PeriodKey, id: PeriodId) {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, id);
    }
}
