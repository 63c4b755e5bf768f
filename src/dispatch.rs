//! Composition root wiring repositories, integrations, and services.
//!
//! [`Dispatch`] owns one instance of every service, built over trait-object
//! repositories so the same wiring serves the in-memory and `PostgreSQL`
//! backends. The RPC layer and the in-process client both talk to it.

use crate::account::{
    adapters::{memory::InMemoryAccountRepository, postgres::PostgresAccountRepository},
    ports::AccountRepository,
    services::AccountService,
};
use crate::config::DispatchConfig;
use crate::distance::{
    adapters::{
        GoogleDistanceMatrixProvider,
        cache::{FileDistanceCache, InMemoryDistanceCache, TieredDistanceCache},
    },
    ports::{DistanceCache, DistanceCacheError, RouteProvider, RouteProviderError},
    services::{DistanceEstimator, EstimatorPolicy},
};
use crate::persistence::DispatchPgPool;
use crate::presence::{
    adapters::{memory::InMemoryPresenceRepository, postgres::PostgresPresenceRepository},
    ports::PresenceRepository,
    services::PresenceService,
};
use crate::pricing::{
    adapters::{memory::InMemoryPricingRepository, postgres::PostgresPricingRepository},
    ports::PricingRepository,
    services::PricingService,
};
use crate::request::{
    adapters::{
        BcryptPinHasher, BroadcastChangeFeed, LoggingNotifier, WebhookNotifier,
        memory::{InMemoryFeedbackRepository, InMemoryServiceRequestRepository},
        postgres::{PostgresFeedbackRepository, PostgresServiceRequestRepository},
    },
    domain::PinPolicy,
    ports::{FeedbackRepository, NotifierError, PinHasher, PushNotifier, ServiceRequestRepository},
    services::{
        FeedbackService, LifecycleDependencies, LifecyclePolicy, OversightService,
        RequestLifecycleService,
    },
};
use chrono::TimeDelta;
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Account administration over a boxed repository.
pub type DispatchAccounts = AccountService<dyn AccountRepository, DefaultClock>;
/// Pricing over a boxed repository.
pub type DispatchPricing = PricingService<dyn PricingRepository, DefaultClock>;
/// Request lifecycle over a boxed repository.
pub type DispatchLifecycle = RequestLifecycleService<dyn ServiceRequestRepository, DefaultClock>;
/// Ratings and chat over boxed repositories.
pub type DispatchFeedback =
    FeedbackService<dyn ServiceRequestRepository, dyn FeedbackRepository, DefaultClock>;
/// Statistics over boxed repositories.
pub type DispatchOversight = OversightService<dyn ServiceRequestRepository, dyn FeedbackRepository>;
/// Presence over a boxed repository.
pub type DispatchPresence = PresenceService<dyn PresenceRepository, DefaultClock>;

/// Errors raised while assembling a [`Dispatch`] from configuration.
#[derive(Debug, Error)]
pub enum DispatchBuildError {
    /// The route provider's HTTP client could not be built.
    #[error(transparent)]
    RouteProvider(#[from] RouteProviderError),
    /// The durable distance cache could not be opened.
    #[error(transparent)]
    DistanceCache(#[from] DistanceCacheError),
    /// The push webhook client could not be built.
    #[error(transparent)]
    Notifier(#[from] NotifierError),
    /// The database pool could not be created.
    #[error("database pool: {0}")]
    Database(String),
}

/// The persistence half of the wiring.
#[derive(Clone)]
pub struct DispatchStores {
    /// Profiles and providers.
    pub accounts: Arc<dyn AccountRepository>,
    /// Requests, events, and PIN state.
    pub requests: Arc<dyn ServiceRequestRepository>,
    /// Ratings and messages.
    pub feedback: Arc<dyn FeedbackRepository>,
    /// Pricing rules and rates.
    pub pricing: Arc<dyn PricingRepository>,
    /// Operator locations.
    pub presence: Arc<dyn PresenceRepository>,
}

impl DispatchStores {
    /// In-memory stores for tests and local runs.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            requests: Arc::new(InMemoryServiceRequestRepository::new()),
            feedback: Arc::new(InMemoryFeedbackRepository::new()),
            pricing: Arc::new(InMemoryPricingRepository::new()),
            presence: Arc::new(InMemoryPresenceRepository::new()),
        }
    }

    /// `PostgreSQL` stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &DispatchPgPool) -> Self {
        Self {
            accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
            requests: Arc::new(PostgresServiceRequestRepository::new(pool.clone())),
            feedback: Arc::new(PostgresFeedbackRepository::new(pool.clone())),
            pricing: Arc::new(PostgresPricingRepository::new(pool.clone())),
            presence: Arc::new(PostgresPresenceRepository::new(pool.clone())),
        }
    }
}

/// External collaborators.
#[derive(Clone)]
pub struct DispatchIntegrations {
    /// Road distance provider.
    pub route_provider: Arc<dyn RouteProvider>,
    /// Estimate cache.
    pub distance_cache: Arc<dyn DistanceCache>,
    /// Push delivery.
    pub notifier: Arc<dyn PushNotifier>,
    /// PIN hashing.
    pub pin_hasher: Arc<dyn PinHasher>,
}

impl DispatchIntegrations {
    /// Integrations that never leave the process: an unconfigured route
    /// provider (every estimate falls back), an in-memory cache, logged
    /// notifications, and the given bcrypt cost.
    ///
    /// # Errors
    ///
    /// Returns [`RouteProviderError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn offline(pin_hash_cost: u32) -> Result<Self, RouteProviderError> {
        Ok(Self {
            route_provider: Arc::new(GoogleDistanceMatrixProvider::new(
                None,
                Duration::from_secs(1),
            )?),
            distance_cache: Arc::new(InMemoryDistanceCache::new()),
            notifier: Arc::new(LoggingNotifier),
            pin_hasher: Arc::new(BcryptPinHasher::new(pin_hash_cost)),
        })
    }
}

/// Tunables gathered from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchSettings {
    /// Distance validation and provider timeout.
    pub estimator: EstimatorPolicy,
    /// PIN limits and service area for requests.
    pub lifecycle: LifecyclePolicy,
    /// Age after which online locations are stale.
    pub presence_stale_after: TimeDelta,
    /// Change feed buffer per subscriber.
    pub feed_capacity: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            estimator: EstimatorPolicy::default(),
            lifecycle: LifecyclePolicy::default(),
            presence_stale_after: TimeDelta::seconds(60),
            feed_capacity: 256,
        }
    }
}

impl DispatchSettings {
    /// Derives settings from process configuration.
    #[must_use]
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            estimator: EstimatorPolicy {
                trip: config.trip,
                provider_timeout: config.distance_timeout,
            },
            lifecycle: LifecyclePolicy {
                pin: PinPolicy {
                    max_attempts: config.pin_max_attempts,
                    lockout: config.pin_lockout,
                },
                service_area: config.trip.service_area,
            },
            presence_stale_after: config.presence_stale_after,
            ..Self::default()
        }
    }
}

/// Every dispatch service, wired together.
#[derive(Clone)]
pub struct Dispatch {
    /// Account administration.
    pub accounts: Arc<DispatchAccounts>,
    /// Pricing rules and quotes.
    pub pricing: Arc<DispatchPricing>,
    /// Request lifecycle.
    pub lifecycle: Arc<DispatchLifecycle>,
    /// Ratings and chat.
    pub feedback: Arc<DispatchFeedback>,
    /// Aggregate statistics.
    pub oversight: Arc<DispatchOversight>,
    /// Operator presence.
    pub presence: Arc<DispatchPresence>,
    /// Distance and ETA estimation.
    pub estimator: Arc<DistanceEstimator>,
    /// Change cues for subscribers.
    pub feed: Arc<BroadcastChangeFeed>,
}

impl Dispatch {
    /// Wires services over `stores` and `integrations`.
    #[must_use]
    pub fn new(
        stores: DispatchStores,
        integrations: DispatchIntegrations,
        settings: DispatchSettings,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        let feed = Arc::new(BroadcastChangeFeed::new(settings.feed_capacity));
        let estimator = Arc::new(DistanceEstimator::new(
            integrations.route_provider,
            integrations.distance_cache,
            settings.estimator,
        ));
        let pricing = Arc::new(PricingService::new(
            Arc::clone(&stores.pricing),
            Arc::clone(&estimator),
            Arc::clone(&clock),
        ));
        let lifecycle = RequestLifecycleService::new(
            Arc::clone(&stores.requests),
            LifecycleDependencies {
                accounts: Arc::clone(&stores.accounts),
                quoter: Arc::clone(&pricing) as _,
                hasher: integrations.pin_hasher,
                notifier: integrations.notifier,
                publisher: Arc::clone(&feed) as _,
            },
            Arc::clone(&clock),
        )
        .with_policy(settings.lifecycle);
        let feedback = FeedbackService::new(
            Arc::clone(&stores.requests),
            Arc::clone(&stores.feedback),
            Arc::clone(&feed) as _,
            Arc::clone(&clock),
        );
        let presence = PresenceService::new(Arc::clone(&stores.presence), Arc::clone(&clock))
            .with_stale_after(settings.presence_stale_after);

        Self {
            accounts: Arc::new(AccountService::new(stores.accounts, clock)),
            pricing,
            lifecycle: Arc::new(lifecycle),
            feedback: Arc::new(feedback),
            oversight: Arc::new(OversightService::new(stores.requests, stores.feedback)),
            presence: Arc::new(presence),
            estimator,
            feed,
        }
    }

    /// Builds the production wiring described by `config`.
    ///
    /// `PostgreSQL` is used when a database URL is configured, in-memory
    /// stores otherwise. The distance cache gains a durable file tier when a
    /// cache directory is configured.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchBuildError`] when a pool, HTTP client, or cache
    /// directory cannot be opened.
    pub fn from_config(config: &DispatchConfig) -> Result<Self, DispatchBuildError> {
        let stores = match config.database_url.as_deref() {
            Some(url) => {
                let pool = crate::persistence::build_pool(url, 10)
                    .map_err(|err| DispatchBuildError::Database(err.to_string()))?;
                DispatchStores::postgres(&pool)
            }
            None => DispatchStores::in_memory(),
        };

        let fast: Arc<dyn DistanceCache> = Arc::new(InMemoryDistanceCache::new());
        let distance_cache: Arc<dyn DistanceCache> = match config.distance_cache_dir.as_deref() {
            Some(dir) => Arc::new(TieredDistanceCache::new(
                fast,
                Arc::new(FileDistanceCache::open(dir)?),
            )),
            None => fast,
        };
        let notifier: Arc<dyn PushNotifier> = match config.push_webhook_url.as_deref() {
            Some(url) => Arc::new(WebhookNotifier::new(url, config.distance_timeout)?),
            None => Arc::new(LoggingNotifier),
        };
        let integrations = DispatchIntegrations {
            route_provider: Arc::new(GoogleDistanceMatrixProvider::new(
                config.distance_api_key.clone(),
                config.distance_timeout,
            )?),
            distance_cache,
            notifier,
            pin_hasher: Arc::new(BcryptPinHasher::new(config.pin_hash_cost)),
        };
        Ok(Self::new(
            stores,
            integrations,
            DispatchSettings::from_config(config),
        ))
    }
}
