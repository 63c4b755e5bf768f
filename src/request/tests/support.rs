//! Shared fixtures for request tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use rust_decimal::Decimal;

use crate::account::{
    adapters::memory::InMemoryAccountRepository,
    domain::{Actor, Profile, Provider, Role, UserId},
    ports::AccountRepository,
};
use crate::distance::domain::GeoPoint;
use crate::pricing::domain::{PriceBreakdown, PriceQuote, QuoteInput};
use crate::request::{
    adapters::{
        BcryptPinHasher, BroadcastChangeFeed,
        memory::{InMemoryFeedbackRepository, InMemoryServiceRequestRepository, RecordingNotifier},
    },
    domain::{PinHash, Place, RequestDraft, RequestPin, ServiceDetails, ServiceType, TowType},
    ports::{PinHashError, PinHasher, TripQuoteError, TripQuoter},
    services::{
        CreatedRequest, FeedbackService, LifecycleDependencies, RequestLifecycleService,
    },
};

pub(super) type Lifecycle = RequestLifecycleService<InMemoryServiceRequestRepository, ShiftedClock>;
pub(super) type Feedback =
    FeedbackService<InMemoryServiceRequestRepository, InMemoryFeedbackRepository, ShiftedClock>;

pub(super) fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).expect("valid coordinate")
}

pub(super) fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

/// Santo Domingo to Los Alcarrizos.
pub(super) fn tow_draft() -> RequestDraft {
    RequestDraft::new(
        ServiceType::Tow,
        Place::new(point(18.4861, -69.9312)).with_address("Av. Winston Churchill"),
    )
    .with_tow(TowType::Light, Place::new(point(18.5300, -70.0100)))
}

pub(super) fn fuel_draft(gallons: u32) -> RequestDraft {
    RequestDraft::new(ServiceType::Fuel, Place::new(point(18.4861, -69.9312)))
        .with_details(ServiceDetails::Fuel { gallons })
}

/// Quoter answering a fixed total, or failing on demand.
#[derive(Debug, Default)]
pub(super) struct StubQuoter {
    total: Mutex<Option<Decimal>>,
}

impl StubQuoter {
    pub(super) fn answering(total: &str) -> Self {
        Self {
            total: Mutex::new(Some(dec(total))),
        }
    }

    pub(super) fn set(&self, total: Option<&str>) {
        *self.total.lock().expect("quoter lock") = total.map(dec);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("pricing unavailable")]
struct PricingUnavailable;

#[async_trait]
impl TripQuoter for StubQuoter {
    async fn quote(&self, input: &QuoteInput) -> Result<PriceQuote, TripQuoteError> {
        let total = *self.total.lock().expect("quoter lock");
        total
            .map(|total| PriceQuote {
                total,
                breakdown: PriceBreakdown::Flat {
                    service_type: input.service_type,
                    base_price: total,
                    extra_fee: Decimal::ZERO,
                    extra_units: 0,
                },
            })
            .ok_or_else(|| TripQuoteError::new(PricingUnavailable))
    }
}

/// Wall clock that tests can push forward.
#[derive(Debug)]
pub(super) struct ShiftedClock {
    offset: Mutex<TimeDelta>,
}

impl ShiftedClock {
    pub(super) const fn new() -> Self {
        Self {
            offset: Mutex::new(TimeDelta::zero()),
        }
    }

    pub(super) fn advance(&self, by: TimeDelta) {
        let mut offset = self.offset.lock().expect("clock lock");
        *offset += by;
    }

    fn offset(&self) -> TimeDelta {
        *self.offset.lock().expect("clock lock")
    }
}

impl Clock for ShiftedClock {
    fn local(&self) -> DateTime<Local> {
        Local::now() + self.offset()
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc::now() + self.offset()
    }
}

/// bcrypt hasher that counts how many guesses reached the hash check.
#[derive(Debug)]
pub(super) struct CountingHasher {
    inner: BcryptPinHasher,
    checks: AtomicUsize,
}

impl CountingHasher {
    fn new() -> Self {
        Self {
            inner: BcryptPinHasher::new(4),
            checks: AtomicUsize::new(0),
        }
    }

    pub(super) fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl PinHasher for CountingHasher {
    fn hash(&self, pin: &RequestPin) -> Result<PinHash, PinHashError> {
        self.inner.hash(pin)
    }

    fn verify(&self, pin: &RequestPin, hash: &PinHash) -> Result<bool, PinHashError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(pin, hash)
    }
}

pub(super) struct Harness {
    pub(super) lifecycle: Lifecycle,
    pub(super) feedback: Feedback,
    pub(super) requests: Arc<InMemoryServiceRequestRepository>,
    pub(super) feedback_store: Arc<InMemoryFeedbackRepository>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) feed: Arc<BroadcastChangeFeed>,
    pub(super) quoter: Arc<StubQuoter>,
    pub(super) hasher: Arc<CountingHasher>,
    pub(super) clock: Arc<ShiftedClock>,
    pub(super) user: Actor,
    pub(super) operator: Actor,
    pub(super) rival: Actor,
    pub(super) admin: Actor,
}

impl Harness {
    pub(super) async fn new() -> Self {
        let clock = Arc::new(ShiftedClock::new());
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let provider = Provider::new("Grúas del Este", &DefaultClock).expect("provider");
        accounts.store_provider(&provider).await.expect("store provider");

        let user = Actor::user(UserId::new());
        let operator = Actor::operator(UserId::new(), provider.id());
        let rival = Actor::operator(UserId::new(), provider.id());
        for (actor, name) in [(user, "Ana"), (operator, "Luis"), (rival, "Ramón")] {
            let profile = Profile::new(
                actor.user_id(),
                name,
                actor.role(),
                actor.provider_id(),
                &DefaultClock,
            )
            .expect("profile")
            .with_phone("809-555-0100");
            accounts.store_profile(&profile).await.expect("store profile");
        }

        let requests = Arc::new(InMemoryServiceRequestRepository::new());
        let feedback_store = Arc::new(InMemoryFeedbackRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let feed = Arc::new(BroadcastChangeFeed::default());
        let quoter = Arc::new(StubQuoter::answering("97.50"));
        let hasher = Arc::new(CountingHasher::new());
        let lifecycle = RequestLifecycleService::new(
            Arc::clone(&requests),
            LifecycleDependencies {
                accounts,
                quoter: Arc::clone(&quoter) as Arc<dyn TripQuoter>,
                hasher: Arc::clone(&hasher) as Arc<dyn PinHasher>,
                notifier: Arc::clone(&notifier) as _,
                publisher: Arc::clone(&feed) as _,
            },
            Arc::clone(&clock),
        );
        let feedback = FeedbackService::new(
            Arc::clone(&requests),
            Arc::clone(&feedback_store),
            Arc::clone(&feed) as _,
            Arc::clone(&clock),
        );
        Self {
            lifecycle,
            feedback,
            requests,
            feedback_store,
            notifier,
            feed,
            quoter,
            hasher,
            clock,
            user,
            operator,
            rival,
            admin: Actor::new(UserId::new(), Role::Admin, None),
        }
    }

    pub(super) async fn created(&self) -> CreatedRequest {
        self.lifecycle
            .create_request(&self.user, tow_draft())
            .await
            .expect("create request")
    }

    /// Drives a fresh tow request to `en_route`.
    pub(super) async fn en_route(&self) -> CreatedRequest {
        let created = self.created().await;
        let id = created.request.id();
        self.lifecycle.accept(&self.operator, id).await.expect("accept");
        self.lifecycle
            .confirm_departure(&self.operator, id)
            .await
            .expect("depart");
        created
    }

    /// Drives a fresh tow request to `completed`.
    pub(super) async fn completed(&self) -> CreatedRequest {
        let created = self.en_route().await;
        let id = created.request.id();
        let valid = self
            .lifecycle
            .verify_pin(&self.operator, id, created.pin.expose())
            .await
            .expect("verify");
        assert!(valid);
        self.lifecycle.complete(&self.operator, id).await.expect("complete");
        created
    }
}
