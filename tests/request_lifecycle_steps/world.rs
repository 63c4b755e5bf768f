//! Shared world state for request lifecycle scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use rstest::fixture;
use towline::account::{
    domain::{Actor, UserId},
    services::RegisterProfileRequest,
};
use towline::client::{
    ClaimOutcome, ClientError, CreatedRequest, DispatchBackend, LocalBackend, MemoryPinStore,
    OperatorSession, UserSession,
};
use towline::dispatch::{Dispatch, DispatchIntegrations, DispatchSettings, DispatchStores};
use towline::distance::domain::GeoPoint;
use towline::request::domain::{Place, RequestDraft, ServiceType, TowType};

/// Services plus one customer and two operators of the same fleet.
pub struct Cast {
    pub customer: UserSession,
    pub customer_backend: Arc<dyn DispatchBackend>,
    pub operators: HashMap<String, OperatorSession>,
}

impl Cast {
    async fn assemble() -> Result<Self, eyre::Report> {
        let dispatch = Arc::new(Dispatch::new(
            DispatchStores::in_memory(),
            DispatchIntegrations::offline(4)?,
            DispatchSettings::default(),
        ));
        let provider = dispatch.accounts.register_provider("Grúas del Este").await?;

        let customer = Actor::user(UserId::new());
        let mut actors = vec![("Ana".to_owned(), customer)];
        for name in ["Luis", "Ramón"] {
            actors.push((name.to_owned(), Actor::operator(UserId::new(), provider.id())));
        }
        for (name, actor) in &actors {
            dispatch
                .accounts
                .register_profile(
                    RegisterProfileRequest::new(actor.user_id(), name.as_str())
                        .with_role(actor.role(), actor.provider_id()),
                )
                .await?;
        }

        let customer_backend: Arc<dyn DispatchBackend> =
            Arc::new(LocalBackend::new(Arc::clone(&dispatch), customer));
        let operators = actors
            .into_iter()
            .skip(1)
            .map(|(name, actor)| {
                let backend = Arc::new(LocalBackend::new(Arc::clone(&dispatch), actor));
                (name, OperatorSession::new(backend))
            })
            .collect();
        Ok(Self {
            customer: UserSession::new(
                Arc::clone(&customer_backend),
                Arc::new(MemoryPinStore::new()),
            ),
            customer_backend,
            operators,
        })
    }

    /// Looks up an operator session by display name.
    pub fn operator(&self, name: &str) -> Result<&OperatorSession, eyre::Report> {
        self.operators
            .get(name)
            .ok_or_else(|| eyre::eyre!("no operator named {name} in the scenario"))
    }
}

/// Scenario world for lifecycle behaviour tests.
#[derive(Default)]
pub struct LifecycleWorld {
    pub cast: Option<Cast>,
    pub created: Option<CreatedRequest>,
    pub claims: HashMap<String, Result<ClaimOutcome, ClientError>>,
    pub last_error: Option<ClientError>,
    pub last_verification: Option<Result<bool, ClientError>>,
}

impl LifecycleWorld {
    /// Builds the services and accounts on first use.
    pub fn ensure_cast(&mut self) -> Result<&Cast, eyre::Report> {
        if self.cast.is_none() {
            self.cast = Some(run_async(Cast::assemble())?);
        }
        self.cast()
    }

    pub fn cast(&self) -> Result<&Cast, eyre::Report> {
        self.cast
            .as_ref()
            .ok_or_else(|| eyre::eyre!("scenario cast not assembled"))
    }

    pub fn created(&self) -> Result<&CreatedRequest, eyre::Report> {
        self.created
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing created request in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Santo Domingo to Los Alcarrizos.
pub fn light_tow() -> Result<RequestDraft, eyre::Report> {
    let pickup = GeoPoint::new(18.4861, -69.9312)?;
    let dropoff = GeoPoint::new(18.5300, -70.0100)?;
    Ok(
        RequestDraft::new(ServiceType::Tow, Place::new(pickup).with_address("Av. Winston Churchill"))
            .with_tow(TowType::Light, Place::new(dropoff)),
    )
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
