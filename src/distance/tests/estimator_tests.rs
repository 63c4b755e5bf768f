//! Unit tests for the distance estimator's provider, fallback, and cache paths.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use crate::distance::{
    adapters::cache::InMemoryDistanceCache,
    domain::{
        DistanceError, DistanceEstimate, EstimateMode, GeoPoint, ROAD_CORRECTION_FACTOR,
        TripPolicy, haversine_km,
    },
    ports::{MockRouteProvider, RouteMeasurement, RouteProvider, RouteProviderError},
    services::{DistanceEstimator, EstimatorPolicy},
};

struct Trip {
    origin: GeoPoint,
    destination: GeoPoint,
}

#[fixture]
fn trip() -> Trip {
    let origin = GeoPoint::new(18.4861, -69.9312);
    let destination = GeoPoint::new(18.5601, -69.8765);
    match (origin, destination) {
        (Ok(origin_point), Ok(destination_point)) => Trip {
            origin: origin_point,
            destination: destination_point,
        },
        _ => panic!("fixture coordinates must be valid"),
    }
}

fn estimator(
    provider: impl RouteProvider + 'static,
    cache: &InMemoryDistanceCache,
) -> DistanceEstimator {
    DistanceEstimator::new(
        Arc::new(provider),
        Arc::new(cache.clone()),
        EstimatorPolicy {
            trip: TripPolicy::default(),
            provider_timeout: Duration::from_millis(100),
        },
    )
}

struct SlowProvider;

#[async_trait]
impl RouteProvider for SlowProvider {
    async fn measure(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
        _mode: EstimateMode,
    ) -> Result<RouteMeasurement, RouteProviderError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(RouteMeasurement {
            distance_km: 1.0,
            duration_minutes: 1.0,
        })
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provider_measurement_is_returned_and_cached(trip: Trip) -> eyre::Result<()> {
    let mut provider = MockRouteProvider::new();
    provider
        .expect_measure()
        .with(
            eq(trip.origin),
            eq(trip.destination),
            eq(EstimateMode::TripPlanning),
        )
        .times(1)
        .returning(|_, _, _| {
            Ok(RouteMeasurement {
                distance_km: 11.4,
                duration_minutes: 19.0,
            })
        });
    let cache = InMemoryDistanceCache::new();
    let service = estimator(provider, &cache);

    let first = service.trip_distance(trip.origin, trip.destination).await?;
    let second = service.trip_distance(trip.origin, trip.destination).await?;

    eyre::ensure!(first == DistanceEstimate::measured(11.4, 19.0, EstimateMode::TripPlanning));
    eyre::ensure!(second == first, "second lookup must come from the cache");
    eyre::ensure!(cache.len() == 1);
    Ok(())
}

#[rstest]
#[case(RouteProviderError::NotConfigured)]
#[case(RouteProviderError::Transport("connection refused".to_owned()))]
#[case(RouteProviderError::Status("ZERO_RESULTS".to_owned()))]
#[tokio::test(flavor = "multi_thread")]
async fn provider_failure_yields_tagged_fallback(
    trip: Trip,
    #[case] failure: RouteProviderError,
) -> eyre::Result<()> {
    let mut provider = MockRouteProvider::new();
    provider
        .expect_measure()
        .times(2)
        .returning(move |_, _, _| Err(failure.clone()));
    let cache = InMemoryDistanceCache::new();
    let service = estimator(provider, &cache);

    let estimate = service.eta(trip.origin, trip.destination).await?;
    let expected_km = haversine_km(trip.origin, trip.destination) * ROAD_CORRECTION_FACTOR;

    eyre::ensure!(estimate.is_fallback);
    eyre::ensure!((estimate.distance_km - expected_km).abs() < 1e-9);
    eyre::ensure!(cache.is_empty(), "fallback results must not be cached");

    // The provider is consulted again because nothing was cached.
    service.eta(trip.origin, trip.destination).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_provider_is_cut_off_by_the_timeout(trip: Trip) -> eyre::Result<()> {
    let cache = InMemoryDistanceCache::new();
    let service = estimator(SlowProvider, &cache);

    let started = tokio::time::Instant::now();
    let estimate = service.eta(trip.origin, trip.destination).await?;

    eyre::ensure!(estimate.is_fallback);
    eyre::ensure!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn validation_errors_never_reach_the_provider(trip: Trip) -> eyre::Result<()> {
    let mut provider = MockRouteProvider::new();
    provider.expect_measure().never();
    let cache = InMemoryDistanceCache::new();
    let service = estimator(provider, &cache);

    let result = service.trip_distance(trip.origin, trip.origin).await;

    eyre::ensure!(matches!(result, Err(DistanceError::TooClose { .. })));
    Ok(())
}
