//! Google Distance Matrix route provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::distance::{
    domain::{EstimateMode, GeoPoint},
    ports::{RouteMeasurement, RouteProvider, RouteProviderError},
};

const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Route provider calling the Google Distance Matrix JSON API.
///
/// Trip-planning lookups are plain driving distance requests. ETA lookups
/// add `departure_time=now` and `traffic_model=best_guess` and prefer the
/// traffic-aware duration when the response carries one.
#[derive(Debug, Clone)]
pub struct GoogleDistanceMatrixProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GoogleDistanceMatrixProvider {
    /// Creates a provider with a per-request HTTP timeout.
    ///
    /// A missing API key is allowed; every lookup then reports
    /// [`RouteProviderError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`RouteProviderError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, RouteProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RouteProviderError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        })
    }

    /// Points the provider at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
    duration_in_traffic: Option<MatrixValue>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct MatrixValue {
    value: f64,
}

fn format_point(point: GeoPoint) -> String {
    format!("{},{}", point.lat(), point.lng())
}

#[async_trait]
impl RouteProvider for GoogleDistanceMatrixProvider {
    async fn measure(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: EstimateMode,
    ) -> Result<RouteMeasurement, RouteProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(RouteProviderError::NotConfigured);
        };

        let mut params = vec![
            ("origins", format_point(origin)),
            ("destinations", format_point(destination)),
            ("mode", "driving".to_owned()),
            ("units", "metric".to_owned()),
            ("key", api_key.to_owned()),
        ];
        if mode == EstimateMode::TrafficEta {
            params.push(("departure_time", "now".to_owned()));
            params.push(("traffic_model", "best_guess".to_owned()));
        }

        debug!(%mode, "requesting distance matrix");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| RouteProviderError::Transport(err.without_url().to_string()))?;
        let body = response
            .json::<MatrixResponse>()
            .await
            .map_err(|err| RouteProviderError::Malformed(err.to_string()))?;

        measurement_from(body, mode)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "unit conversion from meters and seconds"
)]
fn measurement_from(
    body: MatrixResponse,
    mode: EstimateMode,
) -> Result<RouteMeasurement, RouteProviderError> {
    if body.status != "OK" {
        return Err(RouteProviderError::Status(body.status));
    }
    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| RouteProviderError::Malformed("empty distance matrix".to_owned()))?;
    if element.status != "OK" {
        return Err(RouteProviderError::Status(element.status));
    }

    let distance = element
        .distance
        .ok_or_else(|| RouteProviderError::Malformed("element without distance".to_owned()))?;
    let duration = match mode {
        EstimateMode::TrafficEta => element.duration_in_traffic.or(element.duration),
        EstimateMode::TripPlanning => element.duration,
    }
    .ok_or_else(|| RouteProviderError::Malformed("element without duration".to_owned()))?;

    if !(distance.value.is_finite() && duration.value.is_finite())
        || distance.value < 0.0
        || duration.value < 0.0
    {
        return Err(RouteProviderError::Malformed(
            "negative or non-finite route values".to_owned(),
        ));
    }

    Ok(RouteMeasurement {
        distance_km: distance.value / 1000.0,
        duration_minutes: duration.value / 60.0,
    })
}

#[cfg(test)]
mod tests {
    //! Tests for distance matrix response interpretation.

    use super::{MatrixResponse, measurement_from};
    use crate::distance::{domain::EstimateMode, ports::RouteProviderError};
    use rstest::rstest;

    fn parse(json: &str) -> eyre::Result<MatrixResponse> {
        Ok(serde_json::from_str(json)?)
    }

    #[rstest]
    fn eta_prefers_traffic_duration() -> eyre::Result<()> {
        let body = parse(
            r#"{"status":"OK","rows":[{"elements":[{"status":"OK",
                "distance":{"value":12500},"duration":{"value":900},
                "duration_in_traffic":{"value":1500}}]}]}"#,
        )?;

        let measured = measurement_from(body, EstimateMode::TrafficEta)?;

        eyre::ensure!((measured.distance_km - 12.5).abs() < 1e-9);
        eyre::ensure!((measured.duration_minutes - 25.0).abs() < 1e-9);
        Ok(())
    }

    #[rstest]
    fn trip_planning_ignores_traffic_duration() -> eyre::Result<()> {
        let body = parse(
            r#"{"status":"OK","rows":[{"elements":[{"status":"OK",
                "distance":{"value":40000},"duration":{"value":3600},
                "duration_in_traffic":{"value":5400}}]}]}"#,
        )?;

        let measured = measurement_from(body, EstimateMode::TripPlanning)?;

        eyre::ensure!((measured.duration_minutes - 60.0).abs() < 1e-9);
        Ok(())
    }

    #[rstest]
    #[case(r#"{"status":"REQUEST_DENIED","rows":[]}"#, "REQUEST_DENIED")]
    #[case(
        r#"{"status":"OK","rows":[{"elements":[{"status":"ZERO_RESULTS"}]}]}"#,
        "ZERO_RESULTS"
    )]
    fn non_ok_status_is_an_error(#[case] json: &str, #[case] status: &str) -> eyre::Result<()> {
        let result = measurement_from(parse(json)?, EstimateMode::TripPlanning);
        eyre::ensure!(result == Err(RouteProviderError::Status(status.to_owned())));
        Ok(())
    }
}
