//! Process configuration read from the environment.
//!
//! `.env` is loaded first when present; real environment variables win.
//! Every value except `JWT_SECRET` has a default. Parse failures are
//! reported as [`ConfigError`] naming the offending variable.

use crate::distance::domain::{BoundingBox, DistanceError, TripPolicy};
use camino::Utf8PathBuf;
use chrono::TimeDelta;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Longest lockout or staleness window accepted, thirty days.
pub const MAX_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} must be set")]
    Missing(&'static str),
    /// A variable could not be parsed.
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A `.env` file exists but could not be read.
    #[error("failed to load .env: {0}")]
    DotEnv(String),
    /// `SERVICE_AREA` does not describe a valid box.
    #[error("SERVICE_AREA is invalid: {0}")]
    ServiceArea(#[from] DistanceError),
}

/// Fully resolved process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// `PostgreSQL` URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Distance provider API key.
    pub distance_api_key: Option<String>,
    /// Upper bound on one provider call.
    pub distance_timeout: Duration,
    /// Directory for the durable distance cache.
    pub distance_cache_dir: Option<Utf8PathBuf>,
    /// Area and minimum-length rules for trips.
    pub trip: TripPolicy,
    /// Wrong PINs allowed before lockout.
    pub pin_max_attempts: u32,
    /// How long a PIN lockout lasts.
    pub pin_lockout: TimeDelta,
    /// bcrypt cost for PIN hashes.
    pub pin_hash_cost: u32,
    /// Age after which an online location is stale.
    pub presence_stale_after: TimeDelta,
    /// Endpoint receiving push notifications as JSON; logged only when unset.
    pub push_webhook_url: Option<String>,
    /// Upper bound on handling one RPC.
    pub request_timeout: Duration,
    /// RPCs handled at once before callers queue.
    pub max_concurrent_requests: usize,
}

impl DispatchConfig {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing secret or unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigError::DotEnv(err.to_string())),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing secret or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup: &lookup };
        let defaults = TripPolicy::default();
        let service_area = vars
            .get("SERVICE_AREA")
            .map(|raw| parse_service_area(&raw))
            .transpose()?
            .unwrap_or(defaults.service_area);
        let min_trip_meters = vars.parse_or("MIN_TRIP_METERS", defaults.min_trip_meters)?;
        if !(min_trip_meters.is_finite() && min_trip_meters >= 0.0) {
            return Err(ConfigError::Invalid {
                name: "MIN_TRIP_METERS",
                value: min_trip_meters.to_string(),
                reason: "must be a non-negative number".to_owned(),
            });
        }

        Ok(Self {
            database_url: vars.get("DATABASE_URL"),
            bind_addr: vars.parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            jwt_secret: vars.get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            distance_api_key: vars.get("DISTANCE_API_KEY"),
            distance_timeout: Duration::from_secs(vars.parse_or("DISTANCE_TIMEOUT_SECS", 10)?),
            distance_cache_dir: vars.get("DISTANCE_CACHE_DIR").map(Utf8PathBuf::from),
            trip: TripPolicy {
                service_area,
                min_trip_meters,
            },
            pin_max_attempts: vars.parse_or("PIN_MAX_ATTEMPTS", 5)?,
            pin_lockout: vars.window_or("PIN_LOCKOUT_SECS", 900)?,
            pin_hash_cost: vars.parse_or("PIN_HASH_COST", 10)?,
            presence_stale_after: vars.window_or("PRESENCE_STALE_SECS", 60)?,
            push_webhook_url: vars.get("PUSH_WEBHOOK_URL"),
            request_timeout: Duration::from_secs(vars.parse_or("REQUEST_TIMEOUT_SECS", 30)?),
            max_concurrent_requests: vars.parse_or("MAX_CONCURRENT_REQUESTS", 1024)?,
        })
    }

    /// Builds configuration from a fixed map, for tests and embedding.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing secret or unparsable values.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|raw| raw.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name).map_or(Ok(default), |raw| {
            raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
                name,
                reason: err.to_string(),
                value: raw,
            })
        })
    }

    /// Reads a whole number of seconds no longer than [`MAX_WINDOW_SECS`].
    fn window_or(&self, name: &'static str, default: i64) -> Result<TimeDelta, ConfigError> {
        let seconds = self.parse_or(name, default)?;
        (0..=MAX_WINDOW_SECS)
            .contains(&seconds)
            .then(|| TimeDelta::try_seconds(seconds))
            .flatten()
            .ok_or_else(|| ConfigError::Invalid {
                name,
                value: seconds.to_string(),
                reason: format!("must be between 0 and {MAX_WINDOW_SECS} seconds"),
            })
    }
}

fn parse_service_area(raw: &str) -> Result<BoundingBox, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "SERVICE_AREA",
        value: raw.to_owned(),
        reason: reason.to_owned(),
    };
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| invalid(&err.to_string()))?;
    let [min_lat, max_lat, min_lng, max_lng] = parts.as_slice() else {
        return Err(invalid("expected min_lat,max_lat,min_lng,max_lng"));
    };
    Ok(BoundingBox::new(*min_lat, *max_lat, *min_lng, *max_lng)?)
}

#[cfg(test)]
mod tests {
    //! Tests for environment parsing.

    use super::{ConfigError, DispatchConfig};
    use rstest::rstest;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_only_secret_is_set() -> eyre::Result<()> {
        let config = DispatchConfig::from_map(&vars(&[("JWT_SECRET", "s3cret")]))?;

        eyre::ensure!(config.bind_addr.port() == 8080);
        eyre::ensure!(config.database_url.is_none());
        eyre::ensure!(config.pin_max_attempts == 5);
        eyre::ensure!(config.pin_lockout.num_seconds() == 900);
        eyre::ensure!(config.distance_timeout.as_secs() == 10);
        eyre::ensure!(config.request_timeout.as_secs() == 30);
        eyre::ensure!(config.push_webhook_url.is_none());
        eyre::ensure!((config.trip.min_trip_meters - 500.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[rstest]
    fn missing_secret_is_reported() {
        assert_eq!(
            DispatchConfig::from_map(&vars(&[("BIND_ADDR", "127.0.0.1:9000")])),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[rstest]
    #[case("PIN_MAX_ATTEMPTS", "many")]
    #[case("BIND_ADDR", "localhost")]
    #[case("SERVICE_AREA", "17.3,20.0,-72.1")]
    #[case("MIN_TRIP_METERS", "-5")]
    #[case("PIN_LOCKOUT_SECS", "99999999999999999")]
    #[case("PIN_LOCKOUT_SECS", "-1")]
    #[case("PRESENCE_STALE_SECS", "9223372036854775807")]
    fn malformed_values_name_the_variable(#[case] name: &str, #[case] value: &str) {
        let result = DispatchConfig::from_map(&vars(&[("JWT_SECRET", "x"), (name, value)]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: reported, .. }) if reported == name));
    }

    #[rstest]
    fn longest_window_is_accepted() -> eyre::Result<()> {
        let ceiling = super::MAX_WINDOW_SECS.to_string();
        let config = DispatchConfig::from_map(&vars(&[
            ("JWT_SECRET", "x"),
            ("PIN_LOCKOUT_SECS", ceiling.as_str()),
        ]))?;

        eyre::ensure!(config.pin_lockout.num_seconds() == super::MAX_WINDOW_SECS);
        Ok(())
    }

    #[rstest]
    fn service_area_is_parsed() -> eyre::Result<()> {
        let config = DispatchConfig::from_map(&vars(&[
            ("JWT_SECRET", "x"),
            ("SERVICE_AREA", "18.0, 19.0, -71.0, -69.0"),
        ]))?;
        let inside = crate::distance::domain::GeoPoint::new(18.5, -70.0)?;
        let outside = crate::distance::domain::GeoPoint::new(19.5, -70.0)?;

        eyre::ensure!(config.trip.service_area.contains(inside));
        eyre::ensure!(!config.trip.service_area.contains(outside));
        Ok(())
    }
}
