use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{RouteEstimate, RoutingError, RoutingProvider};
use crate::models::Coordinates;

/// Driving distance via a Distance Matrix style HTTP API.
pub struct DistanceMatrixProvider {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl DistanceMatrixProvider {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build routing HTTP client")?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    pub status: String,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    pub distance: Option<MatrixValue>,
    pub duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixValue {
    pub value: f64,
}

/// Metres become kilometres; seconds become whole minutes, rounded up.
pub fn parse_matrix_response(resp: MatrixResponse) -> Result<RouteEstimate, RoutingError> {
    if resp.status != "OK" {
        return Err(RoutingError::Unavailable(resp.status));
    }

    let element = resp
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| RoutingError::Unavailable("empty matrix".to_string()))?;

    if element.status != "OK" {
        return Err(RoutingError::Unavailable(element.status));
    }

    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => Ok(RouteEstimate {
            distance_km: distance.value / 1000.0,
            duration_minutes: (duration.value / 60.0).ceil() as i64,
        }),
        _ => Err(RoutingError::Unavailable(
            "element missing distance or duration".to_string(),
        )),
    }
}

#[async_trait]
impl RoutingProvider for DistanceMatrixProvider {
    async fn distance_duration(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<RouteEstimate, RoutingError> {
        let origins = format!("{},{}", origin.latitude, origin.longitude);
        let destinations = format!("{},{}", destination.latitude, destination.longitude);

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("mode", "driving"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let parsed: MatrixResponse = resp.json().await?;
        parse_matrix_response(parsed)
    }
}
