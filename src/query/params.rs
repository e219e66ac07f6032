//! Query string validation for the HTTP endpoints.

use geo::Coord;
use serde::Deserialize;
use thiserror::Error;

/// Number of routes returned when `count` is omitted
pub const DEFAULT_COUNT: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("missing parameter '{0}'")]
    Missing(&'static str),

    #[error("parameter '{0}' must be a finite number")]
    NotFinite(&'static str),

    #[error("parameter 'count' must be a positive integer")]
    InvalidCount,
}

/// Raw `/v1/routes/nearest` query string
#[derive(Debug, Default, Deserialize)]
pub struct NearestQuery {
    lng: Option<String>,
    lat: Option<String>,
    count: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NearestParams {
    pub point: Coord<f64>,
    pub count: usize,
}

impl NearestQuery {
    pub fn validate(&self) -> Result<NearestParams, ParamError> {
        let point = Coord {
            x: finite("lng", &self.lng)?,
            y: finite("lat", &self.lat)?,
        };

        let count = match self.count.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_COUNT,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ParamError::InvalidCount),
            },
        };

        Ok(NearestParams { point, count })
    }
}

/// Raw `/v1/points/viewport` query string
#[derive(Debug, Default, Deserialize)]
pub struct ViewportQuery {
    lng1: Option<String>,
    lat1: Option<String>,
    lng2: Option<String>,
    lat2: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ViewportParams {
    pub corner1: Coord<f64>,
    pub corner2: Coord<f64>,
}

impl ViewportQuery {
    pub fn validate(&self) -> Result<ViewportParams, ParamError> {
        Ok(ViewportParams {
            corner1: Coord {
                x: finite("lng1", &self.lng1)?,
                y: finite("lat1", &self.lat1)?,
            },
            corner2: Coord {
                x: finite("lng2", &self.lng2)?,
                y: finite("lat2", &self.lat2)?,
            },
        })
    }
}

fn finite(name: &'static str, raw: &Option<String>) -> Result<f64, ParamError> {
    let raw = raw.as_deref().ok_or(ParamError::Missing(name))?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParamError::NotFinite(name)),
    }
}
