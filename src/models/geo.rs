use serde::{Deserialize, Serialize};

/// Request context captured on every mutating attendance call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCapture {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl GeoCapture {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            ip: None,
            user_agent: None,
        }
    }

    pub fn with_request(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip = ip;
        self.user_agent = user_agent;
        self
    }

    /// At least one coordinate is present.
    pub fn has_position(&self) -> bool {
        self.lat.is_some() || self.lon.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_position() && self.ip.is_none() && self.user_agent.is_none()
    }
}
