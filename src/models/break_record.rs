use super::geo::GeoCapture;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakKind {
    Mandatory,
    Additional,
}

impl BreakKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BreakKind::Mandatory => "mandatory",
            BreakKind::Additional => "additional",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "mandatory" => Some(BreakKind::Mandatory),
            "additional" => Some(BreakKind::Additional),
            _ => None,
        }
    }
}

impl fmt::Display for BreakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            BreakKind::Mandatory => "MANDATORY",
            BreakKind::Additional => "ADDITIONAL",
        })
    }
}

/// One break instance. `end` is `None` exactly while the break is open.
#[derive(Debug, Clone, Serialize)]
pub struct Break {
    pub id: i64,
    pub shift_id: i64,
    pub kind: BreakKind,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub start_geo: GeoCapture,
    pub end_geo: GeoCapture,
    pub owed_minutes: Option<i64>,
    pub observation: String,
}

impl Break {
    pub fn open(shift_id: i64, kind: BreakKind, start: NaiveDateTime, geo: GeoCapture) -> Self {
        Self {
            id: 0,
            shift_id,
            kind,
            start,
            end: None,
            start_geo: geo,
            end_geo: GeoCapture::default(),
            owed_minutes: None,
            observation: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Duration of a closed break; `None` while open.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| (end - self.start).abs())
    }

    pub fn append_observation(&mut self, note: &str) {
        if self.observation.is_empty() {
            self.observation = note.to_string();
        } else {
            self.observation = format!("{} | {}", self.observation, note);
        }
    }
}
