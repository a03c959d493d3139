use super::break_record::BreakKind;
use serde::Serialize;
use std::fmt;

/// Attendance actions accepted by `AttendanceService::execute_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Start,
    Finish,
    StartBreak(BreakKind),
    EndBreak,
}

impl Action {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "start" => Some(Action::Start),
            "finish" => Some(Action::Finish),
            "start_break_mandatory" => Some(Action::StartBreak(BreakKind::Mandatory)),
            "start_break_additional" => Some(Action::StartBreak(BreakKind::Additional)),
            "end_break" => Some(Action::EndBreak),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Finish => "finish",
            Action::StartBreak(BreakKind::Mandatory) => "start_break_mandatory",
            Action::StartBreak(BreakKind::Additional) => "start_break_additional",
            Action::EndBreak => "end_break",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
