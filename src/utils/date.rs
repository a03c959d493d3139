use chrono::NaiveDate;

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn date_str(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
