use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wire format of `release_date`.
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, format = Date, example = "2024-05-17")]
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl MoviePatch {
    pub fn apply(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(release_date) = self.release_date {
            movie.release_date = release_date;
        }
    }
}

pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT).ok()
}
