pub mod catalog;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use catalog::{City, LookupEntry, WeatherType, CITIES, WEATHER_TYPES};

/// One city's weather reading at one timestamp.
///
/// The serialized form is the attribute layout shared by the API bodies and
/// the table items: `CityId`, `CityName`, `WeatherId`, `WeatherName`,
/// `RainfallProbability`, `timestamp`, `ttl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "CityId")]
    pub city_id: i64,
    #[serde(rename = "CityName")]
    pub city_name: String,
    /// Absent for rows ingested from delimited files
    #[serde(rename = "WeatherId", default, skip_serializing_if = "Option::is_none")]
    pub weather_id: Option<i64>,
    #[serde(rename = "WeatherName")]
    pub weather_name: String,
    #[serde(rename = "RainfallProbability")]
    pub rainfall_probability: u8,
    pub timestamp: String,
    /// Expiry in epoch seconds, enforced by the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

/// Default lifetime of a stored record
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Timestamp and expiry shared by every record written in one batch
pub fn batch_stamp(now: DateTime<Utc>, ttl_hours: i64) -> (String, i64) {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Micros, true);
    let ttl = (now + Duration::hours(ttl_hours)).timestamp();
    (timestamp, ttl)
}

impl WeatherRecord {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(ttl: Option<i64>) -> WeatherRecord {
        WeatherRecord {
            city_id: 27,
            city_name: "Osaka".to_string(),
            weather_id: Some(2),
            weather_name: "Cloudy".to_string(),
            rainfall_probability: 35,
            timestamp: "2024-01-01T00:00:00.000000Z".to_string(),
            ttl,
        }
    }

    #[test]
    fn round_trips_with_and_without_expiry() {
        for record in [sample(Some(1_704_153_600)), sample(None)] {
            let restored = WeatherRecord::from_value(record.to_value()).unwrap();
            assert_eq!(restored, record);
        }
    }

    #[test]
    fn serializes_attribute_names() {
        let value = sample(None).to_value();
        assert_eq!(value["CityId"], json!(27));
        assert_eq!(value["RainfallProbability"], json!(35));
        assert!(value.get("ttl").is_none());
    }

    #[test]
    fn batch_stamp_expires_a_day_later() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let (timestamp, ttl) = batch_stamp(now, DEFAULT_TTL_HOURS);
        assert_eq!(timestamp, "2024-01-01T00:00:00.000000Z");
        assert_eq!(ttl, 1_704_153_600);
    }

    #[test]
    fn weather_id_is_optional() {
        let record = WeatherRecord::from_value(json!({
            "CityId": 1,
            "CityName": "Sapporo",
            "WeatherName": "Clear",
            "RainfallProbability": 10,
            "timestamp": "T",
            "ttl": 5
        }))
        .unwrap();
        assert_eq!(record.weather_id, None);
        assert!(record.to_value().get("WeatherId").is_none());
    }
}
