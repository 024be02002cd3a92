// Fixed lookup tables for cities and weather types

use serde::Serialize;

/// A city the service reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    pub id: i64,
    pub name: &'static str,
}

/// Weather categories used when generating readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherType {
    pub id: i64,
    pub name: &'static str,
    /// Inclusive rainfall probability range for generated readings
    pub rainfall_range: (u8, u8),
}

pub static CITIES: [City; 5] = [
    City { id: 1, name: "Sapporo" },
    City { id: 13, name: "Tokyo" },
    City { id: 23, name: "Nagoya" },
    City { id: 27, name: "Osaka" },
    City { id: 40, name: "Hakata" },
];

pub static WEATHER_TYPES: [WeatherType; 3] = [
    WeatherType { id: 1, name: "Clear", rainfall_range: (0, 20) },
    WeatherType { id: 2, name: "Cloudy", rainfall_range: (20, 50) },
    WeatherType { id: 3, name: "Rain", rainfall_range: (50, 100) },
];

/// `{id, name}` pair returned by the listing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupEntry {
    pub id: i64,
    pub name: String,
}

pub fn find_city(id: i64) -> Option<&'static City> {
    CITIES.iter().find(|city| city.id == id)
}

pub fn find_weather_type(id: i64) -> Option<&'static WeatherType> {
    WEATHER_TYPES.iter().find(|weather| weather.id == id)
}

pub fn city_entries() -> Vec<LookupEntry> {
    CITIES
        .iter()
        .map(|city| LookupEntry { id: city.id, name: city.name.to_string() })
        .collect()
}

pub fn weather_type_entries() -> Vec<LookupEntry> {
    WEATHER_TYPES
        .iter()
        .map(|weather| LookupEntry { id: weather.id, name: weather.name.to_string() })
        .collect()
}
