pub mod fallback;
pub mod health;
pub mod weather;

pub use fallback::{not_found, options};
pub use health::health;
pub use weather::{generate_weather, weather_types};
