pub mod statistics;
pub mod weather;

pub use statistics::statistics;
pub use weather::{current_weather, forecast};
