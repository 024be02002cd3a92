pub mod store;
pub mod table;

pub use store::{StoreError, WeatherStore};
pub use table::{AttributeValue, Item, MemoryTable, TableError, WeatherTable};
