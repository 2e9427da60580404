//! CLI command implementations.

mod forecast;
mod train;

pub use forecast::ForecastCommand;
pub use train::TrainCommand;
