pub mod config;
pub mod estimate;
pub mod session;
pub mod types;

pub use config::{ClientConfig, RateTable, RuntimeConfig};
pub use estimate::{estimate, CookSpec, EstimateError};
pub use session::{CommandOutcome, PollResult, SessionEngine, SessionEvent};
pub use types::{DeviceSnapshot, FoodKind, SessionMode, SessionStatus};
