pub mod decision;
pub mod event;
pub mod preferences;

pub use decision::Decision;
pub use event::MarketEvent;
pub use preferences::{AlertFrequency, AlertPreferences, ImpactLevel};
