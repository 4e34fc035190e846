pub mod alerts_controller;
pub mod home_controller;
pub mod preferences_controller;
pub mod realtime_controller;
