pub mod calendar;
pub mod configuration;
pub mod schedule;

pub use calendar::{available_time_slots, is_working_day};
pub use configuration::ConfigurationService;
pub use schedule::ScheduleService;
