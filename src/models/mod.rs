pub mod calendar;
pub mod scheduled_event;
