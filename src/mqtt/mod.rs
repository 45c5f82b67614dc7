pub mod device_control;
pub mod events;
pub mod payload;
