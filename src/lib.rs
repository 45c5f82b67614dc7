//! Aggregates heterogeneous smart lights into one virtual light, bridged
//! over MQTT.

pub mod group;
pub mod mqtt;
pub mod protocols;
pub mod settings;
