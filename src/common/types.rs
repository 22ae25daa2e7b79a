use serde::{Deserialize, Serialize};

/// A single named event definition in a registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub name: String,
    pub id: i32,
}

/// Registry configuration mapping symbolic event names to event IDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub name: String,
    pub events: Vec<EventDef>,
}
