use crate::common::types::RegistryConfig;
use crate::utils::error::{BeaconError, Result};
use serde_json;
use serde_yaml;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Runtime lookup view over a validated registry configuration.
///
/// A registry maps symbolic event names to the integer event IDs the
/// manager routes by, so subsystems can share one wiring file instead of
/// hard-coding integers.
pub struct EventRegistry {
    config: RegistryConfig,
    by_name: HashMap<String, i32>,
    by_id: HashMap<i32, String>,
}

impl EventRegistry {
    fn new(config: RegistryConfig) -> Self {
        let by_name = config
            .events
            .iter()
            .map(|event| (event.name.clone(), event.id))
            .collect();
        let by_id = config
            .events
            .iter()
            .map(|event| (event.id, event.name.clone()))
            .collect();
        EventRegistry {
            config,
            by_name,
            by_id,
        }
    }

    /// The registry's name, as given in the config file.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Resolve a symbolic event name to its event ID.
    pub fn id_of(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// Resolve an event ID back to its symbolic name.
    pub fn name_of(&self, id: i32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Number of event definitions in the registry.
    pub fn len(&self) -> usize {
        self.config.events.len()
    }

    /// Whether the registry holds no event definitions.
    pub fn is_empty(&self) -> bool {
        self.config.events.is_empty()
    }
}

pub struct ConfigManager;

impl ConfigManager {
    pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<EventRegistry> {
        let path_ref = path.as_ref();
        let extension = path_ref
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| BeaconError::Config("File has no extension".to_string()))?;

        let config_str = fs::read_to_string(path_ref)
            .map_err(|e| BeaconError::Config(format!("Failed to read config file: {}", e)))?;

        let config: RegistryConfig = match extension {
            "json" => serde_json::from_str(&config_str)
                .map_err(|e| BeaconError::Config(format!("Failed to parse JSON config: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&config_str)?,
            _ => {
                return Err(BeaconError::Config(format!(
                    "Unsupported file extension: {}",
                    extension
                )))
            }
        };

        Self::validate_config(&config)?;

        Ok(EventRegistry::new(config))
    }

    fn validate_config(config: &RegistryConfig) -> Result<()> {
        // Check for unique event names and IDs
        let mut names = std::collections::HashSet::new();
        let mut ids = std::collections::HashSet::new();
        for event in &config.events {
            if !names.insert(event.name.as_str()) {
                return Err(BeaconError::Config(format!(
                    "Duplicate event name: {}",
                    event.name
                )));
            }
            if !ids.insert(event.id) {
                return Err(BeaconError::Config(format!(
                    "Duplicate event ID: {}",
                    event.id
                )));
            }
        }

        Ok(())
    }
}
