//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the pump controller. Settings are kept
//! as one JSON document shaped like the web UI's settings file:
//!
//! ```json
//! { "control": { "minTrigger": 260.0, "maxTrigger": 290.0, "pin_pump": 16, ... } }
//! ```
//!
//! - **`target_os = "espidf"`**: stored as a blob in the `waterpump`
//!   namespace. ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - **`not(target_os = "espidf")`**: in-memory map for host tests.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::ControlSettings;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "waterpump";
const CONFIG_KEY: &str = "settings";

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const MAX_BLOB_SIZE: usize = 2048;

/// On-flash document wrapper.
#[derive(Serialize, Deserialize, Default)]
struct SettingsDocument {
    #[serde(default)]
    control: ControlSettings,
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key() -> String {
        format!("{}::{}", CONFIG_NAMESPACE, CONFIG_KEY)
    }

    /// Overwrite the stored document with raw bytes (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn put_raw(&self, bytes: &[u8]) {
        self.store
            .borrow_mut()
            .insert(Self::composite_key(), bytes.to_vec());
    }

    /// Raw stored document, if any (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.store.borrow().get(&Self::composite_key()).cloned()
    }

    /// Open the settings namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CONFIG_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_nvs_handle(false, |handle| {
            let key_cstr = b"settings\0";
            let mut size: usize = 0;

            // First call: get size
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_cstr.as_ptr() as *const _,
                    core::ptr::null_mut(),
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH);
            }

            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_cstr.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // A namespace that was never written cannot be opened read-only.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
            Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(bytes: &[u8]) -> Result<(), ConfigError> {
        let result = Self::with_nvs_handle(true, |handle| {
            let key_cstr = b"settings\0";
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key_cstr.as_ptr() as *const _,
                    bytes.as_ptr() as *const _,
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }
}

/// Range-check settings before they reach flash.
fn validate_settings(settings: &ControlSettings) -> Result<(), ConfigError> {
    settings.validate()?;
    if !settings.band_is_ordered() {
        warn!(
            "NvsAdapter: saving inverted trigger band (min {:.1} >= max {:.1})",
            settings.on_distance_cm, settings.off_distance_cm
        );
    }
    Ok(())
}

fn decode(bytes: &[u8]) -> Result<ControlSettings, ConfigError> {
    let doc: SettingsDocument =
        serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
    Ok(doc.control)
}

fn encode(settings: &ControlSettings) -> Result<Vec<u8>, ConfigError> {
    let doc = SettingsDocument {
        control: settings.clone(),
    };
    serde_json::to_vec(&doc).map_err(|_| ConfigError::IoError)
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<ControlSettings, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        let stored = self.raw();

        #[cfg(target_os = "espidf")]
        let stored = Self::read_blob()?;

        match stored {
            Some(bytes) => {
                let settings = decode(&bytes)?;
                info!("NvsAdapter: loaded settings ({} bytes)", bytes.len());
                Ok(settings)
            }
            None => {
                info!("NvsAdapter: no stored settings, using defaults");
                Ok(ControlSettings::default())
            }
        }
    }

    fn save(&self, settings: &ControlSettings) -> Result<(), ConfigError> {
        validate_settings(settings)?;
        let bytes = encode(settings)?;

        #[cfg(not(target_os = "espidf"))]
        self.put_raw(&bytes);

        #[cfg(target_os = "espidf")]
        Self::write_blob(&bytes)?;

        info!("NvsAdapter: settings saved ({} bytes)", bytes.len());
        Ok(())
    }
}
