//! Persistent settings on the NVS flash partition.
//!
//! Implements [`ConfigPort`], [`StoragePort`] and [`SetpointStore`] for
//! the spa controller.
//!
//! - Config: `postcard` blob under `hot-tub::spacfg`, range-checked with
//!   [`SpaConfig::validate`] before it is written.
//! - Setpoint: little-endian `i16` under `hot-tub::temp`.  Only written
//!   when the user commits a new value, never per pass.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!
//! On host the backend is an in-memory map.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{
    ConfigError, ConfigPort, SetpointStore, StorageError, StoragePort,
};
use crate::config::SpaConfig;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "hot-tub";
const CONFIG_KEY: &str = "spacfg";
const SETPOINT_KEY: &str = "temp";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 256;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any NVS access.
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
            info!("NvsAdapter: flash NVS ready");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: in-memory store (sim)");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn sim_key(namespace: &str, key: &str) -> String {
        format!("{}/{}", namespace, key)
    }
}

/// An open NVS namespace.  Closed on drop.
#[cfg(target_os = "espidf")]
struct Namespace(nvs_handle_t);

#[cfg(target_os = "espidf")]
impl Namespace {
    fn open(name: &str, writable: bool) -> Result<Self, esp_err_t> {
        let name = c_name(name);
        let mode = if writable {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: `name` is NUL-terminated and outlives the call.
        esp_ok(unsafe { nvs_open(name.as_ptr().cast(), mode, &mut handle) })?;
        Ok(Self(handle))
    }

    fn get_blob(&self, key: &str, buf: &mut [u8]) -> Result<usize, esp_err_t> {
        let key = c_name(key);
        let mut size = buf.len();
        // SAFETY: key is NUL-terminated; buf is valid for `size` bytes.
        esp_ok(unsafe {
            nvs_get_blob(self.0, key.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
        })?;
        Ok(size)
    }

    /// Store and commit in one step.
    fn put_blob(&self, key: &str, data: &[u8]) -> Result<(), esp_err_t> {
        let key = c_name(key);
        // SAFETY: key is NUL-terminated; data outlives the call.
        esp_ok(unsafe {
            nvs_set_blob(self.0, key.as_ptr().cast(), data.as_ptr().cast(), data.len())
        })?;
        esp_ok(unsafe { nvs_commit(self.0) })
    }

    fn erase(&self, key: &str) -> Result<(), esp_err_t> {
        let key = c_name(key);
        // SAFETY: key is NUL-terminated.
        let rc = unsafe { nvs_erase_key(self.0, key.as_ptr().cast()) };
        if rc != ESP_ERR_NVS_NOT_FOUND {
            esp_ok(rc)?;
        }
        esp_ok(unsafe { nvs_commit(self.0) })
    }

    fn contains(&self, key: &str) -> bool {
        let key = c_name(key);
        // SAFETY: key is NUL-terminated; the type out-pointer may be null.
        unsafe { nvs_find_key(self.0, key.as_ptr().cast(), core::ptr::null_mut()) == ESP_OK }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for Namespace {
    fn drop(&mut self) {
        // SAFETY: the handle came from nvs_open and is closed once.
        unsafe { nvs_close(self.0) }
    }
}

/// NUL-terminated copy of an NVS name (max 15 chars).
#[cfg(target_os = "espidf")]
fn c_name(name: &str) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let len = name.len().min(15);
    buf[..len].copy_from_slice(&name.as_bytes()[..len]);
    buf
}

#[cfg(target_os = "espidf")]
fn esp_ok(rc: esp_err_t) -> Result<(), esp_err_t> {
    if rc == ESP_OK { Ok(()) } else { Err(rc) }
}

#[cfg(target_os = "espidf")]
fn storage_error(rc: esp_err_t) -> StorageError {
    if rc == ESP_ERR_NVS_NOT_FOUND {
        StorageError::NotFound
    } else if rc == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
        StorageError::Full
    } else {
        StorageError::IoError
    }
}

// ── ConfigPort ────────────────────────────────────────────────

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SpaConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        let stored = self
            .store
            .borrow()
            .get(&Self::sim_key(NAMESPACE, CONFIG_KEY))
            .cloned();

        #[cfg(target_os = "espidf")]
        let stored = {
            let mut buf = [0u8; MAX_BLOB_SIZE];
            match self.read(NAMESPACE, CONFIG_KEY, &mut buf) {
                Ok(len) => Some(buf[..len].to_vec()),
                Err(StorageError::NotFound) => None,
                Err(e) => {
                    warn!("NvsAdapter: config read error ({}), using defaults", e);
                    None
                }
            }
        };

        match stored {
            Some(bytes) => {
                let cfg: SpaConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate().map_err(ConfigError::ValidationFailed)?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SpaConfig::default())
            }
        }
    }

    fn save(&self, config: &SpaConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::sim_key(NAMESPACE, CONFIG_KEY), bytes.clone());
        }

        #[cfg(target_os = "espidf")]
        {
            Namespace::open(NAMESPACE, true)
                .and_then(|ns| ns.put_blob(CONFIG_KEY, &bytes))
                .map_err(|rc| {
                    warn!("NvsAdapter: config write failed (rc={})", rc);
                    ConfigError::IoError
                })?;
        }

        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

// ── SetpointStore ─────────────────────────────────────────────

impl SetpointStore for NvsAdapter {
    fn read_setpoint(&self) -> Result<Option<i16>, StorageError> {
        let mut buf = [0u8; 2];
        match self.read(NAMESPACE, SETPOINT_KEY, &mut buf) {
            Ok(2) => Ok(Some(i16::from_le_bytes(buf))),
            Ok(_) => Err(StorageError::Corrupted),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_setpoint(&mut self, value: i16) -> Result<(), StorageError> {
        self.write(NAMESPACE, SETPOINT_KEY, &value.to_le_bytes())
    }
}

// ── StoragePort ───────────────────────────────────────────────

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match self.store.borrow().get(&Self::sim_key(namespace, key)) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            Namespace::open(namespace, false)
                .and_then(|ns| ns.get_blob(key, buf))
                .map_err(storage_error)
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::sim_key(namespace, key), data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Namespace::open(namespace, true)
                .and_then(|ns| ns.put_blob(key, data))
                .map_err(storage_error)
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .remove(&Self::sim_key(namespace, key));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Namespace::open(namespace, true)
                .and_then(|ns| ns.erase(key))
                .map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow()
                .contains_key(&Self::sim_key(namespace, key))
        }

        #[cfg(target_os = "espidf")]
        {
            Namespace::open(namespace, false)
                .map(|ns| ns.contains(key))
                .unwrap_or(false)
        }
    }
}
