//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                 |
//! |-------------|--------------------|-----------------------------|
//! | `dashboard` | StatePublisher     | WebSocket text frames (JSON)|
//! | `hardware`  | SensorPort         | ESP32 ADC (probe)           |
//! |             | ActuatorPort       | Heat / pump relays          |
//! |             | PixelSink          | SK6812 strip via RMT        |
//! |             | DialPort           | Encoder ISR staging         |
//! |             | DisplayPort        | Character display           |
//! | `log_sink`  | EventSink          | Serial log output           |
//! | `nvs`       | ConfigPort         | NVS / in-memory store       |
//! |             | SetpointStore      |                             |
//! |             | StoragePort        |                             |
//! | `time`      | -                  | ESP32 system timer          |

pub mod dashboard;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
