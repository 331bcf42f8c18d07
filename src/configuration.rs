/*
 * ESP32 Ambient Telemetry
 *
 * MIT license
 *
 * Copyright (c) 2021-2023 Michael Zill
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 *
 * Apache license, Version 2.0
 *
 * Copyright (c) 2021-2023 Michael Zill
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */
use crate::errors::ConfigError;
use crate::state::ADC_MAX;
use core::time::Duration;
use url::Url;

// Values baked in at build time from cfg.toml, see cfg.toml.example
#[toml_cfg::toml_config]
pub struct Config {
    #[default("")]
    wifi_ssid: &'static str,
    #[default("")]
    wifi_psk: &'static str,
    #[default("http://192.168.2.119:4000/api/sensores")]
    collector_url: &'static str,
    #[default(34)]
    sound_pin: u8,
    #[default(35)]
    light_pin: u8,
    #[default(800)]
    noise_low: u16,
    #[default(1500)]
    noise_moderate: u16,
    #[default(2000)]
    noise_high: u16,
    #[default(1000)]
    light_low: u16,
    #[default(3000)]
    light_high: u16,
    #[default(5000)]
    report_interval_ms: u64,
    #[default(500)]
    association_poll_ms: u64,
}

pub const DEFAULT_COLLECTOR_URL: &str = "http://192.168.2.119:4000/api/sensores";
// Time between two reports [ms]
pub const REPORT_INTERVAL: u64 = 5000;
// Poll interval while waiting for the WiFi association [ms]
pub const ASSOCIATION_POLL_INTERVAL: u64 = 500;
// Settle time after power up before the radio is started [ms]
pub const STARTUP_DELAY: u64 = 1000;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub passphrase: String,
}

impl WifiCredentials {
    pub fn new(ssid: &str, passphrase: &str) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: passphrase.into(),
        }
    }

    // An empty passphrase means an open network
    pub fn is_open(&self) -> bool {
        self.passphrase.is_empty()
    }
}

/// Band boundaries for the microphone reading.
///
/// `raw < low` is quiet, `low <= raw < moderate` is moderate and everything
/// from `moderate` upwards is loud.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NoiseThresholds {
    pub low: u16,
    pub moderate: u16,
    /// Validated for ordering but never compared against: classification
    /// knows three bands only.
    pub high: u16,
}

impl Default for NoiseThresholds {
    fn default() -> Self {
        Self {
            low: 800,
            moderate: 1500,
            high: 2000,
        }
    }
}

/// Band boundaries for the LDR reading.
///
/// `raw < low` is dark, `low <= raw < high` is normal, the rest is bright.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LightThresholds {
    pub low: u16,
    pub high: u16,
}

impl Default for LightThresholds {
    fn default() -> Self {
        Self {
            low: 1000,
            high: 3000,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TelemetryConfig {
    pub wifi: WifiCredentials,
    pub collector_url: String,
    pub sound_pin: u8,
    pub light_pin: u8,
    pub noise: NoiseThresholds,
    pub light: LightThresholds,
    pub report_interval: Duration,
    pub association_poll: Duration,
    pub startup_delay: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            wifi: WifiCredentials::default(),
            collector_url: DEFAULT_COLLECTOR_URL.into(),
            sound_pin: 34,
            light_pin: 35,
            noise: NoiseThresholds::default(),
            light: LightThresholds::default(),
            report_interval: Duration::from_millis(REPORT_INTERVAL),
            association_poll: Duration::from_millis(ASSOCIATION_POLL_INTERVAL),
            startup_delay: Duration::from_millis(STARTUP_DELAY),
        }
    }
}

impl TelemetryConfig {
    pub fn from_build_config() -> Result<Self, ConfigError> {
        let config = Self {
            wifi: WifiCredentials::new(CONFIG.wifi_ssid, CONFIG.wifi_psk),
            collector_url: CONFIG.collector_url.into(),
            sound_pin: CONFIG.sound_pin,
            light_pin: CONFIG.light_pin,
            noise: NoiseThresholds {
                low: CONFIG.noise_low,
                moderate: CONFIG.noise_moderate,
                high: CONFIG.noise_high,
            },
            light: LightThresholds {
                low: CONFIG.light_low,
                high: CONFIG.light_high,
            },
            report_interval: Duration::from_millis(CONFIG.report_interval_ms),
            association_poll: Duration::from_millis(CONFIG.association_poll_ms),
            startup_delay: Duration::from_millis(STARTUP_DELAY),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi.ssid.is_empty() {
            return Err(ConfigError::MissingWifiName);
        }

        let url = Url::parse(&self.collector_url)
            .map_err(|err| ConfigError::InvalidCollectorUrl(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().into()));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidCollectorUrl("missing host".into()));
        }

        // Bands must be totally ordered inside the ADC range so that every
        // reading falls into exactly one of them.
        let bounds = [
            ("noise_low", self.noise.low),
            ("noise_moderate", self.noise.moderate),
            ("noise_high", self.noise.high),
            ("light_low", self.light.low),
            ("light_high", self.light.high),
        ];
        for (name, value) in bounds {
            if value > ADC_MAX {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        let ordered = [
            (bounds[0], bounds[1]),
            (bounds[1], bounds[2]),
            (bounds[3], bounds[4]),
        ];
        for ((lower, lower_value), (upper, upper_value)) in ordered {
            if lower_value >= upper_value {
                return Err(ConfigError::ThresholdOrder { lower, upper });
            }
        }

        if self.report_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("report interval"));
        }
        if self.association_poll.is_zero() {
            return Err(ConfigError::ZeroInterval("association poll interval"));
        }

        Ok(())
    }
}
