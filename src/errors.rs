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
use crate::state::Channel;
use core::fmt;

#[cfg(feature = "firmware")]
use esp_idf_sys::EspError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SensorError {
    ReadFailed { channel: Channel, reason: String },
    OutOfRange { channel: Channel, raw: u16 },
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { channel, reason } => {
                write!(f, "Reading the {channel} channel failed: {reason}")
            }
            Self::OutOfRange { channel, raw } => {
                write!(f, "The {channel} channel returned out of range value {raw}")
            }
        }
    }
}

impl std::error::Error for SensorError {}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeliveryError {
    NoConnection,
    TransportFailure(i32),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConnection => write!(f, "WiFi not connected, telemetry not sent"),
            Self::TransportFailure(code) => write!(f, "HTTP POST failed with code {code}"),
        }
    }
}

impl std::error::Error for DeliveryError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    MissingWifiName,
    InvalidCollectorUrl(String),
    UnsupportedScheme(String),
    ThresholdOutOfRange { name: &'static str, value: u16 },
    ThresholdOrder { lower: &'static str, upper: &'static str },
    ZeroInterval(&'static str),
    UnwiredPin { channel: Channel, pin: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWifiName => write!(f, "missing WiFi name"),
            Self::InvalidCollectorUrl(reason) => write!(f, "invalid collector URL: {reason}"),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "collector URL scheme {scheme} is not http or https")
            }
            Self::ThresholdOutOfRange { name, value } => {
                write!(f, "threshold {name} = {value} exceeds the ADC range")
            }
            Self::ThresholdOrder { lower, upper } => {
                write!(f, "threshold {lower} must be below {upper}")
            }
            Self::ZeroInterval(name) => write!(f, "{name} must not be zero"),
            Self::UnwiredPin { channel, pin } => {
                write!(f, "GPIO{pin} is not wired as the {channel} channel")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkError {
    InvalidCredentials,
    Driver(i32),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "WiFi name or password too long"),
            Self::Driver(code) => write!(f, "WiFi driver error {code}"),
        }
    }
}

impl std::error::Error for LinkError {}

#[cfg(feature = "firmware")]
impl From<EspError> for LinkError {
    fn from(e: EspError) -> Self {
        Self::Driver(e.code())
    }
}

#[derive(Debug)]
#[cfg(feature = "firmware")]
#[allow(clippy::enum_variant_names)]
pub enum InitError {
    EspError(EspError),
    ConfigError(ConfigError),
}

#[cfg(feature = "firmware")]
impl From<EspError> for InitError {
    fn from(e: EspError) -> Self {
        Self::EspError(e)
    }
}

#[cfg(feature = "firmware")]
impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        Self::ConfigError(e)
    }
}
