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
use crate::configuration::TelemetryConfig;
use crate::errors::ConfigError;
use crate::state::Channel;
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::{Gpio34, Gpio35};
use esp_idf_hal::modem::Modem;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_sys::EspError;

// GPIO numbers of the sensor pins handed out below. Both are ADC1 pins so
// they keep working while the WiFi radio owns ADC2.
pub const SOUND_PIN: u8 = 34;
pub const LIGHT_PIN: u8 = 35;

pub struct SystemPeripherals {
    pub sensors: SensorPeripherals,
    pub modem: Modem,
}

impl SystemPeripherals {
    pub fn take() -> Result<Self, EspError> {
        let peripherals = Peripherals::take()?;

        Ok(SystemPeripherals {
            sensors: SensorPeripherals {
                adc: peripherals.adc1,
                // KY-037 analog output
                sound: peripherals.pins.gpio34,
                // LDR voltage divider
                light: peripherals.pins.gpio35,
            },
            modem: peripherals.modem,
        })
    }
}

pub struct SensorPeripherals {
    pub adc: ADC1,
    pub sound: Gpio34,
    pub light: Gpio35,
}

// The pins are fixed by the board wiring above, the configured numbers have
// to agree with it.
pub fn check_wiring(config: &TelemetryConfig) -> Result<(), ConfigError> {
    if config.sound_pin != SOUND_PIN {
        return Err(ConfigError::UnwiredPin {
            channel: Channel::Sound,
            pin: config.sound_pin,
        });
    }
    if config.light_pin != LIGHT_PIN {
        return Err(ConfigError::UnwiredPin {
            channel: Channel::Light,
            pin: config.light_pin,
        });
    }

    Ok(())
}
