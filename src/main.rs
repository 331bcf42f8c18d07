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
use ambient_telemetry::configuration::TelemetryConfig;
use ambient_telemetry::errors::InitError;
use ambient_telemetry::orchestrator::Orchestrator;
use ambient_telemetry::peripherals::{self, SystemPeripherals};
use ambient_telemetry::reporter::NetworkReporter;
use ambient_telemetry::sensor::SensorReader;
use ambient_telemetry::services::{EspHttpConnector, EspNetworkLink};
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_sys as _; // If using the `binstart` feature of `esp-idf-sys`, always keep this module imported
use log::*;

fn main() -> Result<(), InitError> {
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    info!("Ambient telemetry {}", env!("CARGO_PKG_VERSION"));

    let config = TelemetryConfig::from_build_config()?;
    peripherals::check_wiring(&config)?;
    info!("Collector {}", config.collector_url);

    let peripherals = SystemPeripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_default_partition = EspDefaultNvsPartition::take()?;

    let link = EspNetworkLink::new(peripherals.modem, sysloop, Some(nvs_default_partition))?;

    // 11 dB attenuation maps the full 0 - 3.3V swing onto 0 - 4095
    let adc = AdcDriver::new(peripherals.sensors.adc)?;
    let channel_config = AdcChannelConfig {
        attenuation: DB_11,
        ..Default::default()
    };
    let sound = AdcChannelDriver::new(&adc, peripherals.sensors.sound, &channel_config)?;
    let light = AdcChannelDriver::new(&adc, peripherals.sensors.light, &channel_config)?;

    let orchestrator = Orchestrator::new(
        config,
        SensorReader::new(sound, light),
        NetworkReporter::new(link, EspHttpConnector),
        FreeRtos,
    );

    orchestrator.run()
}
