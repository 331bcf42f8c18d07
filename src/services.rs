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
use crate::configuration::WifiCredentials;
use crate::errors::LinkError;
use crate::reporter::{
    transport_failure_code, HttpConnector, HttpSession, NetworkLink, ResponseBody,
};
use crate::sensor::AnalogSource;
use crate::state::ConnectionState;
use core::borrow::Borrow;
use core::time::Duration;
use embedded_svc::http::client::Client;
use embedded_svc::io::{Read, Write};
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::gpio::ADCPin;
use esp_idf_hal::modem::WifiModemPeripheral;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_svc::errors::EspIOError;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use esp_idf_sys::EspError;
use log::*;
use std::net::Ipv4Addr;

const RESPONSE_BUF_SIZE: usize = 256;
// One complete request/response exchange
const HTTP_TIMEOUT: Duration = Duration::from_millis(5000);

pub struct EspNetworkLink<'d> {
    wifi: EspWifi<'d>,
}

impl<'d> EspNetworkLink<'d> {
    pub fn new(
        modem: impl Peripheral<P = impl WifiModemPeripheral + 'd> + 'd,
        sysloop: EspSystemEventLoop,
        partition: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, EspError> {
        Ok(Self {
            wifi: EspWifi::new(modem, sysloop, partition)?,
        })
    }
}

impl NetworkLink for EspNetworkLink<'_> {
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), LinkError> {
        info!("Wifi name {}", credentials.ssid);

        let ssid = credentials
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| LinkError::InvalidCredentials)?;

        if credentials.is_open() {
            info!("Wifi password is empty");
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration {
                    ssid,
                    auth_method: AuthMethod::None,
                    ..Default::default()
                }))?;
        } else {
            let password = credentials
                .passphrase
                .as_str()
                .try_into()
                .map_err(|_| LinkError::InvalidCredentials)?;
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration {
                    ssid,
                    password,
                    ..Default::default()
                }))?;
        }

        self.wifi.start()?;
        self.wifi.connect()?;

        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        match self.wifi.is_up() {
            Ok(true) => ConnectionState::Connected,
            Ok(false) => ConnectionState::Disconnected,
            Err(err) => {
                warn!("Querying WiFi state failed: {err}");
                ConnectionState::Disconnected
            }
        }
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| Ipv4Addr::from(info.ip.octets()))
    }
}

#[derive(Default)]
pub struct EspHttpConnector;

impl HttpConnector for EspHttpConnector {
    type Session = EspHttpSession;

    fn open(&mut self, endpoint: &str) -> Result<EspHttpSession, i32> {
        let connection = EspHttpConnection::new(&HttpConfiguration {
            timeout: Some(HTTP_TIMEOUT),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|err| transport_code(&err))?;

        Ok(EspHttpSession {
            client: Client::wrap(connection),
            endpoint: endpoint.into(),
            headers: Vec::new(),
            body: String::new(),
        })
    }
}

// Owns the ESP-IDF HTTP client handle; it is cleaned up when the session
// is dropped.
pub struct EspHttpSession {
    client: Client<EspHttpConnection>,
    endpoint: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl EspHttpSession {
    fn try_post(&mut self, payload: &[u8]) -> Result<u16, EspIOError> {
        let content_length = payload.len().to_string();
        let mut headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        headers.push(("Content-Length", &content_length));

        let mut request = self.client.post(&self.endpoint, &headers)?;
        request.write_all(payload)?;
        request.flush()?;
        let mut response = request.submit()?;
        let status = response.status();

        let mut body = ResponseBody::default();
        let mut buf = [0_u8; RESPONSE_BUF_SIZE];
        loop {
            let read = response.read(&mut buf)?;
            if read == 0 {
                break;
            }
            body.extend(&buf[..read]);
        }
        if body.discarded() > 0 {
            warn!("response body truncated, {} bytes dropped", body.discarded());
        }
        self.body = body.into_string();

        Ok(status)
    }
}

impl HttpSession for EspHttpSession {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.into(), value.into()));
    }

    fn post(&mut self, body: &[u8]) -> i32 {
        match self.try_post(body) {
            Ok(status) => i32::from(status),
            Err(err) => transport_code(&err.0),
        }
    }

    fn response_body(&mut self) -> String {
        core::mem::take(&mut self.body)
    }
}

impl Drop for EspHttpSession {
    fn drop(&mut self) {
        debug!("closing HTTP session to {}", self.endpoint);
    }
}

fn transport_code(err: &EspError) -> i32 {
    transport_failure_code(err.code())
}

impl<'d, T, M> AnalogSource for AdcChannelDriver<'d, T, M>
where
    T: ADCPin,
    M: Borrow<AdcDriver<'d, T::Adc>>,
{
    type Error = EspError;

    fn read_raw(&mut self) -> Result<u16, EspError> {
        AdcChannelDriver::read_raw(self)
    }
}
