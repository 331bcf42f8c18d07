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
// Test doubles for the hardware and network seams

use crate::configuration::WifiCredentials;
use crate::errors::{LinkError, SensorError};
use crate::reporter::{HttpConnector, HttpSession, NetworkLink};
use crate::sensor::SampleSource;
use crate::state::{ConnectionState, SensorSample};
use embedded_hal::delay::DelayNs;
use std::cell::{Cell, RefCell};
use std::net::Ipv4Addr;
use std::rc::Rc;

// Shared view on everything the fake transport was asked to do
#[derive(Clone, Default)]
pub struct TransportLog {
    pub opened: Rc<Cell<usize>>,
    pub posts: Rc<Cell<usize>>,
    pub released: Rc<Cell<usize>>,
    pub endpoints: Rc<RefCell<Vec<String>>>,
    pub headers: Rc<RefCell<Vec<(String, String)>>>,
    pub payloads: Rc<RefCell<Vec<String>>>,
}

impl TransportLog {
    pub fn transport_calls(&self) -> usize {
        self.opened.get() + self.posts.get()
    }
}

pub struct FakeConnector {
    transport: TransportLog,
    code: i32,
    body: String,
    open_error: Option<i32>,
}

impl FakeConnector {
    pub fn answering(transport: &TransportLog, code: i32, body: &str) -> Self {
        Self {
            transport: transport.clone(),
            code,
            body: body.into(),
            open_error: None,
        }
    }

    pub fn failing_to_open(transport: &TransportLog, code: i32) -> Self {
        Self {
            open_error: Some(code),
            ..Self::answering(transport, 0, "")
        }
    }
}

impl HttpConnector for FakeConnector {
    type Session = FakeSession;

    fn open(&mut self, endpoint: &str) -> Result<FakeSession, i32> {
        if let Some(code) = self.open_error {
            return Err(code);
        }

        self.transport.opened.set(self.transport.opened.get() + 1);
        self.transport.endpoints.borrow_mut().push(endpoint.into());

        Ok(FakeSession {
            transport: self.transport.clone(),
            code: self.code,
            body: self.body.clone(),
        })
    }
}

pub struct FakeSession {
    transport: TransportLog,
    code: i32,
    body: String,
}

impl HttpSession for FakeSession {
    fn add_header(&mut self, name: &str, value: &str) {
        self.transport
            .headers
            .borrow_mut()
            .push((name.into(), value.into()));
    }

    fn post(&mut self, body: &[u8]) -> i32 {
        self.transport.posts.set(self.transport.posts.get() + 1);
        self.transport
            .payloads
            .borrow_mut()
            .push(String::from_utf8_lossy(body).into_owned());
        self.code
    }

    fn response_body(&mut self) -> String {
        self.body.clone()
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.transport.released.set(self.transport.released.get() + 1);
    }
}

// Link that reports `Disconnected` for the first `pending_polls` queries
pub struct FakeLink {
    pub credentials: Rc<RefCell<Vec<WifiCredentials>>>,
    pub queries: Rc<Cell<usize>>,
    reachable: bool,
    pending_polls: Cell<usize>,
    begin_error: Option<LinkError>,
    refusals_left: usize,
}

impl FakeLink {
    pub fn connected() -> Self {
        Self::connected_after(0)
    }

    pub fn connected_after(pending_polls: usize) -> Self {
        Self {
            credentials: Rc::new(RefCell::new(Vec::new())),
            queries: Rc::new(Cell::new(0)),
            reachable: true,
            pending_polls: Cell::new(pending_polls),
            begin_error: None,
            refusals_left: 0,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            reachable: false,
            ..Self::connected()
        }
    }

    pub fn refusing_to_start(err: LinkError) -> Self {
        Self {
            begin_error: Some(err),
            refusals_left: usize::MAX,
            ..Self::disconnected()
        }
    }

    // Fails `begin` for the first `times` calls, then associates at once
    pub fn refusing_to_start_times(err: LinkError, times: usize) -> Self {
        Self {
            begin_error: Some(err),
            refusals_left: times,
            ..Self::connected()
        }
    }
}

impl NetworkLink for FakeLink {
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), LinkError> {
        self.credentials.borrow_mut().push(credentials.clone());
        match self.begin_error {
            Some(err) if self.refusals_left > 0 => {
                self.refusals_left -= 1;
                Err(err)
            }
            _ => Ok(()),
        }
    }

    fn connection_state(&self) -> ConnectionState {
        self.queries.set(self.queries.get() + 1);

        if !self.reachable {
            return ConnectionState::Disconnected;
        }
        match self.pending_polls.get() {
            0 => ConnectionState::Connected,
            n => {
                self.pending_polls.set(n - 1);
                ConnectionState::Disconnected
            }
        }
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.reachable.then(|| Ipv4Addr::new(192, 168, 2, 57))
    }
}

pub struct FixedSamples {
    sample: Result<SensorSample, SensorError>,
}

impl FixedSamples {
    pub fn new(sample: Result<SensorSample, SensorError>) -> Self {
        Self { sample }
    }
}

impl SampleSource for FixedSamples {
    fn read_sample(&mut self) -> Result<SensorSample, SensorError> {
        self.sample.clone()
    }
}

// Records every millisecond delay instead of sleeping
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub delays_ms: Rc<RefCell<Vec<u32>>>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.borrow_mut().push(ms);
    }
}
