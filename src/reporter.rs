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
//! One-shot delivery of a telemetry payload to the collector.
//!
//! Each call opens its own HTTP session and the session is closed again when
//! the value is dropped, on every path out of [`NetworkReporter::report`].
//! There is no retry and no queue: a failed delivery is lost.

use crate::configuration::WifiCredentials;
use crate::errors::{DeliveryError, LinkError};
use crate::state::ConnectionState;
use log::*;
use std::net::Ipv4Addr;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Station side of the WiFi connection.
pub trait NetworkLink {
    /// Starts associating with the access point. Does not wait for the
    /// association to complete.
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), LinkError>;

    fn connection_state(&self) -> ConnectionState;

    fn local_ip(&self) -> Option<Ipv4Addr>;
}

/// A single HTTP exchange bound to one endpoint. Dropping the session
/// releases the underlying connection.
pub trait HttpSession {
    fn add_header(&mut self, name: &str, value: &str);

    /// Sends `body` and blocks until the response arrived. A positive value
    /// is the HTTP status, zero or a negative value is a transport error code.
    fn post(&mut self, body: &[u8]) -> i32;

    fn response_body(&mut self) -> String;
}

pub trait HttpConnector {
    type Session: HttpSession;

    /// Opens a session for `endpoint`. The error is a negative transport code.
    fn open(&mut self, endpoint: &str) -> Result<Self::Session, i32>;
}

/// Response bytes kept per delivery. Anything beyond is read and dropped.
pub const MAX_RESPONSE_BODY: usize = 1024;

/// Collects a response body from arbitrarily split reads and decodes it once.
#[derive(Debug)]
pub struct ResponseBody {
    bytes: Vec<u8>,
    limit: usize,
    discarded: usize,
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::with_limit(MAX_RESPONSE_BODY)
    }
}

impl ResponseBody {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            discarded: 0,
        }
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.bytes.len());
        let keep = chunk.len().min(room);
        self.bytes.extend_from_slice(&chunk[..keep]);
        self.discarded += chunk.len() - keep;
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn into_string(mut self) -> String {
        // A character cut in half by the limit is dropped, not replaced
        if self.discarded > 0 {
            if let Err(err) = core::str::from_utf8(&self.bytes) {
                if err.error_len().is_none() {
                    self.bytes.truncate(err.valid_up_to());
                }
            }
        }
        match String::from_utf8(self.bytes) {
            Ok(body) => body,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

/// Maps a driver error code onto the negative range reported by
/// [`HttpSession::post`].
pub fn transport_failure_code(code: i32) -> i32 {
    -code.saturating_abs()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delivery {
    pub status: i32,
    pub body: String,
}

pub struct NetworkReporter<N, C> {
    link: N,
    connector: C,
}

impl<N, C> NetworkReporter<N, C>
where
    N: NetworkLink,
    C: HttpConnector,
{
    pub fn new(link: N, connector: C) -> Self {
        Self { link, connector }
    }

    pub fn link(&self) -> &N {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut N {
        &mut self.link
    }

    /// Posts `payload` to `endpoint`.
    ///
    /// Any response counts as delivered, whatever its status class; only a
    /// transport level failure is an error.
    pub fn report(&mut self, payload: &str, endpoint: &str) -> Result<Delivery, DeliveryError> {
        if !self.link.connection_state().is_connected() {
            return Err(DeliveryError::NoConnection);
        }

        let mut session = self
            .connector
            .open(endpoint)
            .map_err(DeliveryError::TransportFailure)?;
        session.add_header(CONTENT_TYPE, APPLICATION_JSON);

        let code = session.post(payload.as_bytes());
        if code > 0 {
            let body = session.response_body();
            debug!("POST {endpoint} answered with {code}");
            Ok(Delivery { status: code, body })
        } else {
            Err(DeliveryError::TransportFailure(code))
        }
    }
}
