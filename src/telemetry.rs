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
use crate::state::SensorSample;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::io;

// Body of the POST request. The collector reads exactly these two keys,
// so names and order are part of the wire contract.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub light: u16,
    pub sound: u16,
}

impl From<&SensorSample> for TelemetryPayload {
    fn from(sample: &SensorSample) -> Self {
        Self {
            light: sample.light_raw,
            sound: sample.sound_raw,
        }
    }
}

impl TelemetryPayload {
    // Renders `{"light": <int>, "sound": <int>}`
    pub fn to_json(&self) -> String {
        let mut buf = Vec::with_capacity(32);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, WireFormatter);

        // Two integers into a Vec: neither the writer nor the formatter can fail
        self.serialize(&mut serializer)
            .expect("serializing telemetry into memory should not fail");

        String::from_utf8(buf).expect("serde_json only emits UTF-8")
    }
}

pub fn encode(sample: &SensorSample) -> String {
    TelemetryPayload::from(sample).to_json()
}

// Compact JSON with a single space after every colon and comma
struct WireFormatter;

impl Formatter for WireFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn wire_format() {
        let sample = SensorSample::new(500, 1200);

        assert_eq!(encode(&sample), r#"{"light": 1200, "sound": 500}"#);
    }

    #[test]
    fn payload_has_exactly_light_and_sound() {
        for sample in [
            SensorSample::new(0, 0),
            SensorSample::new(4095, 0),
            SensorSample::new(1499, 3000),
        ] {
            let value: Value = serde_json::from_str(&encode(&sample)).unwrap();
            let object = value.as_object().unwrap();

            assert_eq!(object.len(), 2);
            assert_eq!(object["light"], Value::from(sample.light_raw));
            assert_eq!(object["sound"], Value::from(sample.sound_raw));
        }
    }

    #[test]
    fn payload_parses_back_into_the_record() {
        let sample = SensorSample::new(812, 2999);
        let payload: TelemetryPayload = serde_json::from_str(&encode(&sample)).unwrap();

        assert_eq!(payload, TelemetryPayload::from(&sample));
    }

    #[test]
    fn encoding_is_deterministic() {
        let sample = SensorSample::new(1024, 2048);

        assert_eq!(encode(&sample).as_bytes(), encode(&sample).as_bytes());
    }
}
