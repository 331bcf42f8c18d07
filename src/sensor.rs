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
use crate::errors::SensorError;
use crate::state::{Channel, SensorSample, ADC_MAX};
use core::fmt::Debug;

// One analog input. The firmware implements this for the ESP-IDF one-shot
// ADC channel driver, see services.rs.
pub trait AnalogSource {
    type Error: Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

pub trait SampleSource {
    fn read_sample(&mut self) -> Result<SensorSample, SensorError>;
}

// KY-037 microphone and LDR, each on its own ADC channel
pub struct SensorReader<S, L> {
    sound: S,
    light: L,
}

impl<S, L> SensorReader<S, L>
where
    S: AnalogSource,
    L: AnalogSource,
{
    pub fn new(sound: S, light: L) -> Self {
        Self { sound, light }
    }
}

impl<S, L> SampleSource for SensorReader<S, L>
where
    S: AnalogSource,
    L: AnalogSource,
{
    // Out of range values are reported, never clamped. The caller drops the
    // whole sample in that case.
    fn read_sample(&mut self) -> Result<SensorSample, SensorError> {
        let sound_raw = acquire(&mut self.sound, Channel::Sound)?;
        let light_raw = acquire(&mut self.light, Channel::Light)?;

        Ok(SensorSample {
            sound_raw,
            light_raw,
        })
    }
}

fn acquire<A: AnalogSource>(source: &mut A, channel: Channel) -> Result<u16, SensorError> {
    let raw = source
        .read_raw()
        .map_err(|err| SensorError::ReadFailed {
            channel,
            reason: format!("{err:?}"),
        })?;

    if raw > ADC_MAX {
        return Err(SensorError::OutOfRange { channel, raw });
    }

    Ok(raw)
}
