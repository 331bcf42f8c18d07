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
//! Mapping of raw ADC readings onto qualitative levels.
//!
//! Both classifiers use half-open bands: a reading equal to a boundary
//! belongs to the upper band. The levels are only used for the local
//! diagnostic output, the collector receives the raw values.

use crate::configuration::{LightThresholds, NoiseThresholds};
use crate::state::{LightLevel, NoiseLevel, SensorSample};

pub fn classify_noise(raw: u16, thresholds: &NoiseThresholds) -> NoiseLevel {
    if raw < thresholds.low {
        NoiseLevel::Low
    } else if raw < thresholds.moderate {
        NoiseLevel::Moderate
    } else {
        NoiseLevel::High
    }
}

pub fn classify_light(raw: u16, thresholds: &LightThresholds) -> LightLevel {
    if raw < thresholds.low {
        LightLevel::Dark
    } else if raw < thresholds.high {
        LightLevel::Normal
    } else {
        LightLevel::Bright
    }
}

pub fn classify(
    sample: &SensorSample,
    noise: &NoiseThresholds,
    light: &LightThresholds,
) -> (NoiseLevel, LightLevel) {
    (
        classify_noise(sample.sound_raw, noise),
        classify_light(sample.light_raw, light),
    )
}
