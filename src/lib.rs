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
//! Ambient sound and light telemetry for an ESP32.
//!
//! Every few seconds the firmware samples a KY-037 microphone and an LDR,
//! logs the qualitative noise and light levels, and posts the raw readings
//! as JSON to an HTTP collector. Hardware and network access sit behind the
//! traits in [`sensor`] and [`reporter`]; the ESP-IDF implementations are
//! only built with the `firmware` feature.

pub mod classifier;
pub mod configuration;
pub mod errors;
pub mod orchestrator;
pub mod reporter;
pub mod sensor;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod testing;

cfg_if::cfg_if! {
    if #[cfg(feature = "firmware")] {
        pub mod peripherals;
        pub mod services;
    }
}
