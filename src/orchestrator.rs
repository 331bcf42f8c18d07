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
use crate::classifier;
use crate::configuration::TelemetryConfig;
use crate::errors::{DeliveryError, LinkError, SensorError};
use crate::reporter::{Delivery, HttpConnector, NetworkLink, NetworkReporter};
use crate::sensor::SampleSource;
use crate::state::{LightLevel, LoopState, NoiseLevel, SensorSample};
use crate::telemetry;
use core::time::Duration;
use embedded_hal::delay::DelayNs;
use log::*;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CycleOutcome {
    Delivered {
        sample: SensorSample,
        noise: NoiseLevel,
        light: LightLevel,
        delivery: Delivery,
    },
    DeliveryFailed(DeliveryError),
    SampleDiscarded(SensorError),
}

// Drives the device: associate once, then sample and report every
// `report_interval` for as long as the device is powered.
pub struct Orchestrator<R, N, C, D> {
    config: TelemetryConfig,
    reader: R,
    reporter: NetworkReporter<N, C>,
    delay: D,
    state: LoopState,
}

impl<R, N, C, D> Orchestrator<R, N, C, D>
where
    R: SampleSource,
    N: NetworkLink,
    C: HttpConnector,
    D: DelayNs,
{
    pub fn new(
        config: TelemetryConfig,
        reader: R,
        reporter: NetworkReporter<N, C>,
        delay: D,
    ) -> Self {
        Self {
            config,
            reader,
            reporter,
            delay,
            state: LoopState::Initializing,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    // Blocks until the station is associated, polling without a timeout
    pub fn initialize(&mut self) -> Result<(), LinkError> {
        info!("Connecting to WiFi {}", self.config.wifi.ssid);
        self.reporter.link_mut().begin(&self.config.wifi)?;

        let mut polls: u32 = 0;
        while !self.reporter.link().connection_state().is_connected() {
            self.delay.delay_ms(millis(self.config.association_poll));
            polls = polls.saturating_add(1);
            debug!("waiting for WiFi association, poll {polls}");
        }

        info!("Connected to WiFi");
        if let Some(ip) = self.reporter.link().local_ip() {
            info!("IP address: {ip}");
        }
        self.state = LoopState::Running;

        Ok(())
    }

    // One iteration. The report interval is always waited out, whatever
    // happened to the sample or the delivery.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.sample_and_report();
        self.delay.delay_ms(millis(self.config.report_interval));
        outcome
    }

    // Settles after power up, then retries the association until it
    // succeeds. Returns in `LoopState::Running`.
    pub fn start(&mut self) {
        self.delay.delay_ms(millis(self.config.startup_delay));

        while self.state == LoopState::Initializing {
            if let Err(err) = self.initialize() {
                error!("Starting WiFi association failed: {err}");
                self.delay.delay_ms(millis(self.config.association_poll));
            }
        }
    }

    pub fn run(mut self) -> ! {
        self.start();

        loop {
            self.run_cycle();
        }
    }

    fn sample_and_report(&mut self) -> CycleOutcome {
        let sample = match self.reader.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                warn!("{err}, sample discarded");
                return CycleOutcome::SampleDiscarded(err);
            }
        };

        let (noise, light) = classifier::classify(&sample, &self.config.noise, &self.config.light);
        info!("==================================");
        info!("Sound: {} -> {}", sample.sound_raw, noise);
        info!("Light: {} -> {}", sample.light_raw, light);

        let payload = telemetry::encode(&sample);
        match self.reporter.report(&payload, &self.config.collector_url) {
            Ok(delivery) => {
                info!("Collector responded (HTTP {}):", delivery.status);
                info!("{}", delivery.body);
                CycleOutcome::Delivered {
                    sample,
                    noise,
                    light,
                    delivery,
                }
            }
            Err(err @ DeliveryError::NoConnection) => {
                warn!("{err}");
                CycleOutcome::DeliveryFailed(err)
            }
            Err(err @ DeliveryError::TransportFailure(_)) => {
                error!("{err}");
                CycleOutcome::DeliveryFailed(err)
            }
        }
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::WifiCredentials;
    use crate::state::Channel;
    use crate::testing::*;

    const ENDPOINT: &str = "http://192.168.2.119:4000/api/sensores";

    fn config() -> TelemetryConfig {
        TelemetryConfig {
            wifi: WifiCredentials::new("DIRECCION", "DREHCO0123456789*"),
            collector_url: ENDPOINT.into(),
            ..Default::default()
        }
    }

    fn orchestrator(
        sample: Result<SensorSample, SensorError>,
        link: FakeLink,
        connector: FakeConnector,
        delay: &RecordingDelay,
    ) -> Orchestrator<FixedSamples, FakeLink, FakeConnector, RecordingDelay> {
        Orchestrator::new(
            config(),
            FixedSamples::new(sample),
            NetworkReporter::new(link, connector),
            delay.clone(),
        )
    }

    #[test]
    fn initialize_polls_until_associated() {
        let transport = TransportLog::default();
        let delay = RecordingDelay::default();
        let link = FakeLink::connected_after(3);
        let credentials = link.credentials.clone();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(0, 0)),
            link,
            FakeConnector::answering(&transport, 200, ""),
            &delay,
        );
        assert_eq!(orchestrator.state(), LoopState::Initializing);

        orchestrator.initialize().unwrap();

        assert_eq!(orchestrator.state(), LoopState::Running);
        assert_eq!(delay.delays_ms.borrow().as_slice(), [500, 500, 500]);
        assert_eq!(
            credentials.borrow().as_slice(),
            [WifiCredentials::new("DIRECCION", "DREHCO0123456789*")]
        );
        assert_eq!(transport.transport_calls(), 0);
    }

    #[test]
    fn initialize_does_not_wait_when_already_associated() {
        let delay = RecordingDelay::default();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(0, 0)),
            FakeLink::connected(),
            FakeConnector::answering(&TransportLog::default(), 200, ""),
            &delay,
        );

        orchestrator.initialize().unwrap();

        assert!(delay.delays_ms.borrow().is_empty());
    }

    #[test]
    fn failed_association_start_keeps_initializing() {
        let delay = RecordingDelay::default();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(0, 0)),
            FakeLink::refusing_to_start(LinkError::InvalidCredentials),
            FakeConnector::answering(&TransportLog::default(), 200, ""),
            &delay,
        );

        assert_eq!(
            orchestrator.initialize(),
            Err(LinkError::InvalidCredentials)
        );
        assert_eq!(orchestrator.state(), LoopState::Initializing);
    }

    #[test]
    fn start_retries_a_refused_association() {
        let transport = TransportLog::default();
        let delay = RecordingDelay::default();
        let link = FakeLink::refusing_to_start_times(LinkError::Driver(12308), 2);
        let credentials = link.credentials.clone();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(0, 0)),
            link,
            FakeConnector::answering(&transport, 200, ""),
            &delay,
        );

        orchestrator.start();

        assert_eq!(orchestrator.state(), LoopState::Running);
        assert_eq!(credentials.borrow().len(), 3);
        assert_eq!(delay.delays_ms.borrow().as_slice(), [1000, 500, 500]);
        assert_eq!(transport.transport_calls(), 0);
    }

    #[test]
    fn end_to_end_cycle() {
        let transport = TransportLog::default();
        let delay = RecordingDelay::default();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(500, 1200)),
            FakeLink::connected(),
            FakeConnector::answering(&transport, 201, "Datos insertados correctamente"),
            &delay,
        );
        orchestrator.initialize().unwrap();

        let outcome = orchestrator.run_cycle();

        assert_eq!(
            outcome,
            CycleOutcome::Delivered {
                sample: SensorSample::new(500, 1200),
                noise: NoiseLevel::Low,
                light: LightLevel::Normal,
                delivery: Delivery {
                    status: 201,
                    body: "Datos insertados correctamente".into()
                },
            }
        );
        assert_eq!(
            transport.payloads.borrow().as_slice(),
            [r#"{"light": 1200, "sound": 500}"#]
        );
        assert_eq!(transport.endpoints.borrow().as_slice(), [ENDPOINT]);
        assert_eq!(transport.released.get(), 1);
        assert_eq!(delay.delays_ms.borrow().as_slice(), [5000]);
    }

    #[test]
    fn transport_failure_keeps_the_cadence() {
        let transport = TransportLog::default();
        let delay = RecordingDelay::default();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(1600, 3500)),
            FakeLink::connected(),
            FakeConnector::answering(&transport, -1, ""),
            &delay,
        );
        orchestrator.initialize().unwrap();

        for _ in 0..2 {
            assert_eq!(
                orchestrator.run_cycle(),
                CycleOutcome::DeliveryFailed(DeliveryError::TransportFailure(-1))
            );
        }

        assert_eq!(transport.posts.get(), 2);
        assert_eq!(transport.released.get(), 2);
        assert_eq!(delay.delays_ms.borrow().as_slice(), [5000, 5000]);
    }

    #[test]
    fn lost_connection_skips_the_send() {
        let transport = TransportLog::default();
        let delay = RecordingDelay::default();
        let link = FakeLink::disconnected();
        let queries = link.queries.clone();
        let mut orchestrator = orchestrator(
            Ok(SensorSample::new(900, 100)),
            link,
            FakeConnector::answering(&transport, 200, ""),
            &delay,
        );

        assert_eq!(
            orchestrator.run_cycle(),
            CycleOutcome::DeliveryFailed(DeliveryError::NoConnection)
        );
        assert_eq!(queries.get(), 1);
        assert_eq!(transport.transport_calls(), 0);
        assert_eq!(delay.delays_ms.borrow().as_slice(), [5000]);
    }

    #[test]
    fn bad_sample_is_discarded_without_sending() {
        let transport = TransportLog::default();
        let delay = RecordingDelay::default();
        let err = SensorError::OutOfRange {
            channel: Channel::Sound,
            raw: 5000,
        };
        let mut orchestrator = orchestrator(
            Err(err.clone()),
            FakeLink::connected(),
            FakeConnector::answering(&transport, 200, ""),
            &delay,
        );

        assert_eq!(orchestrator.run_cycle(), CycleOutcome::SampleDiscarded(err));
        assert_eq!(transport.transport_calls(), 0);
        assert_eq!(delay.delays_ms.borrow().as_slice(), [5000]);
    }

    #[test]
    fn long_intervals_saturate() {
        assert_eq!(millis(Duration::from_secs(5)), 5000);
        assert_eq!(millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
