/*
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */

//! The update orchestrator: submits a SimpleUpdate job, polls the task
//! resource until terminal, and drives the power-cycle that applies a
//! scheduled job. One job per run, blocking I/O throughout.

use std::{collections::HashMap, thread, time::Duration, time::Instant};

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::model::task::Task;
use crate::model::update_service::{FirmwareInventory, TransferProtocolType, UpdateService};
use crate::model::{ComputerSystem, PowerState, SystemPowerControl};
use crate::poll::{classify, MessageClass, Phase, TaskOutcome};
use crate::{network::Transport, RedfishError};

/// iDRAC names its one managed system this. The standard suggests plain "1"
/// but this crate targets Dell only.
pub const DELL_SYSTEM_ID: &str = "System.Embedded.1";

/// One polling window: how often to ask, and for how long in total.
#[derive(Debug, Clone, Copy)]
pub struct PollWindow {
    pub interval: Duration,
    pub timeout: Duration,
}

/// All the fixed waits of an update run. The defaults are what iDRAC needs
/// in practice; tests inject zeros so nothing actually sleeps.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Download/verify/schedule phase. The job usually schedules within a
    /// couple of minutes; slow shares can take much longer.
    pub pre_reboot: PollWindow,
    /// Install phase after the reboot. BIOS images are the slow ones.
    pub post_reboot: PollWindow,
    /// Grace period after issuing any reset action before trusting reads
    pub reset_settle: Duration,
    /// Spacing of power-state reads while waiting for GracefulShutdown
    pub power_check_interval: Duration,
    /// How many power-state reads before falling back to ForceOff
    pub power_check_attempts: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            pre_reboot: PollWindow {
                interval: Duration::from_secs(5),
                timeout: Duration::from_secs(30 * 60),
            },
            post_reboot: PollWindow {
                interval: Duration::from_secs(30),
                timeout: Duration::from_secs(50 * 60),
            },
            reset_settle: Duration::from_secs(15),
            power_check_interval: Duration::from_secs(60),
            power_check_attempts: 5,
        }
    }
}

impl Timing {
    /// No sleeping at all. Test use only, a real BMC needs the settle waits.
    pub fn immediate() -> Self {
        Timing {
            pre_reboot: PollWindow {
                interval: Duration::ZERO,
                timeout: Duration::from_secs(30 * 60),
            },
            post_reboot: PollWindow {
                interval: Duration::ZERO,
                timeout: Duration::from_secs(50 * 60),
            },
            reset_settle: Duration::ZERO,
            power_check_interval: Duration::ZERO,
            power_check_attempts: 5,
        }
    }
}

/// An update job accepted by the BMC, identified by the opaque id from the
/// Location header (e.g. "JID_471269252011"). The job itself lives on the
/// BMC; this handle is only ever read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub id: String,
}

/// What to do once the job is scheduled. Parsed from the CLI reboot flag;
/// anything but "y" or "n" is Invalid, which leaves the job scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootPolicy {
    RebootNow,
    DeferReboot,
    Invalid,
}

impl RebootPolicy {
    pub fn parse(flag: &str) -> RebootPolicy {
        match flag {
            "y" => RebootPolicy::RebootNow,
            "n" => RebootPolicy::DeferReboot,
            _ => RebootPolicy::Invalid,
        }
    }
}

/// How a whole update run ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Firmware applied. Elapsed covers the final polling phase only.
    Completed { elapsed: Duration },
    /// Job is scheduled on the BMC and applies on the next (manual) reboot.
    Deferred { task_id: String },
}

/// Orchestrates one firmware update against one BMC. Owns the transport for
/// the duration of a run; at most one job is ever outstanding.
pub struct Updater<T: Transport> {
    client: T,
    system_id: String,
    timing: Timing,
}

impl<T: Transport> Updater<T> {
    pub fn new(client: T) -> Updater<T> {
        Updater {
            client,
            system_id: DELL_SYSTEM_ID.to_string(),
            timing: Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Updater<T> {
        self.timing = timing;
        self
    }

    //
    // Thin pass-throughs
    //

    /// Firmware inventory, expanded one level so versions arrive inline
    pub fn get_firmware_inventory(&self) -> Result<FirmwareInventory, RedfishError> {
        self.client
            .get("UpdateService/FirmwareInventory?$expand=*($levels=1)")
    }

    pub fn get_update_service(&self) -> Result<UpdateService, RedfishError> {
        self.client.get("UpdateService")
    }

    pub fn get_system(&self) -> Result<ComputerSystem, RedfishError> {
        self.client.get(&format!("Systems/{}/", self.system_id))
    }

    pub fn get_power_state(&self) -> Result<PowerState, RedfishError> {
        Ok(self.get_system()?.power_state)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task, RedfishError> {
        self.client.get(&format!("TaskService/Tasks/{task_id}"))
    }

    /// One-shot reset action. iDRAC answers 204 No Content; the server gives
    /// no idempotency guarantee, so callers never repeat an action in a phase.
    pub fn reset(&self, action: SystemPowerControl) -> Result<(), RedfishError> {
        let url = format!("Systems/{}/Actions/ComputerSystem.Reset", self.system_id);
        let mut arg = HashMap::new();
        arg.insert("ResetType", action.to_string());
        self.client.post(&url, arg).map(|_outcome| ())
    }

    //
    // The update flow
    //

    /// POST the SimpleUpdate action. Only 202 Accepted with a Location header
    /// counts as success; the job id is the final path segment of Location.
    pub fn submit_update(
        &self,
        image_uri: &str,
        protocol: TransferProtocolType,
    ) -> Result<TaskHandle, RedfishError> {
        let url = "UpdateService/Actions/UpdateService.SimpleUpdate";
        let mut body = HashMap::new();
        body.insert("ImageURI", image_uri.to_string());
        body.insert("TransferProtocol", protocol.to_string());
        let outcome = self.client.post(url, body)?;
        if outcome.status != StatusCode::ACCEPTED {
            return Err(RedfishError::HTTPErrorCode {
                url: url.to_string(),
                status_code: outcome.status,
            });
        }
        let location = outcome
            .location
            .ok_or_else(|| RedfishError::MissingLocationHeader {
                url: url.to_string(),
            })?;
        let id = location.rsplit('/').next().unwrap_or_default().to_string();
        if id.is_empty() {
            return Err(RedfishError::MissingLocationHeader {
                url: url.to_string(),
            });
        }
        info!("Update job {id} created for image {image_uri} over {protocol}");
        Ok(TaskHandle { id })
    }

    /// Poll the task resource until a terminal outcome for this phase.
    /// Issues at most one GET per interval. The deadline is wall clock,
    /// computed once at phase start; it does not cut short an in-flight
    /// request. A failure message beats the deadline check.
    pub fn poll_task(
        &self,
        task: &TaskHandle,
        phase: Phase,
    ) -> Result<TaskOutcome, RedfishError> {
        let window = match phase {
            Phase::PreReboot => self.timing.pre_reboot,
            Phase::PostReboot => self.timing.post_reboot,
        };
        let started = Instant::now();
        loop {
            let t = self.get_task(&task.id)?;
            let message = t.message().to_string();
            let class = classify(phase, &message);
            if class == MessageClass::Failed {
                return Ok(TaskOutcome::Failed(message));
            }
            if started.elapsed() > window.timeout {
                warn!(
                    "Job {} not terminal after {:?}, giving up",
                    task.id, window.timeout
                );
                return Ok(TaskOutcome::TimedOut);
            }
            match class {
                MessageClass::Scheduled => return Ok(TaskOutcome::Scheduled),
                MessageClass::Completed => {
                    return Ok(TaskOutcome::Completed(started.elapsed()))
                }
                _ => {
                    debug!("Job {} pending: {message}", task.id);
                    thread::sleep(window.interval);
                }
            }
        }
    }

    /// Take the system through off and back on so a scheduled job applies.
    ///
    /// Already-off systems are powered straight up. Otherwise: one
    /// GracefulShutdown, a settle wait, then power-state reads at a fixed
    /// spacing. If the system is still up after the last read, a single
    /// ForceOff is the only fallback; there is no further escalation.
    pub fn power_cycle(&self) -> Result<(), RedfishError> {
        let state = self.get_power_state()?;
        info!("Current power state: {state}");
        if state == PowerState::Off {
            self.reset(SystemPowerControl::On)?;
            info!("System was already off, powering on");
            return Ok(());
        }

        self.reset(SystemPowerControl::GracefulShutdown)?;
        thread::sleep(self.timing.reset_settle);

        let mut powered_off = false;
        for attempt in 1..=self.timing.power_check_attempts {
            let state = self.get_power_state()?;
            debug!(
                "Power check {attempt}/{}: {state}",
                self.timing.power_check_attempts
            );
            if state == PowerState::Off {
                powered_off = true;
                break;
            }
            if attempt < self.timing.power_check_attempts {
                thread::sleep(self.timing.power_check_interval);
            }
        }

        if !powered_off {
            warn!("Graceful shutdown did not complete, forcing power off");
            self.reset(SystemPowerControl::ForceOff)?;
            thread::sleep(self.timing.reset_settle);
        }

        self.reset(SystemPowerControl::On)?;
        info!("Power on issued");
        Ok(())
    }

    /// The whole flow: submit, poll to scheduled/completed, then apply the
    /// reboot policy. Any Failed or TimedOut poll aborts the run with no
    /// compensating action.
    pub fn run_update(
        &self,
        image_uri: &str,
        protocol: TransferProtocolType,
        policy: RebootPolicy,
    ) -> Result<UpdateOutcome, RedfishError> {
        let task = self.submit_update(image_uri, protocol)?;

        match self.poll_task(&task, Phase::PreReboot)? {
            TaskOutcome::Completed(elapsed) => {
                // Some payloads apply immediately, no reboot involved
                info!("Job {} completed in {elapsed:?}", task.id);
                return Ok(UpdateOutcome::Completed { elapsed });
            }
            TaskOutcome::Scheduled => {
                info!("Job {} scheduled, a reboot will apply it", task.id);
            }
            TaskOutcome::Failed(message) => {
                return Err(RedfishError::TaskFailed {
                    task_id: task.id,
                    message,
                });
            }
            TaskOutcome::TimedOut => {
                return Err(RedfishError::TaskTimeout {
                    task_id: task.id,
                    waited: self.timing.pre_reboot.timeout,
                });
            }
        }

        match policy {
            RebootPolicy::DeferReboot => {
                info!(
                    "Reboot deferred; job {} applies on the next manual reboot",
                    task.id
                );
                Ok(UpdateOutcome::Deferred { task_id: task.id })
            }
            RebootPolicy::Invalid => {
                warn!(
                    "Reboot flag not \"y\" or \"n\"; job {} is left scheduled",
                    task.id
                );
                Ok(UpdateOutcome::Deferred { task_id: task.id })
            }
            RebootPolicy::RebootNow => {
                self.power_cycle()?;
                match self.poll_task(&task, Phase::PostReboot)? {
                    TaskOutcome::Completed(elapsed) => {
                        info!("Job {} completed in {elapsed:?}", task.id);
                        Ok(UpdateOutcome::Completed { elapsed })
                    }
                    TaskOutcome::Failed(message) => Err(RedfishError::TaskFailed {
                        task_id: task.id,
                        message,
                    }),
                    TaskOutcome::TimedOut => Err(RedfishError::TaskTimeout {
                        task_id: task.id,
                        waited: self.timing.post_reboot.timeout,
                    }),
                    TaskOutcome::Scheduled => {
                        unreachable!("scheduled is not a post-reboot outcome")
                    }
                }
            }
        }
    }
}
