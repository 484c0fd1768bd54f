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

//! Firmware update orchestration for Dell iDRAC BMCs over Redfish.
//!
//! Submits a SimpleUpdate job pointing at a network-hosted image, polls the
//! TaskService job it creates, and optionally power-cycles the system so the
//! scheduled job applies. See [`Updater`] for the flow, [`poll`] for how the
//! BMC's free-text progress messages are classified.

pub mod model;
pub mod poll;
pub mod update;

mod error;
mod network;

pub use error::RedfishError;
pub use model::system::{ComputerSystem, PowerState, SystemPowerControl};
pub use model::task::Task;
pub use model::update_service::{
    FirmwareInventory, SoftwareInventory, TransferProtocolType, UpdateService,
};
pub use network::{
    Auth, ClientBuilder, Endpoint, PostOutcome, RedfishHttpClient, Transport, REDFISH_ENDPOINT,
};
pub use poll::{Phase, TaskOutcome};
pub use update::{
    PollWindow, RebootPolicy, TaskHandle, Timing, UpdateOutcome, Updater, DELL_SYSTEM_ID,
};

/// Connection settings for one BMC, the way the CLI hands them over.
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Hostname or IP address of the BMC Redfish API
    pub endpoint: String,
    /// Port, if not the default HTTPS 443
    pub port: Option<u16>,
    pub auth: Auth,
    /// Accept self-signed BMC certificates. Off unless the caller opts in.
    pub accept_invalid_certs: bool,
}

/// Build an [`Updater`] over a blocking HTTP client for the given BMC.
pub fn new(conf: NetworkConfig) -> Result<Updater<RedfishHttpClient>, RedfishError> {
    let mut builder = RedfishHttpClient::builder();
    if conf.accept_invalid_certs {
        builder = builder.accept_invalid_certs();
    }
    let client = builder.build(Endpoint {
        host: conf.endpoint,
        port: conf.port,
        auth: conf.auth,
    })?;
    Ok(Updater::new(client))
}
