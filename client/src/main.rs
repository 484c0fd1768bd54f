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

/* iDRAC firmware update client
 *
 * USAGE: ./fwupdate -H 10.153.145.103 -U TheBMCUsername -P TheBMCPassword \
 *     -f http://10.0.0.5/bios.exe -t HTTP -r y
 * -H: IP address of the BMC's Redfish API. Should be HTTPS on port 443.
 * Run with no params for help.
 * Run with `-v` for more output.
 */

use std::str::FromStr;

use anyhow::anyhow;
use libfwupdate::{Auth, RebootPolicy, TransferProtocolType, UpdateOutcome};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

fn main() -> Result<(), anyhow::Error> {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = getopts::Options::new();
    let mut conf = libfwupdate::NetworkConfig::default();

    opts.optflag("h", "help", "Print this help");
    opts.optflag("v", "verbose", "Log at DEBUG level. Default is INFO");
    opts.optopt(
        "H",
        "hostname",
        "Required. Hostname or IP address of BMC Redfish API",
        "HOST",
    );
    opts.optopt("U", "username", "BMC username", "USER");
    opts.optopt("P", "password", "BMC password", "PASS");
    opts.optopt(
        "T",
        "token",
        "BMC session token, instead of username/password",
        "TOKEN",
    );
    opts.optflag(
        "k",
        "insecure",
        "Accept self-signed BMC TLS certificates",
    );
    opts.optflag(
        "g",
        "get-inventory",
        "Print the firmware inventory and exit",
    );
    opts.optflag(
        "s",
        "supported-protocols",
        "Print the transfer protocols this BMC supports and exit",
    );
    opts.optopt(
        "f",
        "image-uri",
        "URI of the firmware image the BMC should fetch",
        "URI",
    );
    opts.optopt(
        "t",
        "transfer-protocol",
        "Protocol for fetching the image: NFS, CIFS, HTTP, HTTPS, FTP or TFTP",
        "PROTO",
    );
    opts.optopt(
        "r",
        "reboot",
        "Reboot now to apply the update: y or n. Anything else leaves the job scheduled",
        "Y_OR_N",
    );

    let args_given = opts.parse(&args[1..])?;
    if args_given.opt_present("h") || !args_given.opt_present("H") {
        eprintln!(
            "{}",
            opts.usage("fwupdate -H bmc_ip -U bmc_user -P bmc_pass -f image_uri -t proto -r y|n")
        );
        return Ok(());
    }
    conf.endpoint = args_given.opt_str("H").unwrap();
    conf.auth = match (args_given.opt_str("U"), args_given.opt_str("T")) {
        (Some(_), Some(_)) => {
            return Err(anyhow!("-U and -T are mutually exclusive"));
        }
        (Some(user), None) => Auth::Basic {
            user,
            password: args_given.opt_str("P"),
        },
        (None, Some(token)) => Auth::SessionToken(token),
        (None, None) => Auth::None,
    };
    conf.accept_invalid_certs = args_given.opt_present("k");

    let log_level = if args_given.opt_present("v") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(log_level.into())
        .add_directive("hyper=warn".parse().unwrap());
    tracing_subscriber::registry()
        .with(Layer::default().compact())
        .with(env_filter)
        .init();

    let updater = libfwupdate::new(conf)?;

    if args_given.opt_present("g") {
        let inventory = updater.get_firmware_inventory()?;
        for entry in &inventory.members {
            info!(
                "{}: {} (updateable: {})",
                entry.name,
                entry.version.as_deref().unwrap_or("unknown"),
                entry.updateable
            );
        }
        return Ok(());
    }

    if args_given.opt_present("s") {
        let service = updater.get_update_service()?;
        for proto in service.supported_protocols() {
            info!("{proto}");
        }
        return Ok(());
    }

    let image_uri = args_given
        .opt_str("f")
        .ok_or_else(|| anyhow!("-f image_uri is required to start an update"))?;
    let protocol = TransferProtocolType::from_str(
        &args_given
            .opt_str("t")
            .ok_or_else(|| anyhow!("-t transfer_protocol is required to start an update"))?,
    )?;
    let policy = RebootPolicy::parse(&args_given.opt_str("r").unwrap_or_default());

    match updater.run_update(&image_uri, protocol, policy)? {
        UpdateOutcome::Completed { elapsed } => {
            info!("Firmware update completed in {elapsed:?}");
        }
        UpdateOutcome::Deferred { task_id } => {
            info!("Job {task_id} stays scheduled until the next reboot");
        }
    }

    Ok(())
}
