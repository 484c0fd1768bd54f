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
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::RedfishError;

/// https://redfish.dmtf.org/schemas/v1/UpdateService.v1_14_0.json
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateService {
    pub http_push_uri: String,
    pub actions: UpdateServiceActions,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UpdateServiceActions {
    #[serde(rename = "#UpdateService.SimpleUpdate")]
    pub simple_update: SimpleUpdateAction,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SimpleUpdateAction {
    #[serde(rename = "target")]
    pub target: String,
    #[serde(rename = "TransferProtocol@Redfish.AllowableValues")]
    pub transfer_protocol_allowable_values: Vec<String>,
}

impl UpdateService {
    /// The transfer protocols this particular BMC firmware accepts for
    /// SimpleUpdate. Varies between iDRAC releases.
    pub fn supported_protocols(&self) -> &[String] {
        &self
            .actions
            .simple_update
            .transfer_protocol_allowable_values
    }
}

/// The network protocol the BMC uses to fetch the image from the given URI.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TransferProtocolType {
    CIFS,
    FTP,
    SFTP,
    HTTP,
    HTTPS,
    SCP,
    TFTP,
    NFS,
}

impl fmt::Display for TransferProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for TransferProtocolType {
    type Err = RedfishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use TransferProtocolType::*;
        match s.to_ascii_uppercase().as_str() {
            "CIFS" => Ok(CIFS),
            "FTP" => Ok(FTP),
            "SFTP" => Ok(SFTP),
            "HTTP" => Ok(HTTP),
            "HTTPS" => Ok(HTTPS),
            "SCP" => Ok(SCP),
            "TFTP" => Ok(TFTP),
            "NFS" => Ok(NFS),
            other => Err(RedfishError::InvalidInput(format!(
                "unknown transfer protocol {other:?}"
            ))),
        }
    }
}

/// One entry of UpdateService/FirmwareInventory
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct SoftwareInventory {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub updateable: bool,
}

/// FirmwareInventory collection fetched with $expand so members arrive inline
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct FirmwareInventory {
    pub description: String,
    pub members: Vec<SoftwareInventory>,
    pub name: String,
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::TransferProtocolType;

    #[test]
    fn test_update_service_parser() {
        let data = include_str!("testdata/update_service.json");
        let result: super::UpdateService = serde_json::from_str(data).unwrap();
        assert!(result
            .supported_protocols()
            .iter()
            .any(|p| p == "HTTP"));
        assert!(result
            .actions
            .simple_update
            .target
            .ends_with("UpdateService.SimpleUpdate"));
    }

    #[test]
    fn test_firmware_inventory_parser() {
        let data = include_str!("testdata/firmware_inventory.json");
        let result: super::FirmwareInventory = serde_json::from_str(data).unwrap();
        assert_eq!(result.members.len(), 2);
        assert_eq!(
            result.members[0].version.as_deref(),
            Some("4.40.00.00")
        );
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!(
            TransferProtocolType::from_str("nfs").unwrap(),
            TransferProtocolType::NFS
        );
        assert_eq!(
            TransferProtocolType::from_str("HTTP").unwrap(),
            TransferProtocolType::HTTP
        );
        assert!(TransferProtocolType::from_str("gopher").is_err());
    }
}
