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

//! Classification of iDRAC job progress messages.
//!
//! The BMC reports job progress only as free-text human-readable messages,
//! never a structured state enum, so the client keeps its own table of
//! (substring/exact match -> outcome) rules. Substring matching is brittle
//! but it is the contract with the current iDRAC message set; keep the table
//! in sync with the firmware, do not invent new states.

use std::time::Duration;

/// The two polling windows of an update run. Messages classify differently
/// per phase: "Task successfully scheduled." is terminal only before the
/// reboot, and the duplicate-job failure marker only applies there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreReboot,
    PostReboot,
}

/// What a poll of the task resource concluded. A pending job never escapes
/// the poll loop, so there is no Pending here; see [`MessageClass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Job accepted; it applies on the next reboot. Pre-reboot phase only.
    Scheduled,
    /// Job finished. Carries the time spent polling in the current phase.
    Completed(Duration),
    /// Terminal failure message from the BMC.
    Failed(String),
    /// The phase deadline passed without a terminal message.
    TimedOut,
}

/// Per-message classification, before the poll loop applies its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Failed,
    Scheduled,
    Completed,
    Pending,
}

// Case-insensitive failure markers checked in both phases. "fail" also
// covers "failed".
const FAILURE_MARKERS: &[&str] = &["fail", "unable"];

// iDRAC answers this when an equivalent job already sits in the queue.
// Checked pre-reboot only; the original tooling never matched it after the
// reboot and the asymmetry is preserved as-is.
const DUPLICATE_JOB_MARKER: &str = "job for this device is already present";

const SCHEDULED_MESSAGE: &str = "Task successfully scheduled.";

const COMPLETED_MESSAGE: &str = "The specified job has completed successfully.";

/// Classify one progress message. Rules are checked in precedence order:
/// failure markers, then the exact scheduled message (pre-reboot only), then
/// completion (exact phrase or "complete" substring), otherwise pending.
pub fn classify(phase: Phase, message: &str) -> MessageClass {
    let lower = message.to_lowercase();

    if FAILURE_MARKERS.iter().any(|m| lower.contains(m)) {
        return MessageClass::Failed;
    }
    if phase == Phase::PreReboot && lower.contains(DUPLICATE_JOB_MARKER) {
        return MessageClass::Failed;
    }

    if phase == Phase::PreReboot && message == SCHEDULED_MESSAGE {
        return MessageClass::Scheduled;
    }

    if message == COMPLETED_MESSAGE || lower.contains("complete") {
        return MessageClass::Completed;
    }

    MessageClass::Pending
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_failure_markers_any_case() {
        for msg in [
            "Job failed.",
            "Task Failed validation",
            "Unable to verify the firmware image.",
            "unable to reach the share",
            "FAIL",
        ] {
            assert_eq!(classify(Phase::PreReboot, msg), MessageClass::Failed);
            assert_eq!(classify(Phase::PostReboot, msg), MessageClass::Failed);
        }
    }

    #[test]
    fn test_failure_wins_over_other_substrings() {
        // "complete" also appears, failure still takes precedence
        let msg = "Unable to complete the operation";
        assert_eq!(classify(Phase::PreReboot, msg), MessageClass::Failed);
        assert_eq!(classify(Phase::PostReboot, msg), MessageClass::Failed);
    }

    #[test]
    fn test_duplicate_job_pre_reboot_only() {
        let msg = "Job for this device is already present.";
        assert_eq!(classify(Phase::PreReboot, msg), MessageClass::Failed);
        // Post-reboot deliberately does not know this marker
        assert_eq!(classify(Phase::PostReboot, msg), MessageClass::Pending);
    }

    #[test]
    fn test_scheduled_exact_match_pre_reboot() {
        assert_eq!(
            classify(Phase::PreReboot, "Task successfully scheduled."),
            MessageClass::Scheduled
        );
        // Near-misses stay pending
        assert_eq!(
            classify(Phase::PreReboot, "Task successfully scheduled"),
            MessageClass::Pending
        );
        assert_eq!(
            classify(Phase::PreReboot, "task successfully scheduled."),
            MessageClass::Pending
        );
    }

    #[test]
    fn test_scheduled_not_terminal_post_reboot() {
        assert_eq!(
            classify(Phase::PostReboot, "Task successfully scheduled."),
            MessageClass::Pending
        );
    }

    #[test]
    fn test_completed() {
        assert_eq!(
            classify(
                Phase::PostReboot,
                "The specified job has completed successfully."
            ),
            MessageClass::Completed
        );
        assert_eq!(
            classify(Phase::PostReboot, "Job completed."),
            MessageClass::Completed
        );
        assert_eq!(
            classify(Phase::PreReboot, "Firmware install Complete"),
            MessageClass::Completed
        );
    }

    #[test]
    fn test_pending() {
        for msg in [
            "Downloading the firmware image.",
            "Installing firmware, 42 percent.",
            "",
        ] {
            assert_eq!(classify(Phase::PreReboot, msg), MessageClass::Pending);
            assert_eq!(classify(Phase::PostReboot, msg), MessageClass::Pending);
        }
    }
}
