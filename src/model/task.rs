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
use serde::{Deserialize, Serialize};

/// https://redfish.dmtf.org/schemas/v1/Task.v1_7_4.json
/// An asynchronous job tracked by TaskService. iDRAC reports progress only in
/// the free-text Messages, not in TaskState, so Messages\[0\].Message is the
/// signal the orchestrator polls.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub task_state: Option<String>,
    pub task_status: Option<String>,
    pub start_time: Option<String>,
    pub messages: Vec<TaskMessage>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskMessage {
    pub message: String,
    pub message_id: Option<String>,
}

impl Task {
    /// First human-readable progress message, empty if the BMC sent none yet.
    pub fn message(&self) -> &str {
        self.messages.first().map(|m| m.message.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_task_scheduled() {
        let data = include_str!("testdata/task_scheduled.json");
        let result: super::Task = serde_json::from_str(data).unwrap();
        assert_eq!(result.id, "JID_471269252011");
        assert_eq!(result.message(), "Task successfully scheduled.");
    }

    #[test]
    fn test_task_completed() {
        let data = include_str!("testdata/task_completed.json");
        let result: super::Task = serde_json::from_str(data).unwrap();
        assert_eq!(
            result.message(),
            "The specified job has completed successfully."
        );
        assert_eq!(result.task_state.as_deref(), Some("Completed"));
    }

    #[test]
    fn test_task_without_messages() {
        let result: super::Task = serde_json::from_str(r#"{"Id": "JID_1"}"#).unwrap();
        assert_eq!(result.message(), "");
    }
}
