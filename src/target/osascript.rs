use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::TargetApp;
use crate::error::{AutomationError, AutomationResult};

/// Drives a macOS application through `osascript` and System Events.
#[derive(Debug, Clone)]
pub struct OsaScriptApp {
    app_name: String,
    osascript: PathBuf,
}

impl OsaScriptApp {
    pub fn new(app_name: impl Into<String>, osascript: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            osascript: osascript.into(),
        }
    }

    async fn run(&self, script: &str) -> AutomationResult<String> {
        debug!(app = %self.app_name, "running osascript");
        let output = Command::new(&self.osascript)
            .arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                AutomationError::Script(format!(
                    "failed to spawn {}: {}",
                    self.osascript.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AutomationError::Script(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string())
    }
}

/// Escapes `text` for use inside a double-quoted AppleScript string literal.
pub fn escape_script_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn in_process(app: &str, body: &str) -> String {
    format!(
        "tell application \"System Events\"\n\
         \ttell process \"{}\"\n\
         {}\n\
         \tend tell\n\
         end tell",
        escape_script_string(app),
        body
    )
}

pub(crate) fn is_running_script(app: &str) -> String {
    format!(
        "tell application \"System Events\" to return (exists application process \"{}\")",
        escape_script_string(app)
    )
}

pub(crate) fn launch_script(app: &str) -> String {
    format!("tell application \"{}\" to launch", escape_script_string(app))
}

pub(crate) fn activate_script(app: &str) -> String {
    format!("tell application \"{}\" to activate", escape_script_string(app))
}

pub(crate) fn focus_input_script(app: &str) -> String {
    in_process(
        app,
        "\t\tset frontmost to true\n\
         \t\tset fields to (every UI element of entire contents of window 1 \
         whose role is \"AXTextArea\")\n\
         \t\tif (count of fields) is 0 then error \"input field not found\"\n\
         \t\tset focused of (last item of fields) to true",
    )
}

pub(crate) fn paste_script() -> String {
    "tell application \"System Events\" to keystroke \"v\" using command down".to_string()
}

pub(crate) fn submit_script() -> String {
    "tell application \"System Events\" to key code 36".to_string()
}

pub(crate) fn read_output_script(app: &str) -> String {
    in_process(
        app,
        "\t\tset latest to \"\"\n\
         \t\trepeat with t in (every static text of entire contents of window 1)\n\
         \t\t\tset v to value of t\n\
         \t\t\tif v is not missing value and v is not \"\" then set latest to v\n\
         \t\tend repeat\n\
         \t\treturn latest",
    )
}

/// Binds `navList` to the sidebar outline, so conversation lookups never see
/// toolbar or composer controls.
const FIND_SIDEBAR: &str = "\t\tset outlines to (every UI element of entire contents of window 1 \
     whose role is \"AXOutline\")\n\
     \t\tif (count of outlines) is 0 then error \"sidebar not found\"\n\
     \t\tset navList to item 1 of outlines\n";

pub(crate) fn conversation_labels_script(app: &str) -> String {
    let body = format!(
        "{}\
         \t\tset labels to {{}}\n\
         \t\trepeat with r in (every row of navList)\n\
         \t\t\tset texts to (every static text of entire contents of r)\n\
         \t\t\tif (count of texts) > 0 then\n\
         \t\t\t\tset n to value of item 1 of texts\n\
         \t\t\t\tif n is not missing value and n is not \"\" then copy n to end of labels\n\
         \t\t\tend if\n\
         \t\tend repeat\n\
         \t\tset AppleScript's text item delimiters to linefeed\n\
         \t\treturn labels as text",
        FIND_SIDEBAR
    );
    in_process(app, &body)
}

pub(crate) fn open_conversation_script(app: &str, reference: &str) -> String {
    let body = format!(
        "\t\tset frontmost to true\n\
         {}\
         \t\trepeat with r in (every row of navList)\n\
         \t\t\tset texts to (every static text of entire contents of r)\n\
         \t\t\tif (count of texts) > 0 and value of item 1 of texts is \"{}\" then\n\
         \t\t\t\tset selected of r to true\n\
         \t\t\t\treturn \"true\"\n\
         \t\t\tend if\n\
         \t\tend repeat\n\
         \t\treturn \"false\"",
        FIND_SIDEBAR,
        escape_script_string(reference)
    );
    in_process(app, &body)
}

#[async_trait]
impl TargetApp for OsaScriptApp {
    async fn is_running(&self) -> AutomationResult<bool> {
        let out = self.run(&is_running_script(&self.app_name)).await?;
        Ok(out.trim() == "true")
    }

    async fn launch(&self) -> AutomationResult<()> {
        self.run(&launch_script(&self.app_name)).await.map(|_| ())
    }

    async fn activate(&self) -> AutomationResult<()> {
        self.run(&activate_script(&self.app_name)).await.map(|_| ())
    }

    async fn focus_input(&self) -> AutomationResult<()> {
        self.run(&focus_input_script(&self.app_name)).await.map(|_| ())
    }

    async fn paste(&self) -> AutomationResult<()> {
        self.run(&paste_script()).await.map(|_| ())
    }

    async fn submit(&self) -> AutomationResult<()> {
        self.run(&submit_script()).await.map(|_| ())
    }

    async fn read_output(&self) -> AutomationResult<String> {
        self.run(&read_output_script(&self.app_name)).await
    }

    async fn conversation_labels(&self) -> AutomationResult<Vec<String>> {
        let out = self
            .run(&conversation_labels_script(&self.app_name))
            .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    async fn open_conversation(&self, reference: &str) -> AutomationResult<bool> {
        let out = self
            .run(&open_conversation_script(&self.app_name, reference))
            .await?;
        Ok(out.trim() == "true")
    }
}
