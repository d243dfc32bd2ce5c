//! Print-driver path
//!
//! The payload is decoded back to text, laid out as monospace HTML in a
//! temporary document and handed to the OS print spooler (`lp` by default).
//! Success means the spooler accepted the job. Whether paper came out is not
//! observable from here.

use super::{DeliveryMethod, Transport};
use crate::error::{TransportError, TransportResult};
use crate::escpos::{Command, decode};
use std::io::ErrorKind;
use tokio::process::Command as Process;
use tracing::{info, instrument};

const METHOD: DeliveryMethod = DeliveryMethod::HiddenFrame;

#[derive(Debug, Clone)]
pub struct HiddenFrameTransport {
    program: String,
    args: Vec<String>,
    title: String,
}

impl HiddenFrameTransport {
    /// Spooler invocation; the document path is appended after `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            title: "Receipt".to_string(),
        }
    }

    /// Parse a command line such as `lp -d TM-T82`
    pub fn from_command_line(line: &str) -> Self {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "lp".to_string());
        Self::new(program, parts.collect())
    }

    /// Route to a named printer queue (`lp -d <name>`)
    pub fn with_printer(mut self, name: &str) -> Self {
        self.args.push("-d".to_string());
        self.args.push(name.to_string());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for HiddenFrameTransport {
    fn default() -> Self {
        Self::new("lp", Vec::new())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render decoded commands as a monospace HTML document
///
/// Lines are already padded to the paper width, so only emphasis and
/// size are carried over.
pub fn render_html(commands: &[Command], title: &str) -> String {
    let mut body = String::new();
    let mut bold = false;
    let mut tall = false;

    for command in commands {
        match command {
            Command::Bold(on) => bold = *on,
            Command::DoubleHeight(on) => tall = *on,
            Command::Text(text) => {
                let mut line = escape_html(text);
                if tall {
                    line = format!("<span class=\"tall\">{}</span>", line);
                }
                if bold {
                    line = format!("<b>{}</b>", line);
                }
                body.push_str(&line);
                body.push('\n');
            }
            Command::Feed(n) => body.push_str(&"\n".repeat(*n as usize)),
            Command::Barcode(code) => {
                body.push_str(&format!(
                    "<span class=\"code\">{}</span>\n",
                    escape_html(&code.display_text())
                ));
            }
            Command::QrCode { data, .. } => {
                body.push_str(&format!(
                    "<span class=\"code\">{}</span>\n",
                    escape_html(&String::from_utf8_lossy(data.as_bytes()))
                ));
            }
            _ => {}
        }
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>@page{{margin:0}}body{{margin:0}}\
         pre{{font-family:monospace;font-size:12px;line-height:1.2}}\
         .tall{{font-size:24px}}.code{{letter-spacing:2px}}</style></head>\
         <body><pre>{}</pre></body></html>\n",
        escape_html(title),
        body
    )
}

impl Transport for HiddenFrameTransport {
    fn method(&self) -> DeliveryMethod {
        METHOD
    }

    #[instrument(skip(self, payload), fields(program = %self.program, data_len = payload.len()))]
    async fn write(&self, payload: &[u8]) -> TransportResult<()> {
        let commands = decode(payload).map_err(|e| {
            TransportError::failure(METHOD, format!("payload is not valid ESC/POS: {}", e))
        })?;
        let html = render_html(&commands, &self.title);

        // Removed when `document` drops, after the spooler has read it
        let document = tempfile::Builder::new()
            .prefix("receipt-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| TransportError::failure(METHOD, format!("temp document: {}", e)))?;
        tokio::fs::write(document.path(), html.as_bytes())
            .await
            .map_err(|e| TransportError::failure(METHOD, format!("temp document: {}", e)))?;

        let output = Process::new(&self.program)
            .args(&self.args)
            .arg(document.path())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TransportError::unavailable(
                    METHOD,
                    format!("print spooler '{}' not found", self.program),
                ),
                _ => TransportError::failure(
                    METHOD,
                    format!("cannot start '{}': {}", self.program, e),
                ),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::failure(
                METHOD,
                format!("'{}' exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        info!("Print job handed to spooler");
        Ok(())
    }
}
