//! Preview transport
//!
//! Shows the decoded receipt text for checking layouts. Device bytes are
//! never sent anywhere.

use super::{DeliveryMethod, Transport};
use crate::error::{TransportError, TransportResult};
use crate::escpos::{decode, plain_text};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};
use uuid::Uuid;

const METHOD: DeliveryMethod = DeliveryMethod::Preview;

/// Where preview text goes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewSink {
    #[default]
    Stdout,
    /// One `receipt-<uuid>.txt` file per delivery
    Directory(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct PreviewTransport {
    sink: PreviewSink,
}

impl PreviewTransport {
    pub fn new(sink: PreviewSink) -> Self {
        Self { sink }
    }

    /// Decode a payload into the text a preview window would show
    pub fn render(payload: &[u8]) -> TransportResult<String> {
        let commands = decode(payload).map_err(|e| {
            TransportError::failure(METHOD, format!("payload is not valid ESC/POS: {}", e))
        })?;
        let mut text = plain_text(&commands).join("\n");
        text.push('\n');
        Ok(text)
    }
}

impl Transport for PreviewTransport {
    fn method(&self) -> DeliveryMethod {
        METHOD
    }

    #[instrument(skip(self, payload), fields(sink = ?self.sink, data_len = payload.len()))]
    async fn write(&self, payload: &[u8]) -> TransportResult<()> {
        let text = Self::render(payload)?;

        match &self.sink {
            PreviewSink::Stdout => {
                let mut out = tokio::io::stdout();
                out.write_all(text.as_bytes())
                    .await
                    .map_err(|e| TransportError::failure(METHOD, e.to_string()))?;
                out.flush()
                    .await
                    .map_err(|e| TransportError::failure(METHOD, e.to_string()))?;
            }
            PreviewSink::Directory(dir) => {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    TransportError::failure(METHOD, format!("{}: {}", dir.display(), e))
                })?;
                let path = dir.join(format!("receipt-{}.txt", Uuid::new_v4()));
                tokio::fs::write(&path, text.as_bytes()).await.map_err(|e| {
                    TransportError::failure(METHOD, format!("{}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Preview written");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escpos::{Command, encode};

    #[test]
    fn test_render() {
        let payload = encode(&[
            Command::Init,
            Command::Text("TAX INVOICE".into()),
            Command::Feed(1),
            Command::Cut,
        ]);
        assert_eq!(
            PreviewTransport::render(&payload).unwrap(),
            "TAX INVOICE\n\n[CUT]\n"
        );
    }

    #[tokio::test]
    async fn test_directory_sink() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("previews");
        let transport = PreviewTransport::new(PreviewSink::Directory(out.clone()));

        let payload = encode(&[Command::Init, Command::Text("hello".into())]);
        transport.write(&payload).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_invalid_payload() {
        let err = PreviewTransport::default()
            .write(&[0x1D, 0x56, 0x99, 0x00])
            .await
            .unwrap_err();
        assert_eq!(err.method(), DeliveryMethod::Preview);
    }
}
