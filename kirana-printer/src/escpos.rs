//! ESC/POS command encoder
//!
//! Printer output is modelled as a list of typed [`Command`]s. One encoder
//! ([`encode`]) turns them into bytes and one decoder ([`decode`]) parses the
//! same subset back, so every byte sequence the crate emits comes from a
//! single place.
//!
//! | Command | Bytes |
//! |---------|-------|
//! | Init | `ESC @` |
//! | CodePage | `ESC t n` |
//! | Align | `ESC a 0/1/2` |
//! | Bold | `ESC E 1/0` |
//! | DoubleHeight | `ESC ! 0x10` / `ESC ! 0x00` |
//! | Feed | `ESC d n` |
//! | Cut | `GS V 0x41 0x00` |
//! | BarcodeHeight | `GS h n` |
//! | BarcodeHri | `GS H n` |
//! | Barcode | `GS k 0x49 n d1..dn` (CODE128) |
//! | QrCode | `GS ( k pL pH ...` (model 2) |

use crate::encoding::{CODE_PAGE_WPC1252, decode_text, encode_text};
use crate::error::{DecodeError, EncodeError};
use tracing::instrument;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = 0x0A;

/// CODE128 system in `GS k` function B
const BARCODE_CODE128: u8 = 0x49;
/// Largest QR payload for model 2, byte mode
const QR_MAX_LEN: usize = 7089;

/// Horizontal justification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 | b'0' => Some(Self::Left),
            1 | b'1' => Some(Self::Center),
            2 | b'2' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Where the human-readable barcode text is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HriPosition {
    None,
    Above,
    #[default]
    Below,
    Both,
}

impl HriPosition {
    fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Above => 1,
            Self::Below => 2,
            Self::Both => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 | b'0' => Some(Self::None),
            1 | b'1' => Some(Self::Above),
            2 | b'2' => Some(Self::Below),
            3 | b'3' => Some(Self::Both),
            _ => None,
        }
    }
}

/// Validated CODE128 payload (1-255 bytes, 7-bit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128(Vec<u8>);

impl Code128 {
    pub fn new(data: impl Into<Vec<u8>>) -> Result<Self, EncodeError> {
        let data = data.into();
        if data.is_empty() || data.len() > u8::MAX as usize {
            return Err(EncodeError::BarcodeLength(data.len()));
        }
        if let Some(&b) = data.iter().find(|b| **b > 0x7F) {
            return Err(EncodeError::BarcodeByte(b));
        }
        Ok(Self(data))
    }

    /// Payload prefixed with the `{B` code set selector, as Epson expects
    pub fn code_set_b(text: &str) -> Result<Self, EncodeError> {
        let mut data = b"{B".to_vec();
        data.extend_from_slice(text.as_bytes());
        Self::new(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payload without the code set selector, for previews
    pub fn display_text(&self) -> String {
        let body = self
            .0
            .strip_prefix(b"{A")
            .or_else(|| self.0.strip_prefix(b"{B"))
            .or_else(|| self.0.strip_prefix(b"{C"))
            .unwrap_or(&self.0);
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Validated QR payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrData(Vec<u8>);

impl QrData {
    pub fn new(data: impl Into<Vec<u8>>) -> Result<Self, EncodeError> {
        let data = data.into();
        if data.is_empty() || data.len() > QR_MAX_LEN {
            return Err(EncodeError::QrLength(data.len()));
        }
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A single printer command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    CodePage(u8),
    Align(Align),
    Bold(bool),
    DoubleHeight(bool),
    /// One line of text, terminated by LF
    Text(String),
    Feed(u8),
    Cut,
    BarcodeHeight(u8),
    BarcodeHri(HriPosition),
    Barcode(Code128),
    /// Module size is clamped to 1-16
    QrCode { data: QrData, module_size: u8 },
}

/// Serialize commands to ESC/POS bytes
pub fn encode(commands: &[Command]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4096);
    for command in commands {
        write_command(&mut buf, command);
    }
    buf
}

fn write_command(buf: &mut Vec<u8>, command: &Command) {
    match command {
        Command::Init => buf.extend_from_slice(&[ESC, 0x40]),
        Command::CodePage(n) => buf.extend_from_slice(&[ESC, 0x74, *n]),
        Command::Align(align) => buf.extend_from_slice(&[ESC, 0x61, align.code()]),
        Command::Bold(on) => buf.extend_from_slice(&[ESC, 0x45, u8::from(*on)]),
        Command::DoubleHeight(on) => {
            buf.extend_from_slice(&[ESC, 0x21, if *on { 0x10 } else { 0x00 }])
        }
        Command::Text(text) => {
            buf.extend_from_slice(&encode_text(text));
            buf.push(LF);
        }
        Command::Feed(lines) => buf.extend_from_slice(&[ESC, 0x64, *lines]),
        Command::Cut => buf.extend_from_slice(&[GS, 0x56, 0x41, 0x00]),
        Command::BarcodeHeight(dots) => buf.extend_from_slice(&[GS, 0x68, *dots]),
        Command::BarcodeHri(pos) => buf.extend_from_slice(&[GS, 0x48, pos.code()]),
        Command::Barcode(code) => {
            // Length fits in one byte: Code128::new caps it at 255
            buf.extend_from_slice(&[GS, 0x6B, BARCODE_CODE128, code.len() as u8]);
            buf.extend_from_slice(code.as_bytes());
        }
        Command::QrCode { data, module_size } => {
            let size = (*module_size).clamp(1, 16);

            // Function 165: Select model (Model 2)
            buf.extend_from_slice(&[GS, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]);

            // Function 167: Set module size
            buf.extend_from_slice(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, size]);

            // Function 169: Set error correction (M)
            buf.extend_from_slice(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x31]);

            // Function 180: Store data, two-byte little-endian length
            let len = data.as_bytes().len() + 3;
            let p_l = (len & 0xFF) as u8;
            let p_h = ((len >> 8) & 0xFF) as u8;
            buf.extend_from_slice(&[GS, 0x28, 0x6B, p_l, p_h, 0x31, 0x50, 0x30]);
            buf.extend_from_slice(data.as_bytes());

            // Function 181: Print
            buf.extend_from_slice(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]);
        }
    }
}

/// Parse ESC/POS bytes produced by [`encode`] back into commands
///
/// Text not terminated by LF is returned as a final `Text` command.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<Vec<Command>, DecodeError> {
    let mut out = Vec::new();
    let mut text: Vec<u8> = Vec::new();
    let mut qr_size: u8 = 3;
    let mut qr_data: Option<Vec<u8>> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            LF => {
                out.push(Command::Text(decode_text(&text)));
                text.clear();
                i += 1;
            }
            ESC | GS => {
                if !text.is_empty() {
                    out.push(Command::Text(decode_text(&text)));
                    text.clear();
                }
                let start = i;
                let op = *bytes.get(i + 1).ok_or(DecodeError::Truncated {
                    offset: start,
                    command: "escape",
                })?;
                match (b, op) {
                    (ESC, 0x40) => {
                        out.push(Command::Init);
                        i += 2;
                    }
                    (ESC, 0x74) => {
                        let p = param(bytes, i + 2, 1, "code page")?;
                        out.push(Command::CodePage(p[0]));
                        i += 3;
                    }
                    (ESC, 0x61) => {
                        let p = param(bytes, i + 2, 1, "align")?;
                        let align = Align::from_code(p[0]).ok_or(DecodeError::InvalidParameter {
                            offset: start,
                            command: "align",
                            value: p[0],
                        })?;
                        out.push(Command::Align(align));
                        i += 3;
                    }
                    (ESC, 0x45) => {
                        let p = param(bytes, i + 2, 1, "bold")?;
                        out.push(Command::Bold(p[0] & 0x01 == 0x01));
                        i += 3;
                    }
                    (ESC, 0x21) => {
                        let p = param(bytes, i + 2, 1, "print mode")?;
                        out.push(Command::DoubleHeight(p[0] & 0x10 == 0x10));
                        i += 3;
                    }
                    (ESC, 0x64) => {
                        let p = param(bytes, i + 2, 1, "feed")?;
                        out.push(Command::Feed(p[0]));
                        i += 3;
                    }
                    (GS, 0x56) => {
                        let p = param(bytes, i + 2, 2, "cut")?;
                        if p[0] != 0x41 {
                            return Err(DecodeError::InvalidParameter {
                                offset: start,
                                command: "cut",
                                value: p[0],
                            });
                        }
                        out.push(Command::Cut);
                        i += 4;
                    }
                    (GS, 0x68) => {
                        let p = param(bytes, i + 2, 1, "barcode height")?;
                        out.push(Command::BarcodeHeight(p[0]));
                        i += 3;
                    }
                    (GS, 0x48) => {
                        let p = param(bytes, i + 2, 1, "barcode hri")?;
                        let pos =
                            HriPosition::from_code(p[0]).ok_or(DecodeError::InvalidParameter {
                                offset: start,
                                command: "barcode hri",
                                value: p[0],
                            })?;
                        out.push(Command::BarcodeHri(pos));
                        i += 3;
                    }
                    (GS, 0x6B) => {
                        let header = param(bytes, i + 2, 2, "barcode")?;
                        if header[0] != BARCODE_CODE128 {
                            return Err(DecodeError::InvalidParameter {
                                offset: start,
                                command: "barcode",
                                value: header[0],
                            });
                        }
                        let len = header[1] as usize;
                        let payload = param(bytes, i + 4, len, "barcode")?;
                        let code = Code128::new(payload.to_vec()).map_err(|_| {
                            DecodeError::InvalidParameter {
                                offset: start,
                                command: "barcode",
                                value: header[1],
                            }
                        })?;
                        out.push(Command::Barcode(code));
                        i += 4 + len;
                    }
                    (GS, 0x28) => {
                        let header = param(bytes, i + 2, 3, "qr code")?;
                        if header[0] != 0x6B {
                            return Err(DecodeError::UnknownCommand {
                                offset: start,
                                byte: b,
                                next: op,
                            });
                        }
                        let len = header[1] as usize | (header[2] as usize) << 8;
                        let body = param(bytes, i + 5, len, "qr code")?;
                        if len < 2 || body[0] != 0x31 {
                            return Err(DecodeError::Truncated {
                                offset: start,
                                command: "qr code",
                            });
                        }
                        match body[1] {
                            0x43 if len >= 3 => qr_size = body[2],
                            0x50 if len >= 3 => qr_data = Some(body[3..].to_vec()),
                            0x51 => {
                                let data = qr_data.take().ok_or(DecodeError::InvalidParameter {
                                    offset: start,
                                    command: "qr print",
                                    value: body[1],
                                })?;
                                let data = QrData::new(data).map_err(|_| {
                                    DecodeError::InvalidParameter {
                                        offset: start,
                                        command: "qr store",
                                        value: body[1],
                                    }
                                })?;
                                out.push(Command::QrCode {
                                    data,
                                    module_size: qr_size,
                                });
                            }
                            // Model and error correction selection
                            0x41 | 0x45 => {}
                            other => {
                                return Err(DecodeError::InvalidParameter {
                                    offset: start,
                                    command: "qr code",
                                    value: other,
                                });
                            }
                        }
                        i += 5 + len;
                    }
                    _ => {
                        return Err(DecodeError::UnknownCommand {
                            offset: start,
                            byte: b,
                            next: op,
                        });
                    }
                }
            }
            _ if b < 0x20 => {
                return Err(DecodeError::UnknownCommand {
                    offset: i,
                    byte: b,
                    next: bytes.get(i + 1).copied().unwrap_or(0),
                });
            }
            _ => {
                text.push(b);
                i += 1;
            }
        }
    }

    if !text.is_empty() {
        out.push(Command::Text(decode_text(&text)));
    }

    Ok(out)
}

/// Parameter bytes of the command starting before `offset`
fn param<'a>(
    bytes: &'a [u8],
    offset: usize,
    n: usize,
    command: &'static str,
) -> Result<&'a [u8], DecodeError> {
    bytes
        .get(offset..offset + n)
        .ok_or(DecodeError::Truncated { offset, command })
}

/// Printable view of a command list: text lines plus barcode/QR/cut markers
pub fn plain_text(commands: &[Command]) -> Vec<String> {
    let mut lines = Vec::new();
    for command in commands {
        match command {
            Command::Text(text) => lines.push(text.clone()),
            Command::Feed(n) => lines.extend((0..*n).map(|_| String::new())),
            Command::Barcode(code) => lines.push(format!("[CODE128 {}]", code.display_text())),
            Command::QrCode { data, .. } => {
                lines.push(format!("[QR {}]", String::from_utf8_lossy(data.as_bytes())))
            }
            Command::Cut => lines.push("[CUT]".to_string()),
            _ => {}
        }
    }
    lines
}

// ============================================================================
// Receipt encoding
// ============================================================================

/// A rendered line together with its style markers
///
/// `text` is already padded to the paper width by the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub align: Align,
    pub bold: bool,
    pub double_height: bool,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn double_height(mut self) -> Self {
        self.double_height = true;
        self
    }
}

/// Trailing markers: barcode, QR code, feed before the cut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptMarkers {
    pub barcode: Option<Code128>,
    pub qr_code: Option<QrData>,
    pub feed_lines: u8,
}

impl Default for ReceiptMarkers {
    fn default() -> Self {
        Self {
            barcode: None,
            qr_code: None,
            feed_lines: 4,
        }
    }
}

/// Fluent builder that keeps the command order valid
///
/// `Init` is always first and `build` always ends with the feed followed by
/// the cut.
pub struct EscPosBuilder {
    commands: Vec<Command>,
    align: Align,
    bold: bool,
    double_height: bool,
}

impl EscPosBuilder {
    /// Start a document: initialize and select WPC1252
    pub fn new() -> Self {
        Self {
            commands: vec![Command::Init, Command::CodePage(CODE_PAGE_WPC1252)],
            align: Align::Left,
            bold: false,
            double_height: false,
        }
    }

    /// Switch alignment only if it differs from the current one
    pub fn align(&mut self, align: Align) -> &mut Self {
        if self.align != align {
            self.commands.push(Command::Align(align));
            self.align = align;
        }
        self
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        if self.bold != on {
            self.commands.push(Command::Bold(on));
            self.bold = on;
        }
        self
    }

    pub fn double_height(&mut self, on: bool) -> &mut Self {
        if self.double_height != on {
            self.commands.push(Command::DoubleHeight(on));
            self.double_height = on;
        }
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Text(text.into()));
        self
    }

    /// Write a styled line, emitting only the style changes it needs
    pub fn text_line(&mut self, line: &TextLine) -> &mut Self {
        self.align(line.align)
            .bold(line.bold)
            .double_height(line.double_height)
            .line(line.text.clone())
    }

    /// Print a CODE128 barcode, centered, text below
    pub fn barcode(&mut self, code: Code128) -> &mut Self {
        self.plain();
        self.align(Align::Center);
        self.commands.push(Command::BarcodeHeight(60));
        self.commands.push(Command::BarcodeHri(HriPosition::Below));
        self.commands.push(Command::Barcode(code));
        self
    }

    /// Print a QR code, centered
    pub fn qr_code(&mut self, data: QrData, module_size: u8) -> &mut Self {
        self.plain();
        self.align(Align::Center);
        self.commands.push(Command::QrCode {
            data,
            module_size: module_size.clamp(1, 16),
        });
        self
    }

    fn plain(&mut self) {
        self.double_height(false).bold(false);
    }

    /// Feed and cut, returning the finished command list
    pub fn build(mut self, feed_lines: u8) -> Vec<Command> {
        self.plain();
        self.align(Align::Left);
        self.commands.push(Command::Feed(feed_lines));
        self.commands.push(Command::Cut);
        self.commands
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Command list for a rendered receipt
pub fn receipt_commands(lines: &[TextLine], markers: &ReceiptMarkers) -> Vec<Command> {
    let mut b = EscPosBuilder::new();
    for line in lines {
        b.text_line(line);
    }
    if let Some(code) = &markers.barcode {
        b.barcode(code.clone());
    }
    if let Some(qr) = &markers.qr_code {
        b.qr_code(qr.clone(), 6);
    }
    b.build(markers.feed_lines)
}

/// Encode rendered lines and markers into a printer payload
#[instrument(skip_all, fields(lines = lines.len()))]
pub fn encode_receipt(lines: &[TextLine], markers: &ReceiptMarkers) -> Vec<u8> {
    encode(&receipt_commands(lines, markers))
}
