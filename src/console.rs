//! Colorized status output.
//!
//! Status lines are the human interface of the tool; they are not meant to
//! be parsed. Colors come from a [`Palette`] carried by the [`Console`].

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

/// When to emit ANSI color codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Color only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Role of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Section titles and overview blocks
    Heading,
    /// An artifact was produced
    Success,
    /// An artifact was already on disk
    Exists,
    /// Start of plot generation
    Section,
    /// Whole stage skipped
    Skip,
    /// Column listing
    Alert,
}

/// ANSI SGR codes per style
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub heading: String,
    pub success: String,
    pub exists: String,
    pub section: String,
    pub skip: String,
    pub alert: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            heading: "94".to_string(),
            success: "92".to_string(),
            exists: "96".to_string(),
            section: "95".to_string(),
            skip: "93".to_string(),
            alert: "91".to_string(),
        }
    }
}

impl Palette {
    pub fn code(&self, style: Style) -> &str {
        match style {
            Style::Heading => &self.heading,
            Style::Success => &self.success,
            Style::Exists => &self.exists,
            Style::Section => &self.section,
            Style::Skip => &self.skip,
            Style::Alert => &self.alert,
        }
    }
}

/// Line-oriented status writer
pub struct Console {
    out: Box<dyn Write + Send>,
    palette: Palette,
    color: bool,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static, palette: Palette, color: bool) -> Self {
        Self {
            out: Box::new(out),
            palette,
            color,
        }
    }

    /// Console on stdout, colored according to `mode`
    pub fn stdout(palette: Palette, mode: ColorMode) -> Self {
        let color = mode.enabled(io::stdout().is_terminal());
        Self::new(io::stdout(), palette, color)
    }

    /// Uncolored console writing into memory, plus a handle to read it back
    pub fn buffered() -> (Self, Capture) {
        let capture = Capture::default();
        (Self::new(capture.clone(), Palette::default(), false), capture)
    }

    /// Write one styled line
    pub fn line(&mut self, style: Style, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "\x1b[{}m{}\x1b[0m",
                self.palette.code(style),
                text
            )
        } else {
            writeln!(self.out, "{}", text)
        }
    }

    /// Write unstyled text, verbatim
    pub fn plain(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Shared in-memory sink for [`Console::buffered`]
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
