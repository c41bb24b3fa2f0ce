//! Output channel encoding
//!
//! Format:
//! - `NAME=value` when the value has no newline
//! - `NAME<<EOF`, the value, `EOF` otherwise

use regex_lite::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use crate::{OutputError, OutputValue, Outputs};

/// Delimiter closing multi-line values
pub const HEREDOC_DELIMITER: &str = "EOF";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("output name pattern is valid")
    })
}

/// Check that a name can be used as an output variable
pub fn validate_name(name: &str) -> Result<(), OutputError> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(OutputError::InvalidName(name.to_string()))
    }
}

/// Encodes outputs onto any byte sink
pub struct OutputWriter<W: Write> {
    sink: W,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Encode a single variable
    pub fn write(&mut self, name: &str, value: &OutputValue) -> Result<(), OutputError> {
        validate_name(name)?;
        let rendered = value.render(name);
        tracing::info!("OUTPUT [{}]: {}", name, rendered);

        if !rendered.contains('\n') {
            writeln!(self.sink, "{}={}", name, rendered)?;
        } else {
            if rendered.lines().any(|line| line == HEREDOC_DELIMITER) {
                return Err(OutputError::DelimiterCollision(name.to_string()));
            }
            writeln!(self.sink, "{}<<{}", name, HEREDOC_DELIMITER)?;
            writeln!(self.sink, "{}", rendered)?;
            writeln!(self.sink, "{}", HEREDOC_DELIMITER)?;
        }
        Ok(())
    }

    /// Encode every output in order
    pub fn write_all(&mut self, outputs: &Outputs) -> Result<(), OutputError> {
        for (name, value) in outputs.iter() {
            self.write(name, value)?;
        }
        Ok(())
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> Result<W, OutputError> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Append outputs to the file at `path`.
///
/// Every output is encoded before the file is opened, so a failing value
/// leaves the file untouched.
pub fn write_outputs(path: &Path, outputs: &Outputs) -> Result<(), OutputError> {
    let mut encoder = OutputWriter::new(Vec::new());
    encoder.write_all(outputs)?;
    let encoded = encoder.finish()?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&encoded)?;
    file.flush()?;
    Ok(())
}
