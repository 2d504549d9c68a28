use std::error::Error;

/// Sentinel returned by every buffer-writing accessor when the supplied
/// buffer cannot hold the value plus its terminating NUL.
pub const BUFFER_TOO_SMALL: isize = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// YAML tokenizer or document structure failure.
    InvalidYaml,
    /// Grammar failure: unknown key, wrong node kind, malformed scalar.
    InvalidConfig,
    /// API misuse, e.g. undefined parser flags.
    InvalidFlag,
    /// Semantic failure: conflicts, missing required field, bad
    /// cross-reference between netdefs.
    ConfigValidation,
    /// Configuration not expressible by the selected backend.
    BackendUnsupported,
    FileIo,
    EmitterFailure,
    /// Emitted YAML was rejected on re-parse.
    FormatInvalidYaml,
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::InvalidConfig
    }
}

impl ErrorKind {
    pub(crate) fn domain(&self) -> u64 {
        match self {
            Self::InvalidYaml => 1,
            Self::InvalidConfig => 2,
            Self::InvalidFlag => 3,
            Self::ConfigValidation => 4,
            Self::BackendUnsupported => 5,
            Self::FileIo => 6,
            Self::EmitterFailure => 7,
            Self::FormatInvalidYaml => 8,
        }
    }

    // Recoverable errors may be consumed by ParserFlags::IGNORE_ERRORS,
    // fatal ones always terminate the load.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig
                | Self::ConfigValidation
                | Self::BackendUnsupported
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::InvalidYaml => "invalid-yaml",
                Self::InvalidConfig => "invalid-config",
                Self::InvalidFlag => "invalid-flag",
                Self::ConfigValidation => "config-validation",
                Self::BackendUnsupported => "backend-unsupported",
                Self::FileIo => "file-io",
                Self::EmitterFailure => "emitter-failure",
                Self::FormatInvalidYaml => "format-invalid-yaml",
            }
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NetplanError {
    kind: ErrorKind,
    code: u32,
    msg: String,
    filepath: Option<String>,
    line: usize,
    column: usize,
    source_line: String,
}

impl std::fmt::Display for NetplanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(filepath) = self.filepath.as_deref() {
            write!(
                f,
                "{}:{}:{}: {}: {}",
                filepath, self.line, self.column, self.kind, self.msg
            )?;
        } else {
            write!(f, "{}: {}", self.kind, self.msg)?;
        }
        if !self.source_line.is_empty() {
            // Caret aligned below the offending column, column is 1 based.
            write!(
                f,
                "\n{}\n{: <2$}^",
                self.source_line,
                "",
                self.column.saturating_sub(1)
            )?;
        }
        Ok(())
    }
}

impl Error for NetplanError {}

impl NetplanError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self {
            kind,
            msg,
            ..Default::default()
        }
    }

    pub(crate) fn with_path(mut self, filepath: &str) -> Self {
        if self.filepath.is_none() {
            self.filepath = Some(filepath.to_string());
        }
        self
    }

    pub(crate) fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub(crate) fn with_source_line(mut self, line: &str) -> Self {
        self.source_line = line.to_string();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }

    pub fn filepath(&self) -> Option<&str> {
        self.filepath.as_deref()
    }

    /// 1-based line of the failure inside [NetplanError::filepath()],
    /// 0 when unknown.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the failure, 0 when unknown.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The physical source line the failure points at, empty when not
    /// captured.
    pub fn source_line(&self) -> &str {
        self.source_line.as_str()
    }

    /// Packed `(domain << 32) | sub_code` identifier of this error.
    pub fn code(&self) -> u64 {
        (self.kind.domain() << 32) | u64::from(self.code)
    }

    /// Write the formatted message into `buf` as a NUL terminated string.
    /// Returns the stored size including the NUL, or [BUFFER_TOO_SMALL].
    pub fn message_into(&self, buf: &mut [u8]) -> isize {
        crate::buffer::copy_str_to_buffer(&self.to_string(), buf)
    }
}

impl From<std::io::Error> for NetplanError {
    fn from(e: std::io::Error) -> Self {
        NetplanError::new(ErrorKind::FileIo, e.to_string())
    }
}

impl From<serde_yaml::Error> for NetplanError {
    fn from(e: serde_yaml::Error) -> Self {
        let mut ret = NetplanError::new(
            ErrorKind::InvalidYaml,
            refine_yaml_message(&e.to_string()),
        );
        if let Some(location) = e.location() {
            ret.line = location.line();
            ret.column = location.column();
        }
        ret
    }
}

// libyaml messages are precise but hostile, translate the common ones
// into the wording users know from netplan.
pub(crate) fn refine_yaml_message(msg: &str) -> String {
    if msg.contains("found character that cannot start any token") {
        "tabs are not allowed for indent".to_string()
    } else if msg.contains("found undefined alias")
        || msg.contains("unknown anchor")
    {
        "aliases are not supported".to_string()
    } else if msg.contains("mapping values are not allowed") {
        "inconsistent indentation".to_string()
    } else {
        msg.to_string()
    }
}
