//! Configuration options for decoding and encoding.
//!
//! - [`DecodeOptions`]: text encoding, recursive sub-file expansion and limits
//! - [`EncodeOptions`]: line terminator and output encoding
//! - [`LineEnding`]: the three line terminators the format accepts
//!
//! ## Examples
//!
//! ```rust
//! use serde_omsi::{DecodeOptions, EncodeOptions, LineEnding};
//!
//! // Files written by older tools are usually in a Windows code page.
//! let decode = DecodeOptions::new()
//!     .with_encoding(encoding_rs::WINDOWS_1252)
//!     .with_recursive(true);
//! assert!(decode.recursive);
//!
//! let encode = EncodeOptions::new().with_line_ending(LineEnding::Lf);
//! assert_eq!(encode.line_ending.as_str(), "\n");
//! ```

use encoding_rs::Encoding;

/// Line terminator.
///
/// The reader accepts all three; the writer emits the configured one.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::LineEnding;
///
/// assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
/// assert_eq!(LineEnding::Cr.as_str(), "\r");
/// assert_eq!(LineEnding::None.as_str(), "");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineEnding {
    Lf,
    #[default]
    CrLf,
    Cr,
    /// The last line of a stream that has no terminator.
    None,
}

impl LineEnding {
    /// Returns the string representation of this line ending.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
            LineEnding::None => "",
        }
    }
}

/// Configuration for decoding documents.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::DecodeOptions;
///
/// let options = DecodeOptions::new()
///     .with_recursive(true)
///     .with_permissive(true)
///     .with_max_line_length(1024);
/// assert_eq!(options.max_line_length, Some(1024));
/// assert!(options.detect_bom);
/// ```
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Encoding used when the stream carries no byte order mark.
    pub encoding: &'static Encoding,
    /// Whether a leading byte order mark selects the encoding.
    pub detect_bom: bool,
    /// Whether sub-file fields are expanded by decoding the referenced file.
    pub recursive: bool,
    /// Whether broken sub-files are recorded as diagnostics instead of failing.
    pub permissive: bool,
    /// Longest accepted field line, in characters. `None` means unbounded.
    pub max_line_length: Option<usize>,
    /// How deeply sub-files may reference further sub-files.
    pub max_include_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            encoding: encoding_rs::UTF_8,
            detect_bom: true,
            recursive: false,
            permissive: false,
            max_line_length: None,
            max_include_depth: 16,
        }
    }
}

impl DecodeOptions {
    /// Creates default options: UTF-8 fallback, BOM detection, no expansion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback encoding used when no byte order mark is found.
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Uses `encoding` unconditionally, ignoring any byte order mark.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_omsi::DecodeOptions;
    ///
    /// let options = DecodeOptions::new().with_forced_encoding(encoding_rs::UTF_16LE);
    /// assert!(!options.detect_bom);
    /// ```
    #[must_use]
    pub fn with_forced_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self.detect_bom = false;
        self
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_permissive(mut self, permissive: bool) -> Self {
        self.permissive = permissive;
        self
    }

    #[must_use]
    pub fn with_max_line_length(mut self, limit: usize) -> Self {
        self.max_line_length = Some(limit);
        self
    }

    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

/// Configuration for encoding documents.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::{EncodeOptions, LineEnding};
///
/// let options = EncodeOptions::new()
///     .with_encoding(encoding_rs::UTF_16LE)
///     .with_bom(true);
/// assert_eq!(options.line_ending, LineEnding::CrLf);
/// ```
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    pub line_ending: LineEnding,
    pub encoding: &'static Encoding,
    pub write_bom: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            line_ending: LineEnding::CrLf,
            encoding: encoding_rs::UTF_8,
            write_bom: false,
        }
    }
}

impl EncodeOptions {
    /// Creates default options: CRLF line endings, UTF-8 without BOM.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Writes a byte order mark for UTF-8 and UTF-16 output.
    #[must_use]
    pub fn with_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }
}
