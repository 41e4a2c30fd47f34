// Startup data sources - Hex text loaders for image and palette contents
//
// Both memories are initialised once from `$readmemh`-style text files:
// whitespace-separated hexadecimal words with `//` line comments and
// `/* ... */` block comments. Image files hold one colour index per word in
// address order. Palette files hold one packed RGB word per colour index,
// `chan_bits` per channel with red in the most significant position, so a
// 4-bit palette entry looks like `F80`.
//
// `@address` directives are rejected: every file describes its memory from
// address zero.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::pixel::{ColourIndex, Rgb};

/// Errors raised while reading startup data
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid hex word `{token}`")]
    InvalidWord { line: usize, token: String },

    #[error("line {line}: word `{token}` does not fit in {bits} bits")]
    WordTooWide {
        line: usize,
        token: String,
        bits: u32,
    },

    #[error("line {line}: address directives are not supported")]
    AddressDirective { line: usize },

    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Parse hex words from `text`, each at most `bits` wide
///
/// # Arguments
/// * `text` - File contents
/// * `bits` - Maximum width of a word
///
/// # Returns
/// Words in file order
///
/// # Example
///
/// ```
/// use fbpipe::memory::parse_hex_words;
///
/// let words = parse_hex_words("0 1 // comment\n/* skipped */ a", 4).unwrap();
/// assert_eq!(words, vec![0, 1, 10]);
/// ```
pub fn parse_hex_words(text: &str, bits: u32) -> Result<Vec<u32>, SourceError> {
    let mut words = Vec::new();
    let mut in_block = false;

    for (line_idx, raw_line) in text.lines().enumerate() {
        let line = line_idx + 1;
        let mut rest = raw_line;

        loop {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        rest = &rest[end + 2..];
                        in_block = false;
                    }
                    None => break,
                }
            }

            let line_comment = rest.find("//");
            let block_comment = rest.find("/*");
            let (content, next) = match (line_comment, block_comment) {
                (Some(l), Some(b)) if b < l => (&rest[..b], Some(b)),
                (None, Some(b)) => (&rest[..b], Some(b)),
                (Some(l), _) => (&rest[..l], None),
                (None, None) => (rest, None),
            };

            for token in content.split_whitespace() {
                words.push(parse_word(token, line, bits)?);
            }

            match next {
                Some(b) => {
                    rest = &rest[b + 2..];
                    in_block = true;
                }
                None => break,
            }
        }
    }

    if in_block {
        return Err(SourceError::UnterminatedComment);
    }

    Ok(words)
}

fn parse_word(token: &str, line: usize, bits: u32) -> Result<u32, SourceError> {
    if token.starts_with('@') {
        return Err(SourceError::AddressDirective { line });
    }

    let digits: String = token.chars().filter(|&c| c != '_').collect();
    let value = u32::from_str_radix(&digits, 16).map_err(|_| SourceError::InvalidWord {
        line,
        token: token.to_string(),
    })?;

    if bits < 32 && value >> bits != 0 {
        return Err(SourceError::WordTooWide {
            line,
            token: token.to_string(),
            bits,
        });
    }

    Ok(value)
}

/// Load framebuffer contents from a hex file
///
/// # Arguments
/// * `path` - Path to the file
/// * `cidx_bits` - Width of a colour index
pub fn load_image_hex<P: AsRef<Path>>(
    path: P,
    cidx_bits: u32,
) -> Result<Vec<ColourIndex>, SourceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let words = parse_hex_words(&text, cidx_bits)?;
    debug!(path = %path.display(), entries = words.len(), "image loaded");
    Ok(words.into_iter().map(|w| w as ColourIndex).collect())
}

/// Load palette contents from a hex file
///
/// # Arguments
/// * `path` - Path to the file
/// * `chan_bits` - Width of each colour channel
pub fn load_palette_hex<P: AsRef<Path>>(path: P, chan_bits: u32) -> Result<Vec<Rgb>, SourceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let palette = parse_palette(&text, chan_bits)?;
    debug!(path = %path.display(), entries = palette.len(), "palette loaded");
    Ok(palette)
}

/// Parse palette entries from hex text
pub fn parse_palette(text: &str, chan_bits: u32) -> Result<Vec<Rgb>, SourceError> {
    let words = parse_hex_words(text, 3 * chan_bits)?;
    Ok(words
        .into_iter()
        .map(|w| Rgb::from_packed(w, chan_bits))
        .collect())
}
