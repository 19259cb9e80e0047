//! Writes step outputs for the CI runner in its multi-line form:
//!
//! ```text
//! name<<DELIMITER
//! value
//! DELIMITER
//! ```

use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// The output the `publish` step reads its text from.
pub const TWEET_TEXT: &str = "tweet_text";

const DEFAULT_DELIMITER: &str = "EOF";

/// Writes one `name<<DELIMITER` block to `w`.
pub fn write_output<W: Write>(mut w: W, name: &str, value: &str) -> io::Result<()> {
    let delimiter = delimiter(value);
    write!(w, "{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)?;
    w.flush()
}

/// Appends one block to the file at `path`, creating it if needed.
pub fn append_output(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_output(file, name, value)
}

/// `EOF`, unless a line of `value` is exactly `EOF`; then a random delimiter
/// that appears nowhere in `value`.
fn delimiter(value: &str) -> Cow<'static, str> {
    if !value.lines().any(|line| line == DEFAULT_DELIMITER) {
        return Cow::Borrowed(DEFAULT_DELIMITER);
    }
    loop {
        let candidate = format!("ghadelimiter_{:032x}", rand::random::<u128>());
        if !value.contains(&candidate) {
            return Cow::Owned(candidate);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_output() -> io::Result<()> {
        let mut buf = Vec::new();
        write_output(&mut buf, TWEET_TEXT, "line one\n\nline two")?;
        assert_eq!(
            "tweet_text<<EOF\nline one\n\nline two\nEOF\n",
            String::from_utf8_lossy(&buf)
        );
        Ok(())
    }

    #[test]
    fn test_write_output_delimiter_collision() -> io::Result<()> {
        let mut buf = Vec::new();
        write_output(&mut buf, TWEET_TEXT, "before\nEOF\nafter")?;
        let written = String::from_utf8_lossy(&buf).into_owned();
        let first_line = written.lines().next().unwrap_or_default();
        assert!(first_line.starts_with("tweet_text<<ghadelimiter_"));
        let delimiter = &first_line["tweet_text<<".len()..];
        assert!(written.ends_with(&format!("\nafter\n{}\n", delimiter)));
        Ok(())
    }

    #[test]
    fn test_eof_inside_a_line_keeps_default() {
        assert_eq!("EOF", delimiter("EOFs are fine\nnot EOF"));
    }

    #[test]
    fn test_append_output() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("output");
        std::fs::write(&path, "existing=1\n")?;
        append_output(&path, TWEET_TEXT, "hello")?;
        assert_eq!(
            "existing=1\ntweet_text<<EOF\nhello\nEOF\n",
            std::fs::read_to_string(&path)?
        );
        Ok(())
    }
}
