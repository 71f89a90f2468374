//! Interactive confirmation before destructive changes.
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::debug;

/// Answers the yes/no questions asked while applying a render.
///
/// A `false` answer leaves the destination untouched; it is never an error.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Ask whether an existing destination may be overwritten.
    fn confirm_overwrite(&mut self, path: &Path, is_dir: bool) -> bool;

    /// Ask whether an existing destination file may be deleted because its
    /// rendered content is blank.
    fn confirm_delete(&mut self, path: &Path) -> bool;
}

/// [`Prompter`] that asks on a line-oriented terminal.
///
/// The question is repeated until the answer is exactly `y` or `n`.  End of
/// input, or a read error, counts as `n`.
#[derive(Debug)]
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompter reading standard input and writing standard output.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Prompter over arbitrary streams.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning its streams.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask(&mut self, question: &str) -> bool {
        let mut line = String::new();
        loop {
            if write!(self.output, "{question} (y/n): ")
                .and_then(|()| self.output.flush())
                .is_err()
            {
                return false;
            }
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    debug!("end of input while prompting, treating as no");
                    return false;
                }
                Err(e) => {
                    debug!("failed reading answer: {e}");
                    return false;
                }
                Ok(_) => {}
            }
            match line.trim() {
                "y" => return true,
                "n" => return false,
                _ => {}
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm_overwrite(&mut self, path: &Path, is_dir: bool) -> bool {
        let suffix = if is_dir { "/" } else { "" };
        let shown = format!("{}{suffix}", path.display());
        self.ask(&format!("{shown:?} already exists. Overwrite?"))
    }

    fn confirm_delete(&mut self, path: &Path) -> bool {
        let shown = path.display().to_string();
        self.ask(&format!("{shown:?} is empty. Delete?"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(p: TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_inner().1).unwrap()
    }

    #[test]
    fn overwrite_yes() {
        let mut p = prompter("y\n");
        assert!(p.confirm_overwrite(Path::new("/dst/a.txt"), false));
        assert_eq!(
            transcript(p),
            "\"/dst/a.txt\" already exists. Overwrite? (y/n): "
        );
    }

    #[test]
    fn overwrite_directory_gets_trailing_slash() {
        let mut p = prompter("n\n");
        assert!(!p.confirm_overwrite(Path::new("/dst/sub"), true));
        assert_eq!(transcript(p), "\"/dst/sub/\" already exists. Overwrite? (y/n): ");
    }

    #[test]
    fn repeats_until_valid_answer() {
        let mut p = prompter("maybe\nY\n\nn\n");
        assert!(!p.confirm_delete(Path::new("/dst/e")));
        let out = transcript(p);
        assert_eq!(out.matches("\"/dst/e\" is empty. Delete? (y/n): ").count(), 4);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let mut p = prompter("  y \r\n");
        assert!(p.confirm_delete(Path::new("/dst/e")));
    }

    #[test]
    fn end_of_input_is_no() {
        let mut p = prompter("");
        assert!(!p.confirm_overwrite(Path::new("/dst/a"), false));
        let mut p = prompter("what\n");
        assert!(!p.confirm_delete(Path::new("/dst/a")));
    }

    #[test]
    fn answers_are_consumed_in_order() {
        let mut p = prompter("y\nn\n");
        assert!(p.confirm_overwrite(Path::new("/dst/1"), false));
        assert!(!p.confirm_overwrite(Path::new("/dst/2"), false));
    }

    #[test]
    fn quotes_are_escaped() {
        let mut p = prompter("n\n");
        p.confirm_delete(Path::new("/dst/say \"hi\""));
        assert_eq!(
            transcript(p),
            "\"/dst/say \\\"hi\\\"\" is empty. Delete? (y/n): "
        );
    }
}
