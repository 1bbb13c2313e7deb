use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;

use super::terminal::{FdReader, RawMode};

pub const MAX_LINE: usize = 4096;

const ESC: u8 = 0x1b;
const EOT: u8 = 0x04;
const DEL: u8 = 0x7f;
const BS: u8 = 0x08;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineResult {
    Line(String),
    Eof,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Esc,
    Csi,
}

/// Character-at-a-time line reader with one line of recall.
pub struct LineEditor {
    recall: String,
    seed: Option<String>,
    max_len: usize,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            recall: String::new(),
            seed: None,
            max_len: MAX_LINE,
        }
    }

    pub fn recall(&self) -> &str {
        &self.recall
    }

    /// Text the next read starts with, as if the user had typed it.
    pub fn seed(&mut self, line: impl Into<String>) {
        self.seed = Some(line.into());
    }

    pub fn seeded(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    /// Reads from fd 0 without buffering, so whatever follows the line
    /// stays in the descriptor for the next reader.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<LineResult> {
        let mut input = FdReader::stdin();
        let _raw = RawMode::enable(input.as_raw_fd())?;
        let mut output = io::stdout().lock();
        self.read_from(&mut input, &mut output, prompt)
    }

    pub fn read_from<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        prompt: &str,
    ) -> io::Result<LineResult> {
        output.write_all(prompt.as_bytes())?;

        let mut buf: Vec<u8> = Vec::new();
        if let Some(seed) = self.seed.take() {
            output.write_all(seed.as_bytes())?;
            buf.extend_from_slice(seed.as_bytes());
        }
        output.flush()?;

        let mut state = Escape::None;
        let mut byte = [0u8; 1];

        loop {
            let read = match input.read(&mut byte) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if read == 0 {
                if buf.is_empty() {
                    return Ok(LineResult::Eof);
                }
                output.write_all(b"\n")?;
                break;
            }
            let b = byte[0];

            match state {
                Escape::Esc if b == b'[' => {
                    state = Escape::Csi;
                    continue;
                }
                Escape::Csi => {
                    state = Escape::None;
                    if b == b'A' {
                        self.replace_with_recall(&mut buf, output)?;
                    }
                    continue;
                }
                _ => state = Escape::None,
            }

            match b {
                ESC => state = Escape::Esc,
                DEL | BS => {
                    if pop_char(&mut buf) {
                        erase(output, 1)?;
                    }
                }
                b'\t' => {
                    buf.push(b'?');
                    output.write_all(b"?\n")?;
                    break;
                }
                EOT => {
                    output.write_all(b"\n")?;
                    output.flush()?;
                    return Ok(LineResult::Eof);
                }
                b'\n' | b'\r' => {
                    output.write_all(b"\n")?;
                    break;
                }
                _ => {
                    buf.push(b);
                    output.write_all(&byte)?;
                    if buf.len() >= self.max_len {
                        output.write_all(b"\n")?;
                        break;
                    }
                }
            }
            output.flush()?;
        }
        output.flush()?;

        let line = String::from_utf8_lossy(&buf).into_owned();
        self.recall.clone_from(&line);
        Ok(LineResult::Line(line))
    }

    fn replace_with_recall<W: Write>(&self, buf: &mut Vec<u8>, output: &mut W) -> io::Result<()> {
        let typed = String::from_utf8_lossy(buf).chars().count();
        erase(output, typed)?;
        buf.clear();
        buf.extend_from_slice(self.recall.as_bytes());
        output.write_all(self.recall.as_bytes())?;
        output.flush()
    }
}

fn erase<W: Write>(output: &mut W, count: usize) -> io::Result<()> {
    for _ in 0..count {
        output.write_all(b"\x08 \x08")?;
    }
    Ok(())
}

/// Drops the last UTF-8 scalar from `buf`.
fn pop_char(buf: &mut Vec<u8>) -> bool {
    if buf.is_empty() {
        return false;
    }
    while let Some(b) = buf.pop() {
        if b & 0xc0 != 0x80 {
            break;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn feed(editor: &mut LineEditor, keys: &[u8]) -> (LineResult, String) {
        let mut input = Cursor::new(keys.to_vec());
        let mut output = Vec::new();
        let result = editor
            .read_from(&mut input, &mut output, "$ ")
            .expect("in-memory read");
        (result, String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn test_plain_line() {
        let mut editor = LineEditor::new();
        let (result, echo) = feed(&mut editor, b"ls -l\n");

        assert_eq!(result, LineResult::Line("ls -l".to_string()));
        assert_eq!(echo, "$ ls -l\n");
        assert_eq!(editor.recall(), "ls -l");
    }

    #[test]
    fn test_carriage_return_ends_line() {
        let mut editor = LineEditor::new();
        let (result, _) = feed(&mut editor, b"pwd\r");
        assert_eq!(result, LineResult::Line("pwd".to_string()));
    }

    #[test]
    fn test_backspace() {
        let mut editor = LineEditor::new();
        let (result, echo) = feed(&mut editor, b"lss\x7f -a\n");

        assert_eq!(result, LineResult::Line("ls -a".to_string()));
        assert!(echo.contains("\x08 \x08"));
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut editor = LineEditor::new();
        let (result, echo) = feed(&mut editor, b"\x7f\x7fok\n");

        assert_eq!(result, LineResult::Line("ok".to_string()));
        assert!(!echo.contains('\x08'));
    }

    #[test]
    fn test_backspace_removes_whole_scalar() {
        let mut editor = LineEditor::new();
        let (result, _) = feed(&mut editor, "cd é\x7fe\n".as_bytes());
        assert_eq!(result, LineResult::Line("cd e".to_string()));
    }

    #[test]
    fn test_tab_requests_completion() {
        let mut editor = LineEditor::new();
        let (result, _) = feed(&mut editor, b"gr\tignored\n");
        assert_eq!(result, LineResult::Line("gr?".to_string()));
    }

    #[test]
    fn test_up_arrow_recalls_previous_line() {
        let mut editor = LineEditor::new();
        feed(&mut editor, b"echo first\n");

        let (result, echo) = feed(&mut editor, b"xy\x1b[A two\n");
        assert_eq!(result, LineResult::Line("echo first two".to_string()));
        assert!(echo.contains("\x08 \x08\x08 \x08echo first"));
    }

    #[test]
    fn test_other_arrows_are_swallowed() {
        let mut editor = LineEditor::new();
        let (result, _) = feed(&mut editor, b"a\x1b[B\x1b[Cb\n");
        assert_eq!(result, LineResult::Line("ab".to_string()));
    }

    #[test]
    fn test_ctrl_d_ends_input() {
        let mut editor = LineEditor::new();
        let (result, _) = feed(&mut editor, b"half\x04rest\n");

        assert_eq!(result, LineResult::Eof);
        assert_eq!(editor.recall(), "");
    }

    #[test]
    fn test_closed_input() {
        let mut editor = LineEditor::new();
        assert_eq!(feed(&mut editor, b"").0, LineResult::Eof);
        assert_eq!(
            feed(&mut editor, b"exit").0,
            LineResult::Line("exit".to_string())
        );
    }

    #[test]
    fn test_max_length_cuts_line() {
        let mut editor = LineEditor::new();
        let long = vec![b'x'; MAX_LINE + 10];
        let (result, _) = feed(&mut editor, &long);

        match result {
            LineResult::Line(line) => assert_eq!(line.len(), MAX_LINE),
            LineResult::Eof => panic!("expected a line"),
        }
    }

    #[test]
    fn test_bytes_after_newline_stay_unread() {
        let mut editor = LineEditor::new();
        let mut input = Cursor::new(b"cdh\n2\npwd\n".to_vec());
        let mut output = Vec::new();

        let result = editor
            .read_from(&mut input, &mut output, "$ ")
            .expect("in-memory read");
        assert_eq!(result, LineResult::Line("cdh".to_string()));
        assert_eq!(input.position(), 4);
    }

    #[test]
    fn test_descriptor_keeps_typed_ahead_input() -> io::Result<()> {
        use std::fs::File;
        use std::os::unix::io::FromRawFd;

        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) }, 0);
        let mut read_end = unsafe { File::from_raw_fd(fds[0]) };
        let mut write_end = unsafe { File::from_raw_fd(fds[1]) };
        write_end.write_all(b"cat\nhello-from-stdin\n")?;
        drop(write_end);

        let mut editor = LineEditor::new();
        let mut output = Vec::new();
        let mut input = FdReader::new(read_end.as_raw_fd());
        let result = editor.read_from(&mut input, &mut output, "$ ")?;
        assert_eq!(result, LineResult::Line("cat".to_string()));

        let mut rest = String::new();
        read_end.read_to_string(&mut rest)?;
        assert_eq!(rest, "hello-from-stdin\n");
        Ok(())
    }

    #[test]
    fn test_seeded_line() {
        let mut editor = LineEditor::new();
        editor.seed("grep");
        let (result, echo) = feed(&mut editor, b" -n\n");

        assert_eq!(result, LineResult::Line("grep -n".to_string()));
        assert!(echo.starts_with("$ grep"));
    }
}
