//! Interactive prompts for single-card mode.

use std::io::{self, BufRead, Write};

/// Ask for a value on stderr and read one line from stdin.
///
/// An empty answer takes `default` when given; otherwise the question is
/// repeated. End of input without an answer is an error.
pub fn ask(label: &str, default: Option<&str>) -> io::Result<String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    ask_with(label, default, &mut input, &mut io::stderr())
}

fn ask_with<R: BufRead, W: Write>(
    label: &str,
    default: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> io::Result<String> {
    loop {
        match default {
            Some(default) => write!(output, "{} [{}]: ", label, default)?,
            None => write!(output, "{}: ", label)?,
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no value given for {}", label.to_lowercase()),
            ));
        }

        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        if let Some(default) = default {
            return Ok(default.to_string());
        }
    }
}
