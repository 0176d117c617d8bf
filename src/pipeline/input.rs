// file: src/pipeline/input.rs
// description: terminal input for job descriptions and interactive questions
// reference: line oriented reads over any BufRead source

use crate::config::SessionConfig;
use crate::error::Result;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Question(String),
    Blank,
    Exit,
}

/// Read every line until end of input and return the trimmed text.
pub fn read_job_description<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines.join("\n").trim().to_string())
}

/// Read one question line. End of input and exit keywords end the session.
pub fn read_question<R: BufRead>(reader: &mut R, session: &SessionConfig) -> Result<UserInput> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(UserInput::Exit);
    }

    let question = line.trim();
    if session.is_exit_keyword(question) {
        Ok(UserInput::Exit)
    } else if question.is_empty() {
        Ok(UserInput::Blank)
    } else {
        Ok(UserInput::Question(question.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_read_job_description() {
        let mut input = Cursor::new("\n  Senior Rust Engineer\nKubernetes, AWS\n\n");
        assert_eq!(
            read_job_description(&mut input).unwrap(),
            "Senior Rust Engineer\nKubernetes, AWS"
        );

        let mut empty = Cursor::new("   \n\n");
        assert_eq!(read_job_description(&mut empty).unwrap(), "");
    }

    #[test]
    fn test_read_questions_until_exit() {
        let session = Config::default_config().session;
        let mut input = Cursor::new("Who knows Go?\n\n  QUIT \nnever read\n");

        assert_eq!(
            read_question(&mut input, &session).unwrap(),
            UserInput::Question("Who knows Go?".to_string())
        );
        assert_eq!(read_question(&mut input, &session).unwrap(), UserInput::Blank);
        assert_eq!(read_question(&mut input, &session).unwrap(), UserInput::Exit);
    }

    #[test]
    fn test_end_of_input_exits() {
        let session = Config::default_config().session;
        let mut input = Cursor::new("");
        assert_eq!(read_question(&mut input, &session).unwrap(), UserInput::Exit);
    }
}
