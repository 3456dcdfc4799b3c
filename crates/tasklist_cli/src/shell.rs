//! Line handling for the interactive session.

use crate::cli::Cli;
use clap::Parser;
use tasklist_core::error::AppError;

/// What one line typed at the prompt asks for.
#[derive(Debug)]
pub enum Line {
    Blank,
    Exit,
    Help,
    Run(Cli),
}

pub fn read_line(raw: &str) -> Result<Line, AppError> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Ok(Line::Exit);
    }
    if line == "help" || line == "?" {
        return Ok(Line::Help);
    }

    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(Line::Blank);
    }

    let argv = std::iter::once("tasklist".to_string()).chain(words);
    Cli::try_parse_from(argv)
        .map(Line::Run)
        .map_err(parse_failure)
}

/// Maps a clap failure to `invalid_input`, keeping only its headline.
pub fn parse_failure(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let headline = rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("invalid command");
    AppError::invalid_input(headline.trim_start_matches("error: "))
}

/// Splits on whitespace. Double quotes group words; inside them `\"` and `\\` escape.
pub fn split_words(line: &str) -> Result<Vec<String>, AppError> {
    let mut words = Vec::new();
    let mut word: Option<String> = None;
    let mut chars = line.chars();
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                quoted = !quoted;
                word.get_or_insert_with(String::new);
            }
            '\\' if quoted => {
                let current = word.get_or_insert_with(String::new);
                match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => current.push('\\'),
                }
            }
            ch if ch.is_whitespace() && !quoted => words.extend(word.take()),
            ch => word.get_or_insert_with(String::new).push(ch),
        }
    }

    if quoted {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    words.extend(word);
    Ok(words)
}
