//! Tokenizer for the command-stream wire format.

use std::{fmt::Write as _, str::CharIndices, str::FromStr};

use thiserror::Error;

use crate::{Command, Direction, Offset, Point, Rotation};

/// Interactive pseudo-symbol that discards the last command.
pub const UNDO_SYMBOL: char = 'U';

/// Unit produced by [`tokenize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// A fully formed command.
    Command(Command),
    /// Request to discard the most recent command.
    Undo,
}

/// Errors that can occur while tokenizing a command stream.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The input contained a symbol outside the command alphabet.
    #[error("unexpected symbol {symbol:?} at byte {position}")]
    UnexpectedSymbol {
        /// Offending symbol.
        symbol: char,
        /// Byte offset of the symbol.
        position: usize,
    },
    /// A command that takes an argument was not followed by `(`.
    #[error("command {symbol:?} at byte {position} requires a parenthesised argument")]
    MissingArgument {
        /// Command symbol missing its argument.
        symbol: char,
        /// Byte offset of the command symbol.
        position: usize,
    },
    /// An argument was opened but never closed.
    #[error("unterminated argument starting at byte {position}")]
    UnterminatedArgument {
        /// Byte offset of the opening parenthesis.
        position: usize,
    },
    /// An argument was not a pair of integers.
    #[error("malformed argument {argument:?} at byte {position}")]
    MalformedArgument {
        /// Text found between the parentheses.
        argument: String,
        /// Byte offset of the opening parenthesis.
        position: usize,
    },
    /// A persisted stream contained the interactive undo symbol.
    #[error("undo symbol at byte {position} cannot appear in a persisted stream")]
    UndoInStream {
        /// Byte offset of the undo symbol.
        position: usize,
    },
}

/// Splits interactive input into commands and undo requests.
///
/// ASCII whitespace between symbols is ignored.
pub fn tokenize(input: &str) -> Result<Vec<Token>, StreamError> {
    Ok(scan(input)?.into_iter().map(|(_, token)| token).collect())
}

/// Parses a persisted command stream.
pub fn parse(input: &str) -> Result<Vec<Command>, StreamError> {
    scan(input)?
        .into_iter()
        .map(|(position, token)| match token {
            Token::Command(command) => Ok(command),
            Token::Undo => Err(StreamError::UndoInStream { position }),
        })
        .collect()
}

/// Renders commands in wire form.
#[must_use]
pub fn encode(commands: &[Command]) -> String {
    let mut out = String::with_capacity(commands.len());
    for command in commands {
        let _ = write!(out, "{command}");
    }
    out
}

fn scan(input: &str) -> Result<Vec<(usize, Token)>, StreamError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices();

    while let Some((position, symbol)) = chars.next() {
        if symbol.is_ascii_whitespace() {
            continue;
        }

        let command = match symbol {
            UNDO_SYMBOL => {
                tokens.push((position, Token::Undo));
                continue;
            }
            'E' => Command::Rotate {
                rotation: Rotation::Clockwise,
            },
            'Q' => Command::Rotate {
                rotation: Rotation::CounterClockwise,
            },
            'F' => Command::ActivateFastMove,
            'L' => Command::ActivateDrill,
            'R' => Command::PlaceBeacon,
            'B' => {
                let (open, argument) = read_argument(input, &mut chars, symbol, position)?;
                let (dx, dy) = parse_pair::<i32>(argument, open)?;
                Command::AttachManipulator {
                    offset: Offset::new(dx, dy),
                }
            }
            'T' => {
                let (open, argument) = read_argument(input, &mut chars, symbol, position)?;
                let (x, y) = parse_pair::<u32>(argument, open)?;
                Command::Teleport {
                    target: Point::new(x, y),
                }
            }
            other => match Direction::from_symbol(other) {
                Some(direction) => Command::Move { direction },
                None => {
                    return Err(StreamError::UnexpectedSymbol {
                        symbol: other,
                        position,
                    })
                }
            },
        };
        tokens.push((position, Token::Command(command)));
    }

    Ok(tokens)
}

fn read_argument<'a>(
    input: &'a str,
    chars: &mut CharIndices<'_>,
    symbol: char,
    position: usize,
) -> Result<(usize, &'a str), StreamError> {
    let Some((open, '(')) = chars.next() else {
        return Err(StreamError::MissingArgument { symbol, position });
    };

    for (index, next) in chars.by_ref() {
        if next == ')' {
            return Ok((open, &input[open + 1..index]));
        }
    }

    Err(StreamError::UnterminatedArgument { position: open })
}

fn parse_pair<T: FromStr>(argument: &str, position: usize) -> Result<(T, T), StreamError> {
    let malformed = || StreamError::MalformedArgument {
        argument: argument.to_owned(),
        position,
    };
    let (first, second) = argument.split_once(',').ok_or_else(malformed)?;
    let first = first.trim().parse::<T>().map_err(|_| malformed())?;
    let second = second.trim().parse::<T>().map_err(|_| malformed())?;
    Ok((first, second))
}
