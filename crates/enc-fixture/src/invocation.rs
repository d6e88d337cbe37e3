//! Producer command lines recorded in fixture headers.
//!
//! Headers carry a line like
//! ``# Function call ```./write/new_enc/oneangle --weights 1 --nbins 50 ``` ``.
//! The command is split on whitespace into the program, `--flag` options
//! with their trailing values, and positional tokens.

use std::str::FromStr;

use enc_core::errors::{EncError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::parser::Comment;

const FENCE: &str = "```";

/// One `--name v1 v2 ...` option, in command line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdOption {
    /// Option name without leading dashes.
    pub name: String,
    /// Values following the option, possibly none for boolean flags.
    pub values: Vec<String>,
}

/// Parsed producer command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Program path as written (`./write/new_enc/oneangle`).
    pub program: String,
    /// Options in the order they appeared.
    pub options: Vec<CmdOption>,
    /// Tokens that preceded the first option.
    pub positional: Vec<String>,
}

fn invocation_error(code: &str, message: impl Into<String>) -> EncError {
    EncError::Fixture(ErrorInfo::new(code, message))
}

fn is_option(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => !rest.is_empty() && !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'),
        None => false,
    }
}

impl Invocation {
    /// Parses a bare command line.
    pub fn parse(command: &str) -> Result<Self, EncError> {
        let mut tokens = command.split_whitespace();
        let program = tokens
            .next()
            .ok_or_else(|| invocation_error("enc_fixture.invocation.empty", "empty command line"))?
            .to_string();

        let mut options: Vec<CmdOption> = Vec::new();
        let mut positional = Vec::new();
        for token in tokens {
            if is_option(token) {
                let name = token.trim_start_matches('-');
                match name.split_once('=') {
                    Some((name, value)) => options.push(CmdOption {
                        name: name.to_string(),
                        values: vec![value.to_string()],
                    }),
                    None => options.push(CmdOption {
                        name: name.to_string(),
                        values: Vec::new(),
                    }),
                }
            } else if let Some(last) = options.last_mut() {
                last.values.push(token.to_string());
            } else {
                positional.push(token.to_string());
            }
        }
        Ok(Self {
            program,
            options,
            positional,
        })
    }

    /// Finds the first fenced command among header comments.
    pub fn from_comments(comments: &[Comment]) -> Result<Option<Self>, EncError> {
        for comment in comments {
            if let Some(command) = fenced(&comment.text) {
                return Self::parse(command).map(Some);
            }
        }
        Ok(None)
    }

    /// Final path component of the program (`oneangle`).
    pub fn program_name(&self) -> &str {
        self.program
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.program)
    }

    fn option(&self, name: &str) -> Option<&CmdOption> {
        self.options.iter().rev().find(|opt| opt.name == name)
    }

    /// Whether the option appears at all.
    pub fn flag(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    /// First value of the option.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.option(name)
            .and_then(|opt| opt.values.first())
            .map(String::as_str)
    }

    /// All values of the option; empty when absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.option(name).map(|opt| opt.values.as_slice()).unwrap_or(&[])
    }

    /// Parses the first value of the option.
    pub fn parse_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, EncError>
    where
        T::Err: std::fmt::Display,
    {
        self.value(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|err| {
                    invocation_error(
                        "enc_fixture.invocation.bad_value",
                        format!("--{name} {raw}: {err}"),
                    )
                })
            })
            .transpose()
    }

    /// Parses every value of the option.
    pub fn parse_values<T: FromStr>(&self, name: &str) -> Result<Vec<T>, EncError>
    where
        T::Err: std::fmt::Display,
    {
        self.values(name)
            .iter()
            .map(|raw| {
                raw.parse::<T>().map_err(|err| {
                    invocation_error(
                        "enc_fixture.invocation.bad_value",
                        format!("--{name} {raw}: {err}"),
                    )
                })
            })
            .collect()
    }

    /// Reassembles the command line.
    pub fn to_command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.positional.iter().cloned());
        for opt in &self.options {
            parts.push(format!("--{}", opt.name));
            parts.extend(opt.values.iter().cloned());
        }
        parts.join(" ")
    }
}

fn fenced(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    let command = rest[..end].trim();
    (!command.is_empty()).then_some(command)
}
