use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected a non-negative integer, got negative value `{input}`")]
    Negative { input: String },

    #[error("expected a non-negative integer, got `{input}`")]
    NotAnInteger { input: String },

    #[error("expected a non-negative integer, got empty input")]
    Empty,

    #[error("length must be at least 1")]
    ZeroLength,

    #[error("unknown Fibonacci strategy `{name}` (expected iterative, fold or recursive)")]
    UnknownStrategy { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse a sequence index from user input.
///
/// Surrounding whitespace is ignored and a leading `+` is accepted. Anything
/// else that is not a base-10 non-negative integer is rejected.
pub fn parse_index(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Empty);
    }

    trimmed.parse::<u64>().map_err(|_| {
        let is_negative = trimmed
            .strip_prefix('-')
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()));
        if is_negative {
            Error::Negative {
                input: trimmed.to_string(),
            }
        } else {
            Error::NotAnInteger {
                input: trimmed.to_string(),
            }
        }
    })
}

/// Like [`parse_index`], but `0` is rejected.
pub fn parse_length(input: &str) -> Result<u64> {
    match parse_index(input)? {
        0 => Err(Error::ZeroLength),
        n => Ok(n),
    }
}
