use nom::{
    IResult,
    bytes::complete::take_while1,
    combinator::{all_consuming, map_res, verify},
    error::context,
};

use crate::error::{Error, ErrorExt, Result};
use crate::parsing::significant_lines;

/// Number of characters on a line of the textual binary format.
pub const WORD_WIDTH: usize = 16;

fn word(input: &str) -> IResult<&str, u16, Error> {
    context(
        "binary word",
        map_res(
            verify(
                take_while1(|c: char| c == '0' || c == '1'),
                |digits: &str| digits.len() == WORD_WIDTH,
            ),
            |digits: &str| u16::from_str_radix(digits, 2),
        ),
    )(input)
}

/// Reads the textual binary format: one word per line, written as sixteen `0`/`1`
/// characters, most significant bit first. Blank lines are ignored.
pub fn parse_words(text: &str) -> Result<Vec<u16>> {
    significant_lines(text)
        .map(|(line, digits)| {
            let parsed = match all_consuming(word)(digits) {
                Ok((_, word)) => Ok(word),
                Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
                Err(nom::Err::Incomplete(_)) => Err(Error::malformed("expected sixteen bits")),
            };

            parsed.at_line(line)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_words() {
        let words = parse_words("0000000000000010\n1110110000010000\n\n").unwrap();
        assert_eq!(words, vec![2, 0b1110_1100_0001_0000]);
    }

    #[test]
    fn test_parse_words_rejects_bad_lines() {
        assert_eq!(parse_words("0000\n").unwrap_err().line, Some(1));
        assert_eq!(parse_words("0000000000000000\n00000000000000002\n").unwrap_err().line, Some(2));
        assert!(parse_words("00000000000000000\n").is_err());
    }
}
