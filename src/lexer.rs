use crate::{Result, TimespecError};
use chrono::Weekday;
use std::{fmt::Display, fs, path::Path};

/// Classified lexeme of a schedule phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Plain unsigned number.
    Number(u32),
    /// Number with an English ordinal suffix, the suffix stripped.
    Ordinal(u32),
    /// `hourly`
    Hourly,
    /// `daily`
    Daily,
    /// `weekly`
    Weekly,
    /// `monthly`
    Monthly,
    /// `at`
    At,
    /// `on`
    On,
    /// `the`
    The,
    /// `am`
    Am,
    /// `pm`
    Pm,
    /// `every day`
    EveryDay,
    /// `every hour`
    EveryHour,
    /// `after` or `past`
    After,
    /// `til` or `until`
    Til,
    /// `quarter`
    Quarter,
    /// `half`
    Half,
    /// Any spelling of a day of the week.
    Weekday(Weekday),
    /// `:`
    Colon,
    /// Single unclassified character.
    Char(char),
    /// Input is exhausted.
    End,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::Ordinal(n) => write!(f, "ordinal {n}{}", crate::utils::ordinal_suffix(*n)),
            Token::Hourly => write!(f, "`hourly`"),
            Token::Daily => write!(f, "`daily`"),
            Token::Weekly => write!(f, "`weekly`"),
            Token::Monthly => write!(f, "`monthly`"),
            Token::At => write!(f, "`at`"),
            Token::On => write!(f, "`on`"),
            Token::The => write!(f, "`the`"),
            Token::Am => write!(f, "`am`"),
            Token::Pm => write!(f, "`pm`"),
            Token::EveryDay => write!(f, "`every day`"),
            Token::EveryHour => write!(f, "`every hour`"),
            Token::After => write!(f, "`after`"),
            Token::Til => write!(f, "`til`"),
            Token::Quarter => write!(f, "`quarter`"),
            Token::Half => write!(f, "`half`"),
            Token::Weekday(day) => write!(f, "`{}`", crate::utils::weekday_name(*day)),
            Token::Colon => write!(f, "`:`"),
            Token::Char(c) => write!(f, "`{c}`"),
            Token::End => write!(f, "end of input"),
        }
    }
}

/// Keyword table entry: a token with all of its accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    token: Token,
    spellings: &'static [&'static str],
}

impl Keyword {
    /// A single space inside of a spelling stands for any non-empty run of whitespace.
    pub const fn new(token: Token, spellings: &'static [&'static str]) -> Self {
        Self { token, spellings }
    }

    /// Length of the longest spelling matching at the start of `input`.
    ///
    /// Empty matches don't count, otherwise the lexer would never move forward.
    fn matches(&self, input: &str) -> Option<usize> {
        self.spellings
            .iter()
            .filter_map(|spelling| match_spelling(input, spelling))
            .filter(|len| *len > 0)
            .max()
    }
}

/// Ordered keyword table used by [`Lexer`].
///
/// Keywords are tried in the table order, and the first one that matches wins.
/// Order matters: `monthly` has to come before `mon`, for example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    keywords: Vec<Keyword>,
}

impl Lexicon {
    /// Builds a lexicon from an ordered list of keywords.
    pub fn new(keywords: Vec<Keyword>) -> Self {
        Self { keywords }
    }

    /// Keywords in the priority order.
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(vec![
            Keyword::new(Token::Daily, &["daily"]),
            Keyword::new(Token::Weekly, &["weekly"]),
            Keyword::new(Token::Monthly, &["monthly"]),
            Keyword::new(Token::Hourly, &["hourly"]),
            Keyword::new(Token::At, &["at"]),
            Keyword::new(Token::On, &["on"]),
            Keyword::new(Token::Am, &["am"]),
            Keyword::new(Token::Pm, &["pm"]),
            Keyword::new(Token::EveryDay, &["every day"]),
            Keyword::new(Token::EveryHour, &["every hour"]),
            Keyword::new(Token::The, &["the"]),
            Keyword::new(Token::After, &["after", "past"]),
            Keyword::new(Token::Til, &["til", "until"]),
            Keyword::new(Token::Quarter, &["quarter"]),
            Keyword::new(Token::Half, &["half"]),
            Keyword::new(Token::Weekday(Weekday::Sun), &["sun", "sunday", "sundays"]),
            Keyword::new(Token::Weekday(Weekday::Mon), &["mon", "monday", "mondays"]),
            Keyword::new(Token::Weekday(Weekday::Tue), &["tue", "tues", "tuesday", "tuesdays"]),
            Keyword::new(Token::Weekday(Weekday::Wed), &["wed", "wednesday", "wednesdays"]),
            Keyword::new(
                Token::Weekday(Weekday::Thu),
                &["thu", "thur", "thurs", "thursday", "thursdays"],
            ),
            Keyword::new(Token::Weekday(Weekday::Fri), &["fri", "friday", "fridays"]),
            Keyword::new(Token::Weekday(Weekday::Sat), &["sat", "saturday", "saturdays"]),
        ])
    }
}

/// Splits a schedule phrase into [`Token`]s, one per [`next_token`](Lexer::next_token) call.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    lexicon: &'a Lexicon,
    buf: String,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Lexer over a schedule phrase. Matching is case-insensitive.
    pub fn new(input: &str, lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            buf: input.to_ascii_lowercase(),
            pos: 0,
        }
    }

    /// Lexer over the whole content of a file.
    pub fn from_file(path: impl AsRef<Path>, lexicon: &'a Lexicon) -> Result<Self> {
        let content = read_schedule_file(path.as_ref())?;
        Ok(Self::new(&content, lexicon))
    }

    /// Not yet consumed part of the input.
    pub fn remaining(&self) -> &str {
        &self.buf[self.pos..]
    }

    /// Consumes and returns the next token.
    ///
    /// Keywords are tried first, then ordinals, then plain numbers.
    /// Anything else comes out as a single [`Token::Char`].
    pub fn next_token(&mut self) -> Result<Token> {
        let rest = self.remaining();
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;

        let (token, len) = self.scan()?;
        self.pos += len;

        log::trace!("lexed {token:?}");
        Ok(token)
    }

    /// Consumes the rest of the input, the trailing [`Token::End`] included.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = vec![];
        loop {
            let token = self.next_token()?;
            tokens.push(token);
            if token == Token::End {
                return Ok(tokens);
            }
        }
    }

    fn scan(&self) -> Result<(Token, usize)> {
        let rest = self.remaining();

        if let Some(keyword) = self.keyword(rest) {
            return Ok(keyword);
        }
        if let Some((digits, len)) = ordinal(rest) {
            return Ok((Token::Ordinal(numify(digits)?), len));
        }
        if let Some(digits) = number(rest) {
            return Ok((Token::Number(numify(digits)?), digits.len()));
        }

        Ok(match rest.chars().next() {
            Some(':') => (Token::Colon, 1),
            Some(c) => (Token::Char(c), c.len_utf8()),
            None => (Token::End, 0),
        })
    }

    fn keyword(&self, input: &str) -> Option<(Token, usize)> {
        self.lexicon
            .keywords
            .iter()
            .find_map(|keyword| keyword.matches(input).map(|len| (keyword.token, len)))
    }
}

pub(crate) fn read_schedule_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| TimespecError::UnreadableFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn match_spelling(input: &str, spelling: &str) -> Option<usize> {
    let mut consumed = 0;
    for (i, word) in spelling.split(' ').enumerate() {
        let rest = &input[consumed..];
        if i > 0 {
            let trimmed = rest.trim_start();
            if trimmed.len() == rest.len() {
                return None;
            }
            consumed += rest.len() - trimmed.len();
        }
        if !input[consumed..].starts_with(word) {
            return None;
        }
        consumed += word.len();
    }
    Some(consumed)
}

fn number(input: &str) -> Option<&str> {
    let len = input.bytes().take_while(u8::is_ascii_digit).count();
    (len > 0).then(|| &input[..len])
}

fn ordinal(input: &str) -> Option<(&str, usize)> {
    let digits = number(input)?;
    let suffix = &input[digits.len()..];
    ["st", "nd", "rd", "th"]
        .iter()
        .find(|s| suffix.starts_with(*s))
        .map(|s| (digits, digits.len() + s.len()))
}

fn numify(digits: &str) -> Result<u32> {
    digits
        .parse()
        .map_err(|_| TimespecError::InvalidNumber(digits.to_owned()))
}
