use crate::{
    lexer::{Lexer, Lexicon, Token},
    spec::Spec,
    utils::{self, MINUTES_PER_HOUR},
    Result, TimespecError,
};
use chrono::Weekday;

/// Recursive descent parser of schedule phrases, one method per grammar rule.
///
/// ```text
/// schedule       := hourly | daily | weekly | monthly
/// hourly         := ("hourly" | "every hour") ["at"] minute-of-hour
/// daily          := ("daily" | "every day") ["at"] time
/// weekly         := "weekly" (time-clause ["on"] WEEKDAY | ["on"] WEEKDAY [time-clause])
///                 | "at" time ["on"] WEEKDAY
///                 | "on" WEEKDAY [time-clause]
///                 | WEEKDAY [time-clause]
/// monthly        := "monthly" (time-clause day-clause | day-clause [time-clause])
///                 | ORDINAL WEEKDAY [time-clause]
/// day-clause     := ["on"] ["the"] ORDINAL [WEEKDAY]
/// time-clause    := ["at"] time
/// time           := NUMBER [":" NUMBER] ["am" | "pm"]
/// minute-of-hour := NUMBER | ["x" | "*" | "h"] ":" NUMBER
///                 | (NUMBER | "quarter" | "half") ("after" | "til")
/// ```
pub(crate) struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    lookahead: Token,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str, lexicon: &'a Lexicon) -> Result<Self> {
        let mut lexer = Lexer::new(input, lexicon);
        let lookahead = lexer.next_token()?;
        Ok(Self {
            input,
            lexer,
            lookahead,
        })
    }

    /// Parses the whole input into a [`Spec`].
    pub(crate) fn parse(mut self) -> Result<Spec> {
        let spec = self.schedule()?;
        if self.lookahead != Token::End {
            return Err(self.unexpected("end of schedule"));
        }

        log::debug!("parsed `{}` as {spec:?}", self.input);
        Ok(spec)
    }

    fn schedule(&mut self) -> Result<Spec> {
        match self.lookahead {
            Token::Hourly | Token::EveryHour => self.hourly(),
            Token::Daily | Token::EveryDay => self.daily(),
            Token::Weekly | Token::At | Token::On | Token::Weekday(_) => self.weekly(),
            Token::Monthly | Token::Ordinal(_) => self.monthly(),
            _ => Err(self.unexpected("`hourly`, `daily`, `weekly`, `monthly` or a day of the week")),
        }
    }

    fn hourly(&mut self) -> Result<Spec> {
        self.advance()?;
        self.accept(Token::At)?;
        Ok(Spec::hourly(self.minute_of_hour()?))
    }

    fn daily(&mut self) -> Result<Spec> {
        self.advance()?;
        Ok(Spec::daily(self.time_clause()?))
    }

    fn weekly(&mut self) -> Result<Spec> {
        match self.lookahead {
            Token::Weekly => {
                self.advance()?;
                if self.at_time_clause() {
                    let time = self.time_clause()?;
                    self.accept(Token::On)?;
                    Ok(Spec::weekly(time, self.weekday()?))
                } else {
                    self.accept(Token::On)?;
                    let weekday = self.weekday()?;
                    Ok(Spec::weekly(self.optional_time_clause()?, weekday))
                }
            }
            Token::At => {
                let time = self.time_clause()?;
                self.accept(Token::On)?;
                Ok(Spec::weekly(time, self.weekday()?))
            }
            _ => {
                self.accept(Token::On)?;
                let weekday = self.weekday()?;
                Ok(Spec::weekly(self.optional_time_clause()?, weekday))
            }
        }
    }

    fn monthly(&mut self) -> Result<Spec> {
        if let Token::Ordinal(week) = self.lookahead {
            self.advance()?;
            let weekday = self.weekday()?;
            return Ok(Spec::monthly_on_weekday(self.optional_time_clause()?, weekday, week));
        }

        self.expect(Token::Monthly, "`monthly`")?;
        if self.at_time_clause() {
            let time = self.time_clause()?;
            let (ordinal, weekday) = self.day_clause()?;
            Ok(monthly(time, ordinal, weekday))
        } else {
            let (ordinal, weekday) = self.day_clause()?;
            Ok(monthly(self.optional_time_clause()?, ordinal, weekday))
        }
    }

    /// `["on"] ["the"] ORDINAL [WEEKDAY]`
    fn day_clause(&mut self) -> Result<(u32, Option<Weekday>)> {
        self.accept(Token::On)?;
        self.accept(Token::The)?;
        let Token::Ordinal(ordinal) = self.lookahead else {
            return Err(self.unexpected("a day of the month like `15th`"));
        };
        self.advance()?;

        let weekday = match self.lookahead {
            Token::Weekday(weekday) => {
                self.advance()?;
                Some(weekday)
            }
            _ => None,
        };
        Ok((ordinal, weekday))
    }

    fn at_time_clause(&self) -> bool {
        matches!(self.lookahead, Token::At | Token::Number(_))
    }

    /// Time clause which may be left out, midnight then.
    fn optional_time_clause(&mut self) -> Result<u32> {
        if self.at_time_clause() {
            self.time_clause()
        } else {
            Ok(0)
        }
    }

    /// `["at"] time`
    fn time_clause(&mut self) -> Result<u32> {
        self.accept(Token::At)?;
        self.time()
    }

    /// `NUMBER [":" NUMBER] ["am" | "pm"]`, as minutes since midnight.
    fn time(&mut self) -> Result<u32> {
        let hours = self.number("a time of day")?;
        if hours > 23 {
            return Err(self.invalid(format!("hour {hours} is out of range")));
        }

        let minutes = if self.accept(Token::Colon)? {
            let minutes = self.number("minutes")?;
            if minutes >= MINUTES_PER_HOUR {
                return Err(self.invalid(format!("minute {minutes} is out of range")));
            }
            minutes
        } else {
            0
        };

        let hours = match self.lookahead {
            Token::Am => {
                self.advance()?;
                hours
            }
            Token::Pm => {
                self.advance()?;
                hours + 12
            }
            _ => hours,
        };

        Ok(utils::hhmm(hours, minutes))
    }

    /// Minutes past the hour in one of the forms `30`, `:30`, `x:30`, `quarter after`, `10 til`.
    fn minute_of_hour(&mut self) -> Result<u32> {
        let minutes = match self.lookahead {
            Token::Char('x' | '*' | 'h') => {
                self.advance()?;
                self.expect(Token::Colon, "`:`")?;
                self.number("minutes")?
            }
            Token::Colon => {
                self.advance()?;
                self.number("minutes")?
            }
            Token::Quarter => {
                self.advance()?;
                self.relative_minutes(15)?
            }
            Token::Half => {
                self.advance()?;
                self.relative_minutes(30)?
            }
            Token::Number(minutes) => {
                self.advance()?;
                if matches!(self.lookahead, Token::After | Token::Til) {
                    self.relative_minutes(minutes)?
                } else {
                    minutes
                }
            }
            _ => return Err(self.unexpected("minutes past the hour")),
        };

        if minutes >= MINUTES_PER_HOUR {
            return Err(self.invalid(format!("minute {minutes} is out of range")));
        }
        Ok(minutes)
    }

    /// `"after"` keeps `minutes` as is, `"til"` counts them back from the next hour.
    fn relative_minutes(&mut self, minutes: u32) -> Result<u32> {
        match self.lookahead {
            Token::After => {
                self.advance()?;
                Ok(minutes)
            }
            Token::Til => {
                self.advance()?;
                if minutes >= MINUTES_PER_HOUR {
                    return Err(self.invalid(format!("minute {minutes} is out of range")));
                }
                Ok((MINUTES_PER_HOUR - minutes) % MINUTES_PER_HOUR)
            }
            _ => Err(self.unexpected("`after` or `til`")),
        }
    }

    fn weekday(&mut self) -> Result<Weekday> {
        if let Token::Weekday(weekday) = self.lookahead {
            self.advance()?;
            Ok(weekday)
        } else {
            Err(self.unexpected("a day of the week"))
        }
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        if let Token::Number(value) = self.lookahead {
            self.advance()?;
            Ok(value)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.lookahead = self.lexer.next_token()?;
        Ok(())
    }

    /// Consumes `token` if it's the next one.
    fn accept(&mut self, token: Token) -> Result<bool> {
        if self.lookahead == token {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.accept(token)? {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> TimespecError {
        self.invalid(format!("expected {expected}, found {}", self.lookahead))
    }

    fn invalid(&self, reason: String) -> TimespecError {
        TimespecError::InvalidSchedule {
            schedule: self.input.to_owned(),
            reason,
        }
    }
}

fn monthly(time: u32, ordinal: u32, weekday: Option<Weekday>) -> Spec {
    match weekday {
        Some(weekday) => Spec::monthly_on_weekday(time, weekday, ordinal),
        None => Spec::monthly_on_day(time, ordinal),
    }
}
