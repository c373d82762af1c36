//! Reader for the text format of the ballots.
//!
//! There is one ballot per line. A ballot is a list of candidate numbers (starting at 1)
//! separated by `>` (the left side is preferred) or `=` (tie). Spaces and tabs are allowed
//! between the tokens. Lines are separated by any run of CR and LF. Blank lines are skipped
//! and the last ballot does not need a line terminator.
//!
//! ```text
//! 1 > 3 = 2 > 4
//! 2
//! ```
//!
//! The input is read one byte at a time by a state machine.

use std::io::{BufReader, Bytes, Read};
use std::mem;

use log::debug;
use snafu::prelude::*;

use crate::config::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum State {
    Start,
    EmptyInput,
    BeforeNumber,
    Number,
    AfterNumber,
    GreaterThan,
    Equal,
    EndLine,
    EndParsing,
    Done,
}

/// An input byte (or the end of the input), as seen by the state machine.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Symbol {
    Digit(u8),
    Blank,
    LineBreak,
    Greater,
    Equal,
    End,
    Other,
}

impl Symbol {
    fn classify(input: Option<u8>) -> Symbol {
        match input {
            None => Symbol::End,
            Some(c @ b'0'..=b'9') => Symbol::Digit(c - b'0'),
            Some(b' ' | b'\t') => Symbol::Blank,
            Some(b'\r' | b'\n') => Symbol::LineBreak,
            Some(b'>') => Symbol::Greater,
            Some(b'=') => Symbol::Equal,
            Some(_) => Symbol::Other,
        }
    }
}

/// The symbol is not accepted by the grammar in the current state.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum GrammarError {
    UnexpectedSymbol,
    PrematureEnd,
}

fn transition(state: State, symbol: Symbol) -> Result<State, GrammarError> {
    let next = match (state, symbol) {
        (
            State::Start
            | State::EmptyInput
            | State::BeforeNumber
            | State::Number
            | State::GreaterThan
            | State::Equal,
            Symbol::Digit(_),
        ) => State::Number,

        (State::Start, Symbol::LineBreak) => State::Start,
        (State::Start | State::EmptyInput, Symbol::Blank | Symbol::LineBreak) => State::EmptyInput,
        (State::Start | State::EmptyInput, Symbol::End) => State::Done,

        (State::BeforeNumber | State::GreaterThan | State::Equal, Symbol::Blank) => {
            State::BeforeNumber
        }

        (State::Number | State::AfterNumber, Symbol::Blank) => State::AfterNumber,
        (State::Number | State::AfterNumber, Symbol::LineBreak) => State::EndLine,
        (State::Number | State::AfterNumber, Symbol::Greater) => State::GreaterThan,
        (State::Number | State::AfterNumber, Symbol::Equal) => State::Equal,
        (State::Number | State::AfterNumber, Symbol::End) => State::EndParsing,

        // A finished line starts over.
        (State::EndLine, s) => return transition(State::Start, s),
        (State::EndParsing | State::Done, _) => State::Done,

        (_, Symbol::End) => return Err(GrammarError::PrematureEnd),
        _ => return Err(GrammarError::UnexpectedSymbol),
    };
    Ok(next)
}

/// A ballot being filled, in the order of the input.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PartialBallot {
    ranked: Vec<bool>,
    groups: Vec<Vec<CandidateId>>,
    current_group: Vec<CandidateId>,
}

impl PartialBallot {
    fn new(candidate_count: usize) -> PartialBallot {
        PartialBallot {
            ranked: vec![false; candidate_count],
            groups: Vec::new(),
            current_group: Vec::new(),
        }
    }

    /// Adds the candidate with the given 1-based number to the current group.
    ///
    /// `number` is `None` when the written number does not fit in a `usize`.
    fn push_number(
        &mut self,
        number: Option<usize>,
        written: &str,
        line: usize,
    ) -> Result<(), ParseError> {
        let candidate_count = self.ranked.len();
        let cid = match number.and_then(|n| n.checked_sub(1)) {
            Some(idx) if idx < candidate_count => CandidateId(idx),
            _ => {
                return OutOfRangeCandidateSnafu {
                    candidate: written,
                    candidate_count,
                    line,
                }
                .fail()
            }
        };
        ensure!(
            !self.ranked[cid.0],
            DuplicateCandidateInBallotSnafu {
                candidate: cid.number(),
                line
            }
        );
        self.ranked[cid.0] = true;
        self.current_group.push(cid);
        Ok(())
    }

    fn close_group(&mut self) {
        if !self.current_group.is_empty() {
            self.groups.push(mem::take(&mut self.current_group));
        }
    }

    /// The candidates that were not mentioned are appended as one last tied group.
    fn finish(mut self) -> Ballot {
        self.close_group();
        let omitted: Vec<CandidateId> = self
            .ranked
            .iter()
            .enumerate()
            .filter_map(|(idx, ranked)| if *ranked { None } else { Some(CandidateId(idx)) })
            .collect();
        if !omitted.is_empty() {
            self.groups.push(omitted);
        }
        Ballot {
            groups: self.groups,
            candidate_count: self.ranked.len(),
        }
    }
}

impl Ballot {
    /// Builds a ballot from groups of candidates, from the most preferred group to the least
    /// preferred one.
    ///
    /// The same rules as for the text format apply: every candidate must be valid and appear
    /// at most once. Empty groups are ignored and the candidates that are not mentioned are
    /// appended as a last group.
    ///
    /// Errors are reported on line 1. [crate::Builder::add_groups] reports the position of the
    /// ballot in the builder instead.
    ///
    /// ```
    /// use schulze_voting::{Ballot, CandidateId};
    ///
    /// let ballot = Ballot::from_groups(&[vec![CandidateId(1)]], 3)?;
    /// assert_eq!(
    ///     ballot.groups(),
    ///     &[vec![CandidateId(1)], vec![CandidateId(0), CandidateId(2)]]
    /// );
    /// # Ok::<(), schulze_voting::ParseError>(())
    /// ```
    pub fn from_groups(
        groups: &[Vec<CandidateId>],
        candidate_count: usize,
    ) -> Result<Ballot, ParseError> {
        Ballot::from_groups_at_line(groups, candidate_count, 1)
    }

    pub(crate) fn from_groups_at_line(
        groups: &[Vec<CandidateId>],
        candidate_count: usize,
        line: usize,
    ) -> Result<Ballot, ParseError> {
        let mut partial = PartialBallot::new(candidate_count);
        for group in groups.iter() {
            for cid in group.iter() {
                let number = cid.number();
                partial.push_number(Some(number), &number.to_string(), line)?;
            }
            partial.close_group();
        }
        Ok(partial.finish())
    }
}

/// Reads the ballots of a stream, one at a time.
///
/// The iterator stops after the end of the input or after the first error: any error
/// makes the whole input invalid.
///
/// ```
/// use schulze_voting::{BallotParser, CandidateId};
///
/// let mut parser = BallotParser::new("1 = 2 > 3\n\n2\n".as_bytes(), 3);
/// let first = parser.next().unwrap()?;
/// assert_eq!(
///     first.groups(),
///     &[vec![CandidateId(0), CandidateId(1)], vec![CandidateId(2)]]
/// );
/// let second = parser.next().unwrap()?;
/// assert_eq!(
///     second.groups(),
///     &[vec![CandidateId(1)], vec![CandidateId(0), CandidateId(2)]]
/// );
/// assert!(parser.next().is_none());
/// # Ok::<(), schulze_voting::ParseError>(())
/// ```
pub struct BallotParser<R: Read> {
    input: Bytes<BufReader<R>>,
    candidate_count: usize,
    state: State,
    ballot: PartialBallot,
    number: Option<usize>,
    // The digits of the current number, as written.
    digits: String,
    line: usize,
    column: usize,
    last_byte: Option<u8>,
}

impl<R: Read> BallotParser<R> {
    pub fn new(input: R, candidate_count: usize) -> BallotParser<R> {
        BallotParser::starting_at_line(input, candidate_count, 1)
    }

    /// A parser whose first line has the given number in the error messages.
    pub(crate) fn starting_at_line(
        input: R,
        candidate_count: usize,
        first_line: usize,
    ) -> BallotParser<R> {
        BallotParser {
            input: BufReader::new(input).bytes(),
            candidate_count,
            state: State::Start,
            ballot: PartialBallot::new(candidate_count),
            number: Some(0),
            digits: String::new(),
            line: first_line,
            column: 0,
            last_byte: None,
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>, ParseError> {
        let byte = match self.input.next() {
            None => None,
            Some(res) => Some(res.context(ReadInputSnafu { line: self.line })?),
        };
        if let Some(b) = byte {
            // CR LF is a single line break.
            let crlf = self.last_byte == Some(b'\r') && b == b'\n';
            if matches!(self.last_byte, Some(b'\r' | b'\n')) && !crlf {
                self.line += 1;
                self.column = 0;
            }
            self.column += 1;
            self.last_byte = Some(b);
        }
        Ok(byte)
    }

    fn close_number(&mut self) -> Result<(), ParseError> {
        let number = mem::replace(&mut self.number, Some(0));
        let digits = mem::take(&mut self.digits);
        self.ballot.push_number(number, &digits, self.line)
    }

    fn finish_ballot(&mut self) -> Ballot {
        let partial = mem::replace(&mut self.ballot, PartialBallot::new(self.candidate_count));
        let ballot = partial.finish();
        debug!("line {}: ballot {:?}", self.line, ballot.groups());
        ballot
    }

    fn grammar_error(&self, error: GrammarError, byte: Option<u8>) -> ParseError {
        match (error, byte) {
            (GrammarError::UnexpectedSymbol, Some(character)) => ParseError::UnexpectedCharacter {
                character,
                line: self.line,
                column: self.column,
            },
            _ => ParseError::PrematureEndOfInput { line: self.line },
        }
    }

    fn next_ballot(&mut self) -> Result<Option<Ballot>, ParseError> {
        loop {
            let byte = self.read_byte()?;
            let symbol = Symbol::classify(byte);

            // The number is checked as soon as it is complete, before looking at what follows.
            if self.state == State::Number && !matches!(symbol, Symbol::Digit(_)) {
                self.close_number()?;
            }

            let next = transition(self.state, symbol).map_err(|e| self.grammar_error(e, byte))?;
            if let Symbol::Digit(d) = symbol {
                self.number = self
                    .number
                    .and_then(|n| n.checked_mul(10))
                    .and_then(|n| n.checked_add(d as usize));
                self.digits.push(char::from(b'0' + d));
            }
            self.state = next;

            match next {
                State::GreaterThan => self.ballot.close_group(),
                State::EndLine => {
                    self.state = State::Start;
                    return Ok(Some(self.finish_ballot()));
                }
                State::EndParsing => {
                    self.state = State::Done;
                    return Ok(Some(self.finish_ballot()));
                }
                State::Done => return Ok(None),
                _ => {}
            }
        }
    }
}

impl<R: Read> Iterator for BallotParser<R> {
    type Item = Result<Ballot, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        match self.next_ballot() {
            Ok(Some(ballot)) => Some(Ok(ballot)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}
