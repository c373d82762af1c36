// ********* Input data structures ***********

use snafu::Snafu;

use crate::tally::PairwiseMatrix;

/// A candidate, identified by its position in the candidate list (starting at 0).
///
/// The ballot text format and all the error messages use the 1-based numbering
/// returned by [CandidateId::number].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub usize);

impl CandidateId {
    /// The number of this candidate as written on a ballot.
    pub fn number(self) -> usize {
        self.0.saturating_add(1)
    }
}

/// The preferences of one voter.
///
/// A ballot is a sequence of groups, from the most preferred to the least
/// preferred. All the candidates inside a group are tied.
///
/// Invariant: every candidate appears in exactly one group. The candidates
/// that the voter did not mention form the last group.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    pub(crate) groups: Vec<Vec<CandidateId>>,
    pub(crate) candidate_count: usize,
}

impl Ballot {
    pub fn groups(&self) -> &[Vec<CandidateId>] {
        &self.groups
    }

    /// The number of candidates in the election this ballot was validated for.
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }
}

// ******** Output data structures *********

/// Statistics for one round of the Schulze resolution.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    /// The round number, starting at 1. It is also the place given to the winners of this round.
    pub round: u32,
    /// The candidates that were still unranked at the start of the round, in candidate order.
    pub candidates: Vec<CandidateId>,
    /// The strength of the strongest path between each pair of `candidates`,
    /// indexed by their position in `candidates`.
    pub strongest_paths: Vec<Vec<u64>>,
    pub winners: Vec<CandidateId>,
}

/// A place in the final ranking. Tied candidates share the same place.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedPlace {
    pub place: u32,
    pub candidates: Vec<CandidateId>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SchulzeResult {
    pub candidate_count: usize,
    /// The number of ballots read. Blank lines are not ballots.
    pub ballot_count: u64,
    pub pairwise: PairwiseMatrix,
    pub rounds: Vec<RoundStats>,
    /// The winners of the first round. There may be more than one.
    pub winners: Vec<CandidateId>,
}

impl SchulzeResult {
    /// The places, in order. When only the winners were requested, this is a single place.
    pub fn ranking(&self) -> Vec<RankedPlace> {
        self.rounds
            .iter()
            .map(|rs| RankedPlace {
                place: rs.round,
                candidates: rs.winners.clone(),
            })
            .collect()
    }
}

/// Errors found while reading ballots.
///
/// Candidates are reported with their 1-based number, as written in the input.
/// Lines start at 1. For the ballots given one by one to a [crate::Builder], the line is
/// the position of the ballot in the builder.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("line {line}: candidate {candidate} is invalid! (1, {candidate_count})"))]
    OutOfRangeCandidate {
        candidate: String,
        candidate_count: usize,
        line: usize,
    },
    #[snafu(display("line {line}: candidate {candidate} is ranked twice!"))]
    DuplicateCandidateInBallot { candidate: usize, line: usize },
    #[snafu(display("line {line}, column {column}: {}", describe_input(*character)))]
    UnexpectedCharacter {
        character: u8,
        line: usize,
        column: usize,
    },
    #[snafu(display("line {line}: premature end of input"))]
    PrematureEndOfInput { line: usize },
    #[snafu(display("line {line}: could not read the ballots"))]
    ReadInput { source: std::io::Error, line: usize },
}

fn describe_input(character: u8) -> String {
    if character.is_ascii_graphic() || character == b' ' {
        format!("unexpected character in input: {}", character as char)
    } else {
        "unexpected non-printable input".to_string()
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    #[snafu(display("no candidates"))]
    NoCandidates,
    #[snafu(display("{source}"))]
    InvalidBallots { source: ParseError },
    #[snafu(display(
        "ballot validated for {found} candidates, but the election has {expected} candidates"
    ))]
    CandidateCountMismatch { expected: usize, found: usize },
}

// ********* Configuration **********

/// How far the resolution goes.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RankingMode {
    /// Only the winners of the first round.
    WinnersOnly,
    /// Rounds are repeated on the remaining candidates until every candidate has a place.
    FullRanking,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub ranking_mode: RankingMode,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        ranking_mode: RankingMode::WinnersOnly,
    };

    pub const FULL_RANKING: VoteRules = VoteRules {
        ranking_mode: RankingMode::FullRanking,
    };
}
