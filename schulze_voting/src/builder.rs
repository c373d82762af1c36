use std::io::Read;

use log::{debug, info};
use snafu::prelude::*;

pub use crate::config::*;
use crate::parser::BallotParser;
use crate::tally::PairwiseMatrix;

/// A builder for adding ballots from several sources.
///
/// Ballots can come from streams in the text format, from single lines, from groups of
/// candidates, or be built directly with [Ballot::from_groups]. They all go to the same
/// pairwise matrix.
///
/// ```
/// pub use schulze_voting::builder::Builder;
/// pub use schulze_voting::{Ballot, CandidateId, VoteRules};
/// # use schulze_voting::VotingErrors;
///
/// let mut builder = Builder::new(3)?;
/// builder.read_ballots("1 > 2\n3 > 2 = 1\n".as_bytes())?;
/// builder.add_line("2 > 1")?;
/// builder.add_ballot(&Ballot::from_groups(&[vec![CandidateId(0)]], 3).unwrap())?;
///
/// let result = builder.finish(&VoteRules::DEFAULT_RULES);
/// assert_eq!(result.ballot_count, 4);
/// assert_eq!(result.winners, vec![CandidateId(0)]);
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) candidate_count: usize,
    pub(crate) pairwise: PairwiseMatrix,
    pub(crate) ballot_count: u64,
}

impl Builder {
    pub fn new(candidate_count: usize) -> Result<Builder, VotingErrors> {
        ensure!(candidate_count > 0, NoCandidatesSnafu);
        Ok(Builder {
            candidate_count,
            pairwise: PairwiseMatrix::new(candidate_count),
            ballot_count: 0,
        })
    }

    /// Reads all the ballots of a stream and returns how many were read.
    ///
    /// The ballots of the stream only count if the whole stream is valid: after an
    /// error, the builder is left as it was before the call.
    pub fn read_ballots<R: Read>(&mut self, input: R) -> Result<u64, VotingErrors> {
        self.read_stream(BallotParser::new(input, self.candidate_count))
    }

    fn read_stream<R: Read>(&mut self, parser: BallotParser<R>) -> Result<u64, VotingErrors> {
        let mut stream_pairwise = PairwiseMatrix::new(self.candidate_count);
        let mut count: u64 = 0;
        for ballot in parser {
            let ballot = ballot.context(InvalidBallotsSnafu)?;
            stream_pairwise.add_ballot(&ballot);
            count += 1;
        }
        self.pairwise.merge(&stream_pairwise);
        self.ballot_count += count;
        info!(
            "read_ballots: read {} ballots ({} in total)",
            count, self.ballot_count
        );
        Ok(count)
    }

    /// Adds the ballots written on a single line. A blank line adds nothing.
    ///
    /// Errors are reported at the position of the ballot in the builder.
    pub fn add_line(&mut self, line: &str) -> Result<(), VotingErrors> {
        let parser = BallotParser::starting_at_line(
            line.as_bytes(),
            self.candidate_count,
            self.next_position(),
        );
        self.read_stream(parser).map(|_| ())
    }

    /// Adds a ballot made of groups of candidates, as in [Ballot::from_groups].
    ///
    /// Errors are reported at the position of the ballot in the builder.
    pub fn add_groups(&mut self, groups: &[Vec<CandidateId>]) -> Result<(), VotingErrors> {
        let ballot =
            Ballot::from_groups_at_line(groups, self.candidate_count, self.next_position())
                .context(InvalidBallotsSnafu)?;
        self.add_ballot(&ballot)
    }

    fn next_position(&self) -> usize {
        usize::try_from(self.ballot_count)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }

    pub fn add_ballot(&mut self, ballot: &Ballot) -> Result<(), VotingErrors> {
        ensure!(
            ballot.candidate_count() == self.candidate_count,
            CandidateCountMismatchSnafu {
                expected: self.candidate_count,
                found: ballot.candidate_count(),
            }
        );
        debug!("add_ballot: {:?}", ballot.groups());
        self.pairwise.add_ballot(ballot);
        self.ballot_count += 1;
        Ok(())
    }

    pub fn pairwise(&self) -> &PairwiseMatrix {
        &self.pairwise
    }

    /// Runs the election on all the ballots added so far.
    pub fn finish(self, rules: &VoteRules) -> SchulzeResult {
        crate::tabulate(self.pairwise, self.ballot_count, rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_election() {
        assert!(matches!(Builder::new(0), Err(VotingErrors::NoCandidates)));
    }

    #[test]
    fn invalid_stream_leaves_builder_untouched() {
        let mut builder = Builder::new(3).unwrap();
        builder.read_ballots("1>2>3\n".as_bytes()).unwrap();
        let before = builder.pairwise().clone();

        let err = builder.read_ballots("2>1\n1>1\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            VotingErrors::InvalidBallots {
                source: ParseError::DuplicateCandidateInBallot {
                    candidate: 1,
                    line: 2
                }
            }
        ));
        assert_eq!(builder.pairwise(), &before);
        assert_eq!(builder.ballot_count, 1);
    }

    #[test]
    fn streams_accumulate() {
        let mut builder = Builder::new(2).unwrap();
        assert_eq!(builder.read_ballots("1>2\n1\n".as_bytes()).unwrap(), 2);
        assert_eq!(builder.read_ballots("\n2\n".as_bytes()).unwrap(), 1);
        builder.add_line("").unwrap();
        assert_eq!(
            builder.pairwise().rows(),
            vec![vec![0, 2], vec![1, 0]]
        );
        let result = builder.finish(&VoteRules::DEFAULT_RULES);
        assert_eq!(result.ballot_count, 3);
        assert_eq!(result.winners, vec![CandidateId(0)]);
    }

    #[test]
    fn errors_report_the_position_in_the_builder() {
        let mut builder = Builder::new(3).unwrap();
        builder.add_line("1>2").unwrap();
        builder.add_line("").unwrap();
        builder.add_line("2>3").unwrap();
        let err = builder.add_line("1>1").unwrap_err();
        assert!(matches!(
            err,
            VotingErrors::InvalidBallots {
                source: ParseError::DuplicateCandidateInBallot {
                    candidate: 1,
                    line: 3
                }
            }
        ));
        assert_eq!(err.to_string(), "line 3: candidate 1 is ranked twice!");

        builder
            .add_groups(&[vec![CandidateId(2)], vec![CandidateId(0)]])
            .unwrap();
        let err = builder
            .add_groups(&[vec![CandidateId(0), CandidateId(0)]])
            .unwrap_err();
        assert_eq!(err.to_string(), "line 4: candidate 1 is ranked twice!");
        let err = builder.add_groups(&[vec![CandidateId(3)]]).unwrap_err();
        assert_eq!(err.to_string(), "line 4: candidate 4 is invalid! (1, 3)");
        assert_eq!(builder.ballot_count, 3);
    }

    #[test]
    fn rejects_ballot_of_another_size() {
        let mut builder = Builder::new(2).unwrap();
        let ballot = Ballot::from_groups(&[vec![CandidateId(2)]], 3).unwrap();
        assert!(matches!(
            builder.add_ballot(&ballot),
            Err(VotingErrors::CandidateCountMismatch {
                expected: 2,
                found: 3
            })
        ));
    }
}
