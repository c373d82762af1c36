use std::ops::AddAssign;

use crate::config::{Ballot, CandidateId};

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
pub(crate) struct VoteCount(pub(crate) u64);

impl VoteCount {
    pub(crate) const EMPTY: VoteCount = VoteCount(0);
    pub(crate) const ONE: VoteCount = VoteCount(1);
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

/// The number of ballots ranking each candidate strictly above each other candidate.
///
/// `get(a, b)` is the number of ballots that prefer `a` to `b`. The diagonal is always zero.
/// The counts only ever grow: the matrix accumulates over all the ballots of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseMatrix {
    candidate_count: usize,
    // Row-major: votes[a * candidate_count + b]
    votes: Vec<VoteCount>,
}

impl PairwiseMatrix {
    pub fn new(candidate_count: usize) -> PairwiseMatrix {
        PairwiseMatrix {
            candidate_count,
            votes: vec![VoteCount::EMPTY; candidate_count * candidate_count],
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    pub fn get(&self, preferred: CandidateId, other: CandidateId) -> u64 {
        self.count(preferred, other).0
    }

    pub(crate) fn count(&self, preferred: CandidateId, other: CandidateId) -> VoteCount {
        self.votes[preferred.0 * self.candidate_count + other.0]
    }

    /// Adds the preferences of one ballot.
    ///
    /// Every candidate of a group gets one vote over every candidate of the groups
    /// that come after it. Tied candidates get nothing over each other.
    ///
    /// Panics if the ballot was validated for a different number of candidates.
    pub(crate) fn add_ballot(&mut self, ballot: &Ballot) {
        assert_eq!(
            ballot.candidate_count(),
            self.candidate_count,
            "ballot does not match the size of the matrix"
        );
        let groups = ballot.groups();
        for (idx, preferred_group) in groups.iter().enumerate() {
            for later_group in groups[idx + 1..].iter() {
                for preferred in preferred_group.iter() {
                    for other in later_group.iter() {
                        self.votes[preferred.0 * self.candidate_count + other.0] += VoteCount::ONE;
                    }
                }
            }
        }
    }

    /// Adds all the counts of another matrix of the same size.
    pub(crate) fn merge(&mut self, other: &PairwiseMatrix) {
        assert_eq!(self.candidate_count, other.candidate_count);
        for (count, other_count) in self.votes.iter_mut().zip(other.votes.iter()) {
            *count += *other_count;
        }
    }

    /// The counts, one row per preferred candidate.
    pub fn rows(&self) -> Vec<Vec<u64>> {
        if self.candidate_count == 0 {
            return Vec::new();
        }
        self.votes
            .chunks(self.candidate_count)
            .map(|row| row.iter().map(|vc| vc.0).collect())
            .collect()
    }
}
