//! Strongest paths between the candidates (Schulze method).
//!
//! For the candidates still to be ranked:
//! - a candidate keeps the strength of its direct victory over another candidate only if it
//!   strictly won the duel (exact ties count for nobody),
//! - the strength of a path is the strength of its weakest link, and the widest path between
//!   every pair is computed in the manner of Floyd–Warshall,
//! - a candidate wins the round if no other candidate has a strictly stronger path to it
//!   than it has to that candidate. Several candidates can win the same round.

use log::debug;

use crate::config::CandidateId;
use crate::tally::{PairwiseMatrix, VoteCount};

/// The widest paths between a subset of the candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PathStrengths {
    candidates: Vec<CandidateId>,
    // Indexed by the positions in `candidates`.
    strengths: Vec<Vec<VoteCount>>,
}

impl PathStrengths {
    pub fn candidates(&self) -> &[CandidateId] {
        &self.candidates
    }

    /// The strength of the strongest path between the candidates at positions `from` and `to`.
    pub fn strength(&self, from: usize, to: usize) -> u64 {
        self.strengths[from][to].0
    }

    /// For each candidate (in the order of [PathStrengths::candidates]), whether it wins.
    pub fn winner_flags(&self) -> Vec<bool> {
        let m = self.candidates.len();
        (0..m)
            .map(|i| (0..m).all(|j| i == j || self.strengths[j][i] <= self.strengths[i][j]))
            .collect()
    }

    pub fn winners(&self) -> Vec<CandidateId> {
        self.candidates
            .iter()
            .zip(self.winner_flags())
            .filter_map(|(cid, is_winner)| if is_winner { Some(*cid) } else { None })
            .collect()
    }

    pub fn rows(&self) -> Vec<Vec<u64>> {
        self.strengths
            .iter()
            .map(|row| row.iter().map(|vc| vc.0).collect())
            .collect()
    }
}

/// Computes the strongest paths between the given candidates.
///
/// `unranked` should be sorted and without duplicates. Returns `None` if there is no
/// candidate left to rank.
pub fn resolve_round(pairwise: &PairwiseMatrix, unranked: &[CandidateId]) -> Option<PathStrengths> {
    if unranked.is_empty() {
        return None;
    }
    let mut strengths = direct_victories(pairwise, unranked);
    widen_paths(&mut strengths);
    debug!(
        "resolve_round: strongest paths between {:?}: {:?}",
        unranked, strengths
    );
    Some(PathStrengths {
        candidates: unranked.to_vec(),
        strengths,
    })
}

fn direct_victories(pairwise: &PairwiseMatrix, candidates: &[CandidateId]) -> Vec<Vec<VoteCount>> {
    let m = candidates.len();
    let mut d = vec![vec![VoteCount::EMPTY; m]; m];
    for i in 0..m {
        for j in 0..i {
            let support = pairwise.count(candidates[i], candidates[j]);
            let opposition = pairwise.count(candidates[j], candidates[i]);
            if support > opposition {
                d[i][j] = support;
            } else if opposition > support {
                d[j][i] = opposition;
            }
        }
    }
    d
}

// The intermediary must be the outer loop: each step relies on the paths through the
// previous intermediaries being final.
fn widen_paths(d: &mut [Vec<VoteCount>]) {
    let m = d.len();
    for k in 0..m {
        for i in 0..m {
            if i == k {
                continue;
            }
            for j in 0..m {
                if j == i || j == k {
                    continue;
                }
                let through_k = d[i][k].min(d[k][j]);
                if through_k > d[i][j] {
                    d[i][j] = through_k;
                }
            }
        }
    }
}
