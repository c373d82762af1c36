/*!
Tabulation of ranked ballots with the Schulze method.

Ballots may contain ties and may leave candidates out. They are read from a simple
text format (see [BallotParser]), added to a pairwise preference matrix, and the
winners are found by comparing the strongest paths between the candidates.

```
use schulze_voting::*;

let ballots = "1 > 2 > 3\n2 > 3 > 1\n1 = 3 > 2\n";
let result = run_schulze(ballots.as_bytes(), 3, &VoteRules::FULL_RANKING)?;
assert_eq!(result.winners, vec![CandidateId(0)]);
assert_eq!(result.ranking().len(), 3);
# Ok::<(), VotingErrors>(())
```
*/

pub mod builder;
mod config;
pub mod manual;
mod parser;
mod schulze;
mod tally;

use log::{debug, info};
use std::io::Read;

pub use crate::builder::Builder;
pub use crate::config::*;
pub use crate::parser::BallotParser;
pub use crate::schulze::{resolve_round, PathStrengths};
pub use crate::tally::PairwiseMatrix;

// **** Private structures ****

type RoundId = u32;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum CandidateStatus {
    Unranked,
    Winner,
    /// The candidate got a place and is not considered anymore.
    Finalized,
}

/// Reads all the ballots and runs the election.
///
/// Arguments:
/// * `input` the ballots, in the text format described in [BallotParser]
/// * `candidate_count` the number of candidates (at least 1)
/// * `rules` how far the ranking should go
///
/// Any invalid ballot fails the whole election.
pub fn run_schulze<R: Read>(
    input: R,
    candidate_count: usize,
    rules: &VoteRules,
) -> Result<SchulzeResult, VotingErrors> {
    let mut builder = Builder::new(candidate_count)?;
    builder.read_ballots(input)?;
    Ok(builder.finish(rules))
}

/// Runs the rounds of the Schulze method over a complete pairwise matrix.
///
/// Each round finds the winners among the candidates that do not have a place yet.
/// With [RankingMode::WinnersOnly], only the first round is run.
pub fn rank_candidates(pairwise: &PairwiseMatrix, rules: &VoteRules) -> Vec<RoundStats> {
    let mut statuses = vec![CandidateStatus::Unranked; pairwise.candidate_count()];
    let mut rounds: Vec<RoundStats> = Vec::new();

    loop {
        let round_id = (rounds.len() + 1) as RoundId;
        let unranked: Vec<CandidateId> = statuses
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| match s {
                CandidateStatus::Unranked => Some(CandidateId(idx)),
                _ => None,
            })
            .collect();

        let paths = match resolve_round(pairwise, &unranked) {
            Some(p) => p,
            None => {
                debug!("rank_candidates: no candidates left to rank");
                break;
            }
        };
        let winners = paths.winners();
        // Invariant: the strongest path relation always has a maximal element.
        assert!(
            !winners.is_empty(),
            "No winner among the candidates {:?}",
            unranked
        );
        info!(
            "Round {}: {} candidates, winners: {:?}",
            round_id,
            unranked.len(),
            winners.iter().map(|cid| cid.number()).collect::<Vec<usize>>()
        );
        for cid in winners.iter() {
            statuses[cid.0] = CandidateStatus::Winner;
        }
        rounds.push(RoundStats {
            round: round_id,
            candidates: unranked,
            strongest_paths: paths.rows(),
            winners,
        });

        for s in statuses.iter_mut() {
            if *s == CandidateStatus::Winner {
                *s = CandidateStatus::Finalized;
            }
        }
        if rules.ranking_mode == RankingMode::WinnersOnly {
            break;
        }
    }
    rounds
}

pub(crate) fn tabulate(
    pairwise: PairwiseMatrix,
    ballot_count: u64,
    rules: &VoteRules,
) -> SchulzeResult {
    info!(
        "Processing {} ballots, {} candidates, rules: {:?}",
        ballot_count,
        pairwise.candidate_count(),
        rules
    );
    let rounds = rank_candidates(&pairwise, rules);
    let winners = rounds
        .first()
        .map(|rs| rs.winners.clone())
        .unwrap_or_default();
    SchulzeResult {
        candidate_count: pairwise.candidate_count(),
        ballot_count,
        pairwise,
        rounds,
        winners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn cids(idxs: &[usize]) -> Vec<CandidateId> {
        idxs.iter().map(|idx| CandidateId(*idx)).collect()
    }

    fn places(result: &SchulzeResult) -> Vec<(u32, Vec<usize>)> {
        result
            .ranking()
            .iter()
            .map(|rp| (rp.place, rp.candidates.iter().map(|cid| cid.0).collect()))
            .collect()
    }

    const WIKIPEDIA: &str = "\
1>3>2>5>4\n1>3>2>5>4\n1>3>2>5>4\n1>3>2>5>4\n1>3>2>5>4
1>4>5>3>2\n1>4>5>3>2\n1>4>5>3>2\n1>4>5>3>2\n1>4>5>3>2
2>5>4>1>3\n2>5>4>1>3\n2>5>4>1>3\n2>5>4>1>3\n2>5>4>1>3\n2>5>4>1>3\n2>5>4>1>3\n2>5>4>1>3
3>1>2>5>4\n3>1>2>5>4\n3>1>2>5>4
3>1>5>2>4\n3>1>5>2>4\n3>1>5>2>4\n3>1>5>2>4\n3>1>5>2>4\n3>1>5>2>4\n3>1>5>2>4
3>2>1>4>5\n3>2>1>4>5
4>3>5>2>1\n4>3>5>2>1\n4>3>5>2>1\n4>3>5>2>1\n4>3>5>2>1\n4>3>5>2>1\n4>3>5>2>1
5>2>1>4>3\n5>2>1>4>3\n5>2>1>4>3\n5>2>1>4>3\n5>2>1>4>3\n5>2>1>4>3\n5>2>1>4>3\n5>2>1>4>3
";

    #[test]
    fn wikipedia_winner() {
        init();
        let result = run_schulze(WIKIPEDIA.as_bytes(), 5, &VoteRules::DEFAULT_RULES).unwrap();
        assert_eq!(result.ballot_count, 45);
        assert_eq!(result.winners, cids(&[4]));
        assert_eq!(result.rounds.len(), 1);
        assert_eq!(places(&result), vec![(1, vec![4])]);
    }

    #[test]
    fn wikipedia_full_ranking() {
        init();
        let result = run_schulze(WIKIPEDIA.as_bytes(), 5, &VoteRules::FULL_RANKING).unwrap();
        assert_eq!(
            places(&result),
            vec![
                (1, vec![4]),
                (2, vec![0]),
                (3, vec![2]),
                (4, vec![1]),
                (5, vec![3])
            ]
        );
        assert_eq!(result.rounds[1].candidates, cids(&[0, 1, 2, 3]));
        assert_eq!(result.rounds[4].strongest_paths, vec![vec![0]]);
    }

    #[test]
    fn tied_candidates_share_a_place() {
        init();
        let result = run_schulze("1=2>3\n".as_bytes(), 3, &VoteRules::FULL_RANKING).unwrap();
        assert_eq!(places(&result), vec![(1, vec![0, 1]), (2, vec![2])]);
        assert_eq!(result.winners, cids(&[0, 1]));
    }

    #[test]
    fn tie_handling_in_matrix() {
        let result = run_schulze("1=2>3".as_bytes(), 3, &VoteRules::DEFAULT_RULES).unwrap();
        let m = &result.pairwise;
        assert_eq!(m.get(CandidateId(0), CandidateId(1)), 0);
        assert_eq!(m.get(CandidateId(1), CandidateId(0)), 0);
        assert_eq!(m.get(CandidateId(0), CandidateId(2)), 1);
        assert_eq!(m.get(CandidateId(1), CandidateId(2)), 1);
    }

    #[test]
    fn empty_input_ties_everyone() {
        init();
        let result = run_schulze("".as_bytes(), 4, &VoteRules::FULL_RANKING).unwrap();
        assert_eq!(result.ballot_count, 0);
        assert_eq!(result.pairwise, PairwiseMatrix::new(4));
        assert_eq!(result.winners, cids(&[0, 1, 2, 3]));
        assert_eq!(places(&result), vec![(1, vec![0, 1, 2, 3])]);
    }

    #[test]
    fn single_candidate() {
        let result = run_schulze("1\n1\n".as_bytes(), 1, &VoteRules::DEFAULT_RULES).unwrap();
        assert_eq!(result.ballot_count, 2);
        assert_eq!(result.winners, cids(&[0]));
    }

    #[test]
    fn no_candidates() {
        assert!(matches!(
            run_schulze("".as_bytes(), 0, &VoteRules::DEFAULT_RULES),
            Err(VotingErrors::NoCandidates)
        ));
    }

    #[test]
    fn invalid_ballot_fails_the_election() {
        let err = run_schulze("1>2\n2>2\n".as_bytes(), 2, &VoteRules::DEFAULT_RULES).unwrap_err();
        assert!(matches!(
            err,
            VotingErrors::InvalidBallots {
                source: ParseError::DuplicateCandidateInBallot {
                    candidate: 2,
                    line: 2
                }
            }
        ));
        assert_eq!(err.to_string(), "line 2: candidate 2 is ranked twice!");

        let err = run_schulze("5".as_bytes(), 3, &VoteRules::DEFAULT_RULES).unwrap_err();
        assert!(matches!(
            err,
            VotingErrors::InvalidBallots {
                source: ParseError::OutOfRangeCandidate { .. }
            }
        ));
        assert_eq!(err.to_string(), "line 1: candidate 5 is invalid! (1, 3)");
    }

    fn ballot_line(n: usize) -> impl Strategy<Value = String> {
        (
            Just((1..=n).collect::<Vec<usize>>()).prop_shuffle(),
            prop::collection::vec(any::<bool>(), n),
            0..=n,
        )
            .prop_map(|(order, ties, len)| {
                let mut line = String::new();
                for (idx, number) in order.iter().take(len).enumerate() {
                    if idx > 0 {
                        line.push_str(if ties[idx] { " = " } else { " > " });
                    }
                    line.push_str(&number.to_string());
                }
                line
            })
    }

    fn election(n: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(ballot_line(n), 0..40)
    }

    proptest! {
        #[test]
        fn tally_does_not_depend_on_ballot_order(
            (lines, shuffled) in election(5).prop_flat_map(|lines| {
                let shuffled = Just(lines.clone()).prop_shuffle();
                (Just(lines), shuffled)
            })
        ) {
            let r1 = run_schulze(lines.join("\n").as_bytes(), 5, &VoteRules::DEFAULT_RULES).unwrap();
            let r2 = run_schulze(shuffled.join("\n").as_bytes(), 5, &VoteRules::DEFAULT_RULES).unwrap();
            prop_assert_eq!(r1.pairwise, r2.pairwise);
            prop_assert_eq!(r1.winners, r2.winners);
        }

        #[test]
        fn diagonal_is_always_zero(lines in election(4)) {
            let result = run_schulze(lines.join("\r\n").as_bytes(), 4, &VoteRules::DEFAULT_RULES).unwrap();
            for idx in 0..4 {
                prop_assert_eq!(result.pairwise.get(CandidateId(idx), CandidateId(idx)), 0);
            }
        }

        #[test]
        fn full_ranking_places_every_candidate_once(lines in election(5)) {
            let result = run_schulze(lines.join("\n").as_bytes(), 5, &VoteRules::FULL_RANKING).unwrap();
            let mut ranked: Vec<usize> = result
                .ranking()
                .iter()
                .flat_map(|rp| rp.candidates.iter().map(|cid| cid.0))
                .collect();
            ranked.sort_unstable();
            prop_assert_eq!(ranked, vec![0, 1, 2, 3, 4]);
            for (idx, rp) in result.ranking().iter().enumerate() {
                prop_assert_eq!(rp.place as usize, idx + 1);
                prop_assert!(!rp.candidates.is_empty());
            }
        }

        #[test]
        fn condorcet_winner_is_the_only_winner(lines in election(4)) {
            let result = run_schulze(lines.join("\n").as_bytes(), 4, &VoteRules::DEFAULT_RULES).unwrap();
            let m = &result.pairwise;
            let condorcet = (0..4).find(|i| {
                (0..4).all(|j| *i == j || m.get(CandidateId(*i), CandidateId(j)) > m.get(CandidateId(j), CandidateId(*i)))
            });
            if let Some(cw) = condorcet {
                prop_assert_eq!(result.winners, vec![CandidateId(cw)]);
            }
        }
    }
}
