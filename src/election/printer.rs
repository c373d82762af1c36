use std::fmt::Write;

use schulze_voting::CandidateId;

/// Formats a square matrix of counts between candidates.
///
/// The columns and the rows are labelled with the numbers of `candidates`, as they
/// are written on the ballots.
///
/// ```text
///          1     2
///   1:     0     3
///   2:     1     0
///
/// ```
pub fn format_graph_matrix(candidates: &[CandidateId], rows: &[Vec<u64>]) -> String {
    let mut s = String::new();
    s.push_str("     ");
    for cid in candidates.iter() {
        // Writing to a String cannot fail.
        let _ = write!(s, "{:5} ", cid.number());
    }
    s.push('\n');
    for (cid, row) in candidates.iter().zip(rows.iter()) {
        let _ = write!(s, "{:3}: ", cid.number());
        for count in row.iter() {
            let _ = write!(s, "{:5} ", count);
        }
        s.push('\n');
    }
    s.push('\n');
    s
}
