/*!

This is the long-form manual for `schulze_voting` and the `schulze` program.

## The Schulze method

Every ballot ranks the candidates, possibly with ties. The ballots are first added
into a pairwise matrix: the entry for `(A, B)` counts the voters who prefer `A` to `B`.

A candidate `A` has a direct link to `B` if more voters prefer `A` to `B` than the
opposite, and the strength of this link is the number of voters who prefer `A`.
When both counts are equal, there is no link. The strength of a path between two
candidates is the strength of its weakest link, and only the strongest path between each
pair of candidates matters.

A candidate wins if, for every other candidate, its strongest path to this candidate is
at least as strong as the strongest path in the other direction. There is always at least
one winner, and there may be several.

With the full ranking, the winners get the first place and the computation is done again
with the remaining candidates for the second place, and so on until every candidate has a
place. The place increases by one after each round, even when several candidates shared
the previous place.

## Ballots

The ballots are stored in a text file, one ballot per line. The candidates are numbered
from 1, in the order of the candidates file:

```text
1 > 3 > 2
2 = 3 > 1
4

3>1
```

- `>` separates candidates in order of preference (the left one is preferred),
- `=` puts candidates at the same rank,
- spaces and tabs may appear around the numbers and the operators,
- lines may end with LF, CR LF or CR, and blank lines are ignored.

The candidates that are not mentioned in a ballot are ranked after all the others, and
tied between them: with 4 candidates, `2 > 1` is the same ballot as `2 > 1 > 3 = 4`.

A ballot may not mention the same candidate twice, and every number must be between 1
and the number of candidates. Any invalid ballot stops the tabulation: nothing is counted.

## Candidates

The names of the candidates are read from a text file, one name per line. Empty lines
are skipped. The first name is candidate 1.

## Command line

```text
schulze --candidates candidates.txt --input votes.txt
schulze --candidates candidates.txt --input votes_1.txt --input votes_2.txt --full-ranking
schulze --config election_config.json --out stdout
```

The winners are printed as `winner: <name>`. With `--full-ranking`, every candidate is
then printed with its place, as `<place>. <name>`. With `--print-matrices`, the tallied
votes and the strongest paths of every round are printed before.

`--out` writes a summary of the election in JSON to a file (or to the standard output
with `stdout`), and `--reference` compares this summary with a summary computed before.
The program fails if they differ.

`--verbose` shows the debugging messages. The `RUST_LOG` environment variable can also be
used to control the logging.

## Configuration

An election can be described in a JSON file, in a way inspired by the RCVTab program:

```json
{
  "outputSettings": {
    "contestName": "Board election",
    "outputFile": "summary.json",
    "contestDate": "2022-11-08",
    "contestJurisdiction": "Springfield",
    "contestOffice": "Board"
  },
  "cvrFileSources": [
    { "provider": "schulze", "filePath": "votes.txt" }
  ],
  "candidates": [ { "name": "Alice" }, { "name": "Bob" } ],
  "rules": { "fullRanking": true, "printMatrices": false }
}
```

- `outputSettings`: only `contestName` is required.
- `cvrFileSources`: the ballot files. The provider must be `schulze` (or `text`).
- `candidates` or `candidatesFile`: either the list of the candidates, or a file with
  their names. Exactly one of them must be provided.
- `rules`: optional, both options are off by default.

Relative paths are relative to the directory of the configuration file. The options of
the command line take precedence over the configuration file.

 */
