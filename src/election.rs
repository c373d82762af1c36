pub mod config_reader;
pub mod io_common;
pub mod printer;

use log::{debug, info, warn};

use schulze_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;
use crate::election::io_common::*;
use crate::election::printer::format_graph_matrix;

#[derive(Debug, Snafu)]
pub enum ElectionError {
    #[snafu(display("could not open file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not parse the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("could not open candidate file, {path}!"))]
    OpeningCandidates {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not open votes file, {path}!"))]
    OpeningVotes {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{path}: {source}"))]
    ReadingVotes { source: VotingErrors, path: String },
    #[snafu(display("{source}"))]
    Tabulation { source: VotingErrors },
    #[snafu(display("could not serialize the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("could not write the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("no parent directory for {path}"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ElectionResult<T> = Result<T, ElectionError>;

#[derive(Eq, PartialEq, Debug, Clone)]
enum CandidateSource {
    Names(Vec<String>),
    File(PathBuf),
}

/// Everything needed to run an election, once the configuration file and the command
/// line have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
struct ElectionSetup {
    output: OutputConfig,
    candidates: Option<CandidateSource>,
    vote_files: Vec<PathBuf>,
    rules: VoteRules,
    print_matrices: bool,
    out: Option<String>,
}

fn setup_from_config(config_path: &Path) -> ElectionResult<ElectionSetup> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let root = config_path.parent().context(MissingParentDirSnafu {
        path: config_path.display().to_string(),
    })?;

    let candidates = match (&config.candidates, &config.candidates_file) {
        (Some(_), Some(_)) => {
            whatever!("only one of candidates and candidatesFile can be specified")
        }
        (Some(cs), None) => Some(CandidateSource::Names(
            cs.iter().map(|c| c.name.clone()).collect(),
        )),
        (None, Some(p)) => Some(CandidateSource::File(resolve_path(root, p))),
        (None, None) => None,
    };

    let mut vote_files: Vec<PathBuf> = Vec::new();
    for cfs in config.cvr_file_sources.iter() {
        cfs.check_provider()?;
        vote_files.push(resolve_path(root, &cfs.file_path));
    }

    let rules = if config.rules.full_ranking.unwrap_or(false) {
        VoteRules::FULL_RANKING
    } else {
        VoteRules::DEFAULT_RULES
    };

    let out = config
        .output_settings
        .output_file
        .as_ref()
        .map(|p| match p.as_str() {
            "stdout" => p.clone(),
            _ => resolve_path(root, p).display().to_string(),
        });

    Ok(ElectionSetup {
        output: config.output_config(),
        candidates,
        vote_files,
        rules,
        print_matrices: config.rules.print_matrices.unwrap_or(false),
        out,
    })
}

fn build_setup(args: &Args) -> ElectionResult<ElectionSetup> {
    let mut setup = match &args.config {
        Some(config_path) => setup_from_config(Path::new(config_path))?,
        None => ElectionSetup {
            output: OutputConfig {
                contest: args
                    .input
                    .first()
                    .map(|p| simplify_file_name(Path::new(p)))
                    .unwrap_or_default(),
                date: None,
                jurisdiction: None,
                office: None,
            },
            candidates: None,
            vote_files: Vec::new(),
            rules: VoteRules::DEFAULT_RULES,
            print_matrices: false,
            out: None,
        },
    };

    // The command line takes precedence over the configuration file.
    if let Some(p) = &args.candidates {
        setup.candidates = Some(CandidateSource::File(PathBuf::from(p)));
    }
    if !args.input.is_empty() {
        setup.vote_files = args.input.iter().map(PathBuf::from).collect();
    }
    if args.full_ranking {
        setup.rules = VoteRules::FULL_RANKING;
    }
    if args.print_matrices {
        setup.print_matrices = true;
    }
    if args.out.is_some() {
        setup.out = args.out.clone();
    }

    ensure_whatever!(
        setup.candidates.is_some(),
        "no candidates given: use --config or --candidates"
    );
    ensure_whatever!(
        !setup.vote_files.is_empty(),
        "no votes file given: use --config or --input"
    );
    debug!("setup: {:?}", setup);
    Ok(setup)
}

fn candidate_names(source: &CandidateSource) -> ElectionResult<Vec<String>> {
    match source {
        CandidateSource::Names(names) => Ok(names.clone()),
        CandidateSource::File(path) => read_lines(path).context(OpeningCandidatesSnafu {
            path: path.display().to_string(),
        }),
    }
}

fn print_matrices(result: &SchulzeResult) {
    let all: Vec<CandidateId> = (0..result.candidate_count).map(CandidateId).collect();
    println!("tallied votes:");
    print!("{}", format_graph_matrix(&all, &result.pairwise.rows()));
    for round in result.rounds.iter() {
        println!("strongest paths:");
        print!(
            "{}",
            format_graph_matrix(&round.candidates, &round.strongest_paths)
        );
    }
}

fn print_outcome(names: &[String], result: &SchulzeResult, rules: &VoteRules) {
    for cid in result.winners.iter() {
        println!("winner: {}", names[cid.0]);
    }
    if rules.ranking_mode == RankingMode::FullRanking {
        for place in result.ranking() {
            for cid in place.candidates.iter() {
                println!("{}. {}", place.place, names[cid.0]);
            }
        }
    }
}

fn candidates_to_json(names: &[String], cids: &[CandidateId]) -> Vec<JSValue> {
    cids.iter().map(|cid| json!(names[cid.0])).collect()
}

fn build_summary_js(output: &OutputConfig, names: &[String], result: &SchulzeResult) -> JSValue {
    let ranking: Vec<JSValue> = result
        .ranking()
        .iter()
        .map(|rp| {
            json!({
                "place": rp.place,
                "candidates": candidates_to_json(names, &rp.candidates)
            })
        })
        .collect();
    json!({
        "config": output,
        "results": {
            "ballots": result.ballot_count,
            "candidates": names,
            "pairwise": result.pairwise.rows(),
            "ranking": ranking,
            "winners": candidates_to_json(names, &result.winners)
        }
    })
}

fn write_summary(out: Option<&str>, pretty_js_stats: &str) -> ElectionResult<()> {
    match out {
        None => debug!("no output location for the summary"),
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("writing the summary to {}", path);
            fs::write(path, pretty_js_stats).context(WritingSummarySnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(summary_path: &Path, pretty_js_stats: &str) -> ElectionResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingSummarySnafu)?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

/// Runs an election as described by the command line arguments.
pub fn run_election(args: &Args) -> ElectionResult<()> {
    let setup = build_setup(args)?;

    let names = match &setup.candidates {
        Some(source) => candidate_names(source)?,
        None => {
            whatever!("no candidates given")
        }
    };
    info!("candidates: {:?}", names);

    let mut builder = Builder::new(names.len()).context(TabulationSnafu)?;
    for path in setup.vote_files.iter() {
        let p = path.display().to_string();
        let file = File::open(path).context(OpeningVotesSnafu { path: p.clone() })?;
        let count = builder
            .read_ballots(file)
            .context(ReadingVotesSnafu { path: p })?;
        info!("read {} ballots from {}", count, simplify_file_name(path));
    }

    let result = builder.finish(&setup.rules);

    if setup.print_matrices {
        print_matrices(&result);
    }
    print_outcome(&names, &result, &setup.rules);

    let result_js = build_summary_js(&setup.output, &names, &result);
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingSummarySnafu)?;
    write_summary(setup.out.as_deref(), &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        check_reference(Path::new(summary_p), &pretty_js_stats)?;
    }

    Ok(())
}
