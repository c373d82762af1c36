use clap::Parser;

/// This is a tabulation program for ranked ballots, using the Schulze method.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON format.
    /// For more information about the file format, read the documentation of the `manual` module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, schulze will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, can be repeated) The files containing the ballots, one ballot per line. The ballots of all the files
    /// are counted together. Setting this option overrides the files specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path) The file with the names of the candidates, one per line. The first line is candidate 1.
    /// Setting this option overrides the candidates specified with the --config option.
    #[clap(long, value_parser)]
    pub candidates: Option<String>,

    /// If passed as an argument, all the candidates will be ranked instead of only finding the winners.
    #[clap(long, takes_value = false)]
    pub full_ranking: bool,

    /// If passed as an argument, prints the tallied votes and the strongest paths.
    #[clap(long, takes_value = false)]
    pub print_matrices: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
