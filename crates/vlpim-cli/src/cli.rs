use super::commands;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vlpim_common::{ImmunogenicityMode, PipelineConfig, ScoreAggregation};

#[derive(Parser, Debug)]
#[command(name = "vlpim", author, version, about = "VLP immunogenicity modulation", long_about = None)]
pub struct Cli {
    /// DEBUG, INFO, WARNING or ERROR; overrides RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// TOML, YAML or JSON configuration file (default: $VLPIM_CONFIG, then ./vlpim.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Selection parameters shared by `run` and `epitopes`.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    #[arg(long)]
    pub mode: Option<ImmunogenicityMode>,

    #[arg(long)]
    pub epitopes_number: Option<usize>,

    #[arg(long)]
    pub epitope_length: Option<usize>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl SelectionArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(n) = self.epitopes_number {
            config.epitopes_number = n;
        }
        if let Some(len) = self.epitope_length {
            config.epitope_length = len;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full pipeline over pre-computed tool output
    Run {
        #[arg(long)]
        fasta: PathBuf,

        #[arg(long)]
        pdb: PathBuf,

        /// User epitope list (sequence,start,end) replacing prediction
        #[arg(long)]
        epitopes: Option<PathBuf>,

        /// Binding predictions for the parent and every mutant
        #[arg(long)]
        binding_table: PathBuf,

        /// Pre-generated mutant sequences
        #[arg(long)]
        candidates: PathBuf,

        /// Per-candidate RMSD and interface metrics
        #[arg(long)]
        structure_metrics: Option<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long)]
        max_candidates: Option<usize>,
    },
    /// Epitope analysis of a binding-prediction table
    Epitopes {
        #[arg(long)]
        binding_table: PathBuf,

        #[arg(long)]
        fasta: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Immunogenicity scores for a wide IC50_*/Rank_* table
    Score {
        #[arg(long)]
        table: PathBuf,

        #[arg(long)]
        mode: Option<ImmunogenicityMode>,

        #[arg(long)]
        aggregation: Option<ScoreAggregation>,

        #[arg(long)]
        out: PathBuf,
    },
    /// Structural ranking of evaluated candidates
    Rank {
        #[arg(long)]
        table: PathBuf,

        #[arg(long)]
        out: PathBuf,
    },
    /// Print the resolved configuration
    Config,
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<()> {
        let mut config = commands::resolve_config(self.config.as_deref())?;
        match self.command {
            Commands::Run {
                fasta,
                pdb,
                epitopes,
                binding_table,
                candidates,
                structure_metrics,
                selection,
                max_candidates,
            } => {
                selection.apply(&mut config);
                if let Some(max) = max_candidates {
                    config.max_candidates = max;
                }
                commands::run::execute(
                    config,
                    commands::run::RunFiles {
                        fasta,
                        pdb,
                        epitopes,
                        binding_table,
                        candidates,
                        structure_metrics,
                    },
                )
                .await
            }
            Commands::Epitopes {
                binding_table,
                fasta,
                selection,
            } => {
                selection.apply(&mut config);
                commands::epitopes::execute(config, binding_table, fasta).await
            }
            Commands::Score {
                table,
                mode,
                aggregation,
                out,
            } => {
                if let Some(mode) = mode {
                    config.mode = mode;
                }
                if let Some(aggregation) = aggregation {
                    config.score_aggregation = aggregation;
                }
                commands::score::execute(config, table, out).await
            }
            Commands::Rank { table, out } => commands::rank::execute(config, table, out).await,
            Commands::Config => commands::config::execute(&config),
        }
    }
}
