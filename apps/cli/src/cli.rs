use clap::{Args, Parser, Subcommand};

use contentimport_core::batch::StepRequest;

#[derive(Parser, Debug)]
#[command(name = "contentimport")]
#[command(about = "Imports external records into the content tree")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every part of a preset in batches
    Batch {
        /// Preset name
        preset: String,

        /// Only import these parts (comma separated)
        #[arg(long, value_delimiter = ',')]
        parts: Vec<String>,

        /// Override the batch size of every part
        #[arg(long)]
        batch_size: Option<usize>,

        /// External identifier of this import run
        #[arg(long)]
        external_import_id: Option<String>,

        /// Start even if the external identifier was used before
        #[arg(long)]
        force: bool,

        /// Run the steps inside this process instead of sub processes
        #[arg(long)]
        in_process: bool,
    },

    /// Import one batch of a part and print the number of processed records
    #[command(hide = true)]
    ExecuteBatch(ExecuteBatchArgs),

    /// Remove the checkpoints of a preset and flush its vault
    Init {
        /// Preset name
        preset: String,

        /// Only reset these parts (comma separated)
        #[arg(long, value_delimiter = ',')]
        parts: Vec<String>,
    },

    /// Show the parts of a preset and recent import runs
    Show {
        /// Preset name
        preset: String,
    },

    /// Delete all audit events
    FlushEventLog,

    /// Create the site node below which records are imported
    CreateSite {
        /// Absolute node path, e.g. /sites/demo
        path: String,

        #[arg(long, default_value = "Page")]
        node_type: String,
    },
}

/// Empty selections mean "all parts".
pub fn selected_parts(parts: Vec<String>) -> Option<Vec<String>> {
    let parts: Vec<String> = parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Arguments of one step, see [`StepRequest::to_args`].
#[derive(Args, Debug)]
pub struct ExecuteBatchArgs {
    #[arg(long)]
    preset: String,

    #[arg(long)]
    part: String,

    #[arg(long)]
    data_provider: String,

    #[arg(long)]
    importer: String,

    #[arg(long)]
    import_id: String,

    #[arg(long, default_value_t = 1)]
    current_batch: usize,

    #[arg(long)]
    offset: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long, default_value = "")]
    log_prefix: String,
}

impl From<ExecuteBatchArgs> for StepRequest {
    fn from(args: ExecuteBatchArgs) -> Self {
        StepRequest {
            preset: args.preset,
            part: args.part,
            data_provider: args.data_provider,
            importer: args.importer,
            import_id: args.import_id,
            offset: args.offset,
            batch_size: args.batch_size,
            current_batch: args.current_batch,
            log_prefix: args.log_prefix,
        }
    }
}
