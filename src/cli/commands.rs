use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::engine::RecoveryEngine;
use crate::filters::{FilterSpec, parse_filter};
use crate::models::{MessageType, RecoveredContent};
use crate::sessions::{
    CorrectionCategory, CorrectionQuery, CrossRefQuery, DEFAULT_CORRECTION_LIMIT,
    DEFAULT_PREVIEW_CHARS, DEFAULT_SNIPPET_CHARS, MessageQuery, PlanningQuery,
    default_planning_commands,
};
use crate::utils::format_path_with_tilde;

#[derive(Parser)]
#[command(name = "ai-history-recovery")]
#[command(version = "0.1.0")]
#[command(about = "Recover files and search AI coding session history", long_about = None)]
pub struct Cli {
    /// Session log root (default: ~/.claude/projects)
    #[arg(long, global = true)]
    pub projects_dir: Option<PathBuf>,

    /// Recovery root with session_<id>/ and session_all_versions_<id>/ dirs
    /// (default: ~/.claude/recovery)
    #[arg(long, global = true)]
    pub recovery_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MessageTypeArg {
    User,
    Assistant,
    System,
}

impl From<MessageTypeArg> for MessageType {
    fn from(arg: MessageTypeArg) -> Self {
        match arg {
            MessageTypeArg::User => MessageType::User,
            MessageTypeArg::Assistant => MessageType::Assistant,
            MessageTypeArg::System => MessageType::System,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find recovered files by glob or regex
    Search {
        pattern: String,
        /// Filter query, e.g. "ext:py edits:2.. -session:abc"
        #[arg(long, short)]
        filter: Option<String>,
    },
    /// List every snapshot of a file
    Versions { filename: String },
    /// Write the newest version (or every version) of a file to disk
    Extract {
        filename: String,
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Extract every version as v<NNNNNN>_line_<count>.txt
        #[arg(long)]
        all: bool,
    },
    /// Messages of one session, by id or id prefix
    Messages {
        session: String,
        #[arg(long = "type", value_enum)]
        message_type: Option<MessageTypeArg>,
    },
    /// Search message text across every session
    SearchMessages {
        query: String,
        #[arg(long = "type", value_enum)]
        message_type: Option<MessageTypeArg>,
        /// Match tool invocations of this name against their input instead of prose
        #[arg(long)]
        tool: Option<String>,
        /// Include this many neighbouring messages around each match
        #[arg(long)]
        context: Option<usize>,
    },
    /// One row per session log
    Sessions {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        before: Option<String>,
    },
    /// User messages that correct earlier assistant output
    Corrections {
        /// Custom category as NAME=REGEX; repeat to add phrases or categories
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        before: Option<String>,
        #[arg(long, default_value_t = DEFAULT_CORRECTION_LIMIT)]
        limit: usize,
    },
    /// Slash-command usage counts
    Planning {
        /// Count only these command patterns (regex)
        #[arg(long = "command")]
        commands: Vec<String>,
        /// Count the built-in planning commands
        #[arg(long, conflicts_with = "commands")]
        defaults: bool,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        before: Option<String>,
    },
    /// Check which Write/Edit snippets for a file survive in its current content
    CrossRef {
        filename: String,
        /// File holding the current content (default: newest recovered version)
        #[arg(long)]
        current: Option<PathBuf>,
        #[arg(long)]
        session: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS)]
        snippet_chars: usize,
    },
    /// Render one session as markdown
    Export {
        session: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Counts, tool usage and touched files of one session
    Analyze { session: String },
    /// User/assistant events of one session
    Timeline {
        session: String,
        #[arg(long, default_value_t = DEFAULT_PREVIEW_CHARS)]
        preview_chars: usize,
    },
    /// Recovery directory totals
    Stats,
    /// Last absolute path recorded for a filename
    OriginalPath { filename: String },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let mut config = EngineConfig::from_env().context("Failed to resolve data directories")?;
    if let Some(dir) = cli.projects_dir {
        config = config.with_projects_dir(dir);
    }
    if let Some(dir) = cli.recovery_dir {
        config = config.with_recovery_dir(dir);
    }
    tracing::debug!(
        projects = %format_path_with_tilde(&config.projects_dir),
        recovery = %format_path_with_tilde(&config.recovery_dir),
        "resolved data directories"
    );

    execute(&RecoveryEngine::new(config), command)
}

fn execute(engine: &RecoveryEngine, command: Commands) -> Result<()> {
    match command {
        Commands::Search { pattern, filter } => {
            let filter = match filter {
                Some(query) => parse_filter(&query).context("Invalid --filter")?,
                None => FilterSpec::new(),
            };
            print_json(&engine.search(&pattern, &filter)?)
        }
        Commands::Versions { filename } => print_json(&engine.get_versions(&filename)),
        Commands::Extract { filename, output, all } => {
            let written = if all {
                let history = engine.extract_all(&filename)?;
                write_history(&output, &history)?
            } else {
                let content = engine.extract_final(&filename)?;
                vec![write_content(&output, &content.filename, &content)?]
            };
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Messages { session, message_type } => {
            print_json(&engine.get_messages(&session, message_type.map(Into::into)))
        }
        Commands::SearchMessages { query, message_type, tool, context } => {
            let query =
                MessageQuery::new(query).with_type(message_type.map(Into::into)).with_tool(tool);
            match context {
                Some(window) => print_json(&engine.search_messages_with_context(&query, window)?),
                None => print_json(&engine.search_messages(&query)?),
            }
        }
        Commands::Sessions { project, after, before } => print_json(&engine.get_sessions(
            project.as_deref(),
            after.as_deref(),
            before.as_deref(),
        )),
        Commands::Corrections { categories, project, after, before, limit } => {
            let query = CorrectionQuery {
                categories: parse_categories(&categories)?,
                project_filter: project,
                after,
                before,
                limit,
            };
            print_json(&engine.find_corrections(&query)?)
        }
        Commands::Planning { commands, defaults, project, after, before } => {
            let commands = if defaults {
                Some(default_planning_commands())
            } else if commands.is_empty() {
                None
            } else {
                Some(commands)
            };
            let query = PlanningQuery { commands, project_filter: project, after, before };
            print_json(&engine.analyze_planning_usage(&query)?)
        }
        Commands::CrossRef { filename, current, session, snippet_chars } => {
            let current_content = match current {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => engine
                    .extract_final(&filename)
                    .with_context(|| format!("No current content for {}", filename))?
                    .content,
            };
            let query = CrossRefQuery { session_prefix: session, snippet_chars };
            print_json(&engine.cross_reference_session(&filename, &current_content, &query))
        }
        Commands::Export { session, output } => {
            let markdown = engine.export_session_markdown(&session)?;
            match output {
                Some(path) => {
                    fs::write(&path, markdown)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{}", path.display());
                }
                None => print!("{}", markdown),
            }
            Ok(())
        }
        Commands::Analyze { session } => match engine.analyze_session(&session)? {
            Some(analysis) => print_json(&analysis),
            None => bail!("No session matching {:?}", session),
        },
        Commands::Timeline { session, preview_chars } => {
            print_json(&engine.timeline_session(&session, preview_chars)?)
        }
        Commands::Stats => print_json(&engine.get_statistics()),
        Commands::OriginalPath { filename } => print_json(&engine.get_original_path(&filename)),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// `NAME=REGEX` arguments grouped by name, in first-seen order.
fn parse_categories(args: &[String]) -> Result<Option<Vec<CorrectionCategory>>> {
    if args.is_empty() {
        return Ok(None);
    }
    let mut categories: Vec<CorrectionCategory> = Vec::new();
    for arg in args {
        let Some((name, pattern)) = arg.split_once('=') else {
            bail!("Invalid --category {:?}: expected NAME=REGEX", arg);
        };
        match categories.iter_mut().find(|c| c.name == name) {
            Some(category) => category.patterns.push(pattern.to_string()),
            None => categories.push(CorrectionCategory::new(name, [pattern])),
        }
    }
    Ok(Some(categories))
}

fn write_content(output_dir: &Path, name: &str, content: &RecoveredContent) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let target = output_dir.join(name);
    fs::write(&target, &content.content)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

fn write_history(output_dir: &Path, history: &[RecoveredContent]) -> Result<Vec<PathBuf>> {
    history
        .iter()
        .map(|content| write_content(output_dir, &content.history_name(), content))
        .collect()
}
