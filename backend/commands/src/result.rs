//! Resolution outcome.

use crate::node::NodeId;
use crate::spec::{ArgumentSpec, OptionSpec};

/// Terminal state of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    /// Command is valid and ready to run.
    Ok,
    /// No such command, and nothing close enough to suggest.
    NotFound,
    /// No such command, but suggestions are available.
    Suggest,
    /// Input stopped at the root level; show root help.
    ShowRootHelp,
    /// Input stopped at a group node; show its subcommands.
    ShowGroupHelp,
    /// Help for a specific command.
    ShowCommandHelp,
    MissingArgument,
    TooManyArguments,
    InvalidArgument,
    MissingOption,
    InvalidOption,
    Unauthorized,
}

/// Everything the renderer and executor need to act on one resolution.
///
/// A single resolve produces exactly one status; callers gate execution on
/// [`should_stop`](Self::should_stop) rather than inspecting fields.
#[derive(Debug, Clone)]
pub struct ResolveResult {
    pub status: ResolveStatus,
    /// Resolved node, when the walk got that far.
    pub node: Option<NodeId>,
    /// The requested token or resolved command name.
    pub requested: Option<String>,
    /// Positional arguments, already lowercased by tokenization.
    pub args: Vec<String>,
    /// Raw option tokens (e.g. `["--force", "--age=23"]`).
    pub options: Vec<String>,
    pub suggest: Vec<String>,
    pub missing_args: Vec<String>,
    pub invalid_args: Vec<String>,
    pub missing_options: Vec<String>,
    pub invalid_options: Vec<String>,
    pub help_requested: bool,
    /// Argument specs with values bound; filled only on `Ok`.
    ///
    /// These are copies. The registry's own specs are never written to,
    /// so one resolution cannot leak values into the next.
    pub bound_args: Vec<ArgumentSpec>,
    /// Command-specific option specs with values bound; filled only on `Ok`.
    pub bound_options: Vec<OptionSpec>,
}

impl ResolveResult {
    pub fn new(status: ResolveStatus) -> Self {
        Self {
            status,
            node: None,
            requested: None,
            args: Vec::new(),
            options: Vec::new(),
            suggest: Vec::new(),
            missing_args: Vec::new(),
            invalid_args: Vec::new(),
            missing_options: Vec::new(),
            invalid_options: Vec::new(),
            help_requested: false,
            bound_args: Vec::new(),
            bound_options: Vec::new(),
        }
    }

    /// Execution proceeds only on [`ResolveStatus::Ok`].
    pub fn should_stop(&self) -> bool {
        self.status != ResolveStatus::Ok
    }
}
