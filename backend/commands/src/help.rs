//! Render a [`ResolveResult`] into Markdown.
//!
//! Every human-readable string comes from the language dictionary; the
//! renderer only arranges sections and bullets. When interactive prompts
//! are enabled, a missing argument or option turns into a stored pending
//! reply plus a question instead of the static error text.

use crate::authorize::authorize_node;
use crate::descriptor::HandlerRegistry;
use crate::node::{CommandNode, NodeId};
use crate::registry::CommandRegistry;
use crate::result::{ResolveResult, ResolveStatus};
use crate::spec::OptionSpec;
use botshell_core::{UpdateContext, UpdateMeta};
use botshell_i18n::{prompt_text, Dictionary, PromptKind};
use botshell_reply::{NextInput, PendingReply, ReplyStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Interactive prompt wiring: where pending replies go and for how long.
pub struct InteractivePrompts {
    store: Arc<dyn ReplyStore>,
    ttl: Duration,
}

impl InteractivePrompts {
    /// A sub-second TTL falls back to the stock two minutes.
    pub fn new(store: Arc<dyn ReplyStore>, ttl: Duration) -> Self {
        let ttl = if ttl < Duration::from_secs(1) { Duration::from_secs(120) } else { ttl };
        Self { store, ttl }
    }
}

/// Renders resolution outcomes for one update.
pub struct HelpRenderer<'a> {
    registry: &'a CommandRegistry,
    handlers: &'a HandlerRegistry,
    dict: &'a Dictionary,
    interactive: Option<InteractivePrompts>,
}

impl<'a> HelpRenderer<'a> {
    pub fn new(
        registry: &'a CommandRegistry,
        handlers: &'a HandlerRegistry,
        dict: &'a Dictionary,
    ) -> Self {
        Self { registry, handlers, dict, interactive: None }
    }

    /// Enable interactive prompts for missing arguments and options.
    pub fn with_interactive(mut self, prompts: InteractivePrompts) -> Self {
        self.interactive = Some(prompts);
        self
    }

    /// Render the result, or `None` when there is nothing to send. A
    /// successful resolution renders the dictionary's `ok` entry, which is
    /// empty in the stock languages.
    pub fn render(
        &self,
        result: &ResolveResult,
        ctx: &UpdateContext,
        meta: &UpdateMeta,
    ) -> Option<String> {
        let text = match result.status {
            ResolveStatus::Ok => self.dict.text("ok"),
            ResolveStatus::NotFound => self.dict.text_with(
                "cmd.not_found",
                &[("requested", result.requested.as_deref().unwrap_or(""))],
            ),
            ResolveStatus::Suggest => self.render_suggest(result),
            ResolveStatus::ShowRootHelp => self.render_root_help(meta),
            ResolveStatus::ShowGroupHelp => self.render_group_help(result, meta),
            ResolveStatus::ShowCommandHelp => self.render_leaf_help(result),
            ResolveStatus::MissingArgument => self.render_missing_args(result, ctx),
            ResolveStatus::TooManyArguments => self.render_too_many_args(result),
            ResolveStatus::InvalidArgument => self.render_invalid_args(result),
            ResolveStatus::MissingOption => self.render_missing_options(result, ctx),
            ResolveStatus::InvalidOption => self.render_invalid_options(result),
            ResolveStatus::Unauthorized => self.render_unauthorized(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn render_suggest(&self, result: &ResolveResult) -> String {
        let requested = format!("/{}", result.requested.as_deref().unwrap_or(""));
        let base = self.dict.text_with("cmd.not_found", &[("requested", &requested)]);
        if result.suggest.is_empty() {
            return base;
        }
        let bullets: Vec<String> = result.suggest.iter().map(|s| format!("• `/{s}`")).collect();
        let second = self
            .dict
            .text_with("cmd.did_you_mean", &[("suggest", &format!("\n{}", bullets.join("\n")))]);
        format!("{base}\n\n{second}")
    }

    fn render_root_help(&self, meta: &UpdateMeta) -> String {
        let mut lines = self.usage_section("command [arguments] [options]");
        lines.extend(self.options_section(None));
        lines.extend(self.command_list_section(self.registry.roots(), None, meta));
        lines.join("\n")
    }

    fn render_group_help(&self, result: &ResolveResult, meta: &UpdateMeta) -> String {
        let Some(id) = result.node else {
            return String::new();
        };
        let node = self.registry.node(id);
        let mut lines = self.usage_section("command [arguments] [options]");
        lines.extend(self.options_section(Some(node)));
        lines.extend(self.command_list_section(&node.children, Some(id), meta));
        lines.join("\n")
    }

    fn render_leaf_help(&self, result: &ResolveResult) -> String {
        let Some(id) = result.node else {
            return String::new();
        };
        let node = self.registry.node(id);

        let args_part: Vec<String> = node
            .arguments
            .iter()
            .map(|a| {
                if a.required {
                    format!("<{}>", a.name)
                } else {
                    format!("[{}]", a.name)
                }
            })
            .collect();
        let has_own_options =
            node.options.iter().any(|o| o.short.as_deref() != Some("-h"));
        let usage: Vec<String> = [
            format!("/{}", self.registry.path_of(id)),
            args_part.join(" "),
            if has_own_options { "[options]".to_string() } else { String::new() },
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

        let mut lines = self.description_section(node);
        lines.extend(self.usage_section(&usage.join(" ")));
        lines.extend(self.arguments_section(node));
        lines.extend(self.options_section(Some(node)));
        lines.join("\n")
    }

    fn render_missing_args(&self, result: &ResolveResult, ctx: &UpdateContext) -> String {
        if let Some(prompt) = self.make_reply_prompt(result, ctx) {
            return prompt;
        }
        let items = backtick_list(&result.missing_args);
        // This arm tolerates a sparse dictionary; empty sections drop out.
        let sections = [
            self.dict.text_with("arg.missing", &[("items", &items)]),
            self.try_help_line(result.node),
        ];
        sections.into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n\n")
    }

    fn render_too_many_args(&self, result: &ResolveResult) -> String {
        format!("{}\n\n{}", self.dict.text("arg.too_many"), self.try_help_line(result.node))
    }

    fn render_invalid_args(&self, result: &ResolveResult) -> String {
        let items = backtick_list(&result.invalid_args);
        format!(
            "{}\n\n{}",
            self.dict.text_with("arg.invalid", &[("items", &items)]),
            self.try_help_line(result.node),
        )
    }

    fn render_missing_options(&self, result: &ResolveResult, ctx: &UpdateContext) -> String {
        if let Some(prompt) = self.make_reply_prompt(result, ctx) {
            return prompt;
        }
        let items = backtick_list(&result.missing_options);
        format!(
            "{}\n\n{}",
            self.dict.text_with("opt.missing", &[("items", &items)]),
            self.try_help_line(result.node),
        )
    }

    fn render_invalid_options(&self, result: &ResolveResult) -> String {
        let items = backtick_list(&result.invalid_options);
        format!(
            "{}\n\n{}",
            self.dict.text_with("opt.invalid", &[("items", &items)]),
            self.try_help_line(result.node),
        )
    }

    fn render_unauthorized(&self) -> String {
        format!(
            "{}\n\n{}",
            self.dict.text("unauthorize.title"),
            self.dict.text("unauthorize.message"),
        )
    }

    /// Store a pending inspector reply and build the question for the first
    /// missing input. Returns `None` when prompts are disabled, the update
    /// has no usable scope, or no prompt text resolves; the pending state is
    /// written before text resolution, so a missing template still leaves
    /// the listener armed.
    fn make_reply_prompt(&self, result: &ResolveResult, ctx: &UpdateContext) -> Option<String> {
        let interactive = self.interactive.as_ref()?;
        if !matches!(
            result.status,
            ResolveStatus::MissingArgument | ResolveStatus::MissingOption
        ) {
            return None;
        }
        if !ctx.is_command {
            return None;
        }
        let scope = ctx.reply_scope()?;
        let node_id = result.node?;

        let (next, prompt_key, kind) = if result.status == ResolveStatus::MissingArgument {
            let name = result.missing_args.first().filter(|name| !name.is_empty())?.clone();
            (NextInput::Arg { name: name.clone() }, name, PromptKind::Argument)
        } else {
            let long = result.missing_options.first().filter(|long| !long.is_empty())?.clone();
            let key = long.trim_start_matches('-').to_string();
            (NextInput::Opt { name: long }, key, PromptKind::Option)
        };

        let base_input = self.registry.path_of(node_id);
        if base_input.is_empty() {
            return None;
        }

        let pending = PendingReply::Inspector {
            scope: scope.clone(),
            base_input: Some(base_input),
            args: result.args.clone(),
            options: result.options.clone(),
            next: Some(next),
        };
        interactive.store.put(&scope, &pending, interactive.ttl);

        let node = self.registry.node(node_id);
        let prompt = prompt_text(
            self.dict,
            &prompt_key,
            kind,
            &node.prompt_overrides,
            &node.prompt_variables,
        );
        let hint = self.dict.text("hint.cancel");

        let joined = [prompt, hint]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let joined = joined.trim().to_string();
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    fn description_section(&self, node: &CommandNode) -> Vec<String> {
        match node.description.as_deref().filter(|d| !d.is_empty()) {
            Some(desc) => vec![self.dict.text("help.description"), format!("_{desc}_\n")],
            None => Vec::new(),
        }
    }

    fn usage_section(&self, text: &str) -> Vec<String> {
        vec![self.dict.text("help.usage"), format!("_{text}_\n")]
    }

    fn arguments_section(&self, node: &CommandNode) -> Vec<String> {
        let mut lines = vec![self.dict.text("help.args")];
        for arg in &node.arguments {
            lines.push(format!("• *`{}`*", arg.name));
            if let Some(desc) = arg.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("_{desc}_\n"));
            }
        }
        if lines.len() > 1 { lines } else { Vec::new() }
    }

    /// Global options first, then the node's own minus any `-h` lookalike
    /// that would shadow the built-in help flag.
    fn options_section(&self, node: Option<&CommandNode>) -> Vec<String> {
        let mut lines = vec![self.dict.text("help.opts")];
        let own: Vec<&OptionSpec> = node
            .map(|n| n.options.iter().filter(|o| o.short.as_deref() != Some("-h")).collect())
            .unwrap_or_default();
        for opt in self.registry.global_options().iter().chain(own) {
            let flag = match &opt.short {
                Some(short) => format!("{short}, {}", opt.long),
                None => opt.long.clone(),
            };
            lines.push(format!("• `{flag}`"));
            if let Some(desc) = opt.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("_{desc}_\n"));
            }
        }
        if lines.len() > 1 { lines } else { Vec::new() }
    }

    /// Bulleted command list, filtered to what the sender may run. The
    /// title renders even when the filter leaves nothing.
    fn command_list_section(
        &self,
        nodes: &BTreeMap<String, NodeId>,
        parent: Option<NodeId>,
        meta: &UpdateMeta,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        match parent {
            None => lines.push(format!("{}:", self.dict.text("help.root.title"))),
            Some(parent) => {
                let cmd = self.registry.path_of(parent);
                lines.push(self.dict.text_with("help.group.title", &[("cmd", &cmd)]));
            }
        }
        for &id in nodes.values() {
            if !authorize_node(self.registry, self.handlers, id, meta) {
                continue;
            }
            lines.push(format!("• `/{}`", self.registry.path_of(id)));
            let node = self.registry.node(id);
            if let Some(desc) = node.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("_{desc}_\n"));
            }
        }
        lines
    }

    fn try_help_line(&self, node: Option<NodeId>) -> String {
        let path = node.map(|id| self.registry.path_of(id)).unwrap_or_default();
        self.dict.text_with("cmd.try_help", &[("cmd", &format!("/{path}"))])
    }
}

fn backtick_list(items: &[String]) -> String {
    items.iter().map(|item| format!("`{item}`")).collect::<Vec<_>>().join(", ")
}
