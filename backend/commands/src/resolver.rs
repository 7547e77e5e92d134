//! Resolve raw chat input into a [`ResolveResult`].
//!
//! The resolver tokenizes input, walks the command tree, checks
//! authorization and validates arguments and options. It never renders
//! output and never mutates the registry; bound argument and option values
//! travel on the result as cloned specs.

use crate::authorize::authorize_node;
use crate::descriptor::HandlerRegistry;
use crate::node::NodeId;
use crate::pattern;
use crate::registry::CommandRegistry;
use crate::result::{ResolveResult, ResolveStatus};
use crate::spec::{ArgumentSpec, OptionSpec};
use crate::suggest::suggest;
use botshell_core::UpdateMeta;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Option tokens that trigger help output unless overridden.
pub const DEFAULT_HELP_FLAGS: [&str; 2] = ["--help", "-h"];

/// Per-update resolver borrowing the compiled registry.
pub struct CommandResolver<'a> {
    registry: &'a CommandRegistry,
    handlers: &'a HandlerRegistry,
    help_flags: Vec<String>,
}

impl<'a> CommandResolver<'a> {
    pub fn new(registry: &'a CommandRegistry, handlers: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            handlers,
            help_flags: DEFAULT_HELP_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Replace the help flag set, e.g. from bot configuration.
    pub fn with_help_flags(mut self, flags: Vec<String>) -> Self {
        self.help_flags = flags;
        self
    }

    /// Resolve raw input. Accepts chat-style prefixes (`/cmd`, `cmd@bot`),
    /// `:`-separated paths and `-`-prefixed option tokens.
    pub fn resolve(&self, input: &str, meta: &UpdateMeta) -> ResolveResult {
        let input = input.trim();
        if input.is_empty() {
            return ResolveResult::new(ResolveStatus::ShowRootHelp);
        }

        let (parts, options) = split_command_and_options(input);
        let help_requested =
            options.iter().any(|token| self.help_flags.iter().any(|flag| flag == token));

        // Only option tokens, no command.
        if parts.is_empty() {
            let mut result = ResolveResult::new(ResolveStatus::ShowRootHelp);
            result.options = options;
            return result;
        }

        let Some(&root) = self.registry.roots().get(&parts[0]) else {
            let candidates: Vec<String> = self.registry.roots().keys().cloned().collect();
            let suggest = suggest(&parts[0], &candidates);
            let status = if suggest.is_empty() {
                ResolveStatus::NotFound
            } else {
                ResolveStatus::Suggest
            };
            let mut result = ResolveResult::new(status);
            result.requested = Some(parts[0].clone());
            result.options = options;
            result.suggest = suggest;
            return result;
        };

        let mut node = root;
        let mut consumed = 1;

        // "make --help": help on a group root short-circuits the walk.
        if help_requested && consumed == parts.len() && self.registry.node(node).has_children() {
            let mut result = ResolveResult::new(ResolveStatus::ShowGroupHelp);
            result.node = Some(node);
            result.requested = Some(parts[0].clone());
            result.options = options;
            result.help_requested = true;
            return result;
        }

        while consumed < parts.len() {
            let token = &parts[consumed];
            let current = self.registry.node(node);

            // A leaf stops path consumption; the rest become arguments even
            // when a child of the same name exists.
            if current.is_leaf() {
                break;
            }

            match current.children.get(token) {
                Some(&child) => {
                    node = child;
                    consumed += 1;
                }
                None => {
                    // A dead-end group that expects arguments swallows the
                    // rest as arguments instead of failing.
                    if current.children.is_empty() && !current.arguments.is_empty() {
                        break;
                    }
                    let mut result = ResolveResult::new(ResolveStatus::NotFound);
                    result.node = Some(node);
                    result.requested = Some(token.clone());
                    result.options = options;
                    return result;
                }
            }
        }

        let args: Vec<String> = parts[consumed..].to_vec();

        if !authorize_node(self.registry, self.handlers, node, meta) {
            return self.result_at(ResolveStatus::Unauthorized, node, &args, &options);
        }

        // Ended on a group: the path is incomplete.
        let target = self.registry.node(node);
        if !target.is_leaf() && target.has_children() {
            return self.result_at(ResolveStatus::ShowGroupHelp, node, &args, &options);
        }

        let bound_args = match self.validate_arguments(node, &args, &options) {
            Ok(bound) => bound,
            Err(result) => return *result,
        };
        let bound_options = match self.validate_options(node, &args, &options) {
            Ok(bound) => bound,
            Err(result) => return *result,
        };

        if help_requested {
            let mut result = self.result_at(ResolveStatus::ShowCommandHelp, node, &args, &options);
            result.help_requested = true;
            return result;
        }

        let mut result = self.result_at(ResolveStatus::Ok, node, &args, &options);
        result.bound_args = bound_args;
        result.bound_options = bound_options;
        result
    }

    fn result_at(
        &self,
        status: ResolveStatus,
        node: NodeId,
        args: &[String],
        options: &[String],
    ) -> ResolveResult {
        let mut result = ResolveResult::new(status);
        result.node = Some(node);
        result.requested = Some(self.registry.node(node).name.clone());
        result.args = args.to_vec();
        result.options = options.to_vec();
        result
    }

    /// Check positional arguments against the node's specs. The count must
    /// match the spec list exactly; patterns validate anchored. Returns the
    /// specs cloned with values filled in.
    fn validate_arguments(
        &self,
        node: NodeId,
        args: &[String],
        options: &[String],
    ) -> Result<Vec<ArgumentSpec>, Box<ResolveResult>> {
        let specs = &self.registry.node(node).arguments;
        let expected = specs.len();

        if args.len() < expected {
            let mut result = self.result_at(ResolveStatus::MissingArgument, node, args, options);
            result.missing_args = specs[args.len()..].iter().map(|a| a.name.clone()).collect();
            return Err(Box::new(result));
        }
        if args.len() > expected {
            return Err(Box::new(self.result_at(
                ResolveStatus::TooManyArguments,
                node,
                args,
                options,
            )));
        }

        let mut bound = specs.clone();
        for (spec, value) in bound.iter_mut().zip(args) {
            spec.value = Some(value.clone());
            if let Some(raw) = spec.pattern.as_deref() {
                if !raw.trim().is_empty() && !pattern::matches_anchored(raw, value) {
                    let mut result =
                        self.result_at(ResolveStatus::InvalidArgument, node, args, options);
                    result.invalid_args = vec![spec.name.clone()];
                    return Err(Box::new(result));
                }
            }
        }
        Ok(bound)
    }

    /// Check option tokens against global and node specs. Unknown flags are
    /// ignored; inline values are kept when the spec's filter pattern finds
    /// a match anywhere in them. Returns the node's own specs cloned with
    /// values filled in.
    fn validate_options(
        &self,
        node: NodeId,
        args: &[String],
        tokens: &[String],
    ) -> Result<Vec<OptionSpec>, Box<ResolveResult>> {
        let mut specs: Vec<OptionSpec> = self.registry.global_options().to_vec();
        specs.extend(self.registry.node(node).options.iter().cloned());

        let mut by_long: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_short: BTreeMap<String, usize> = BTreeMap::new();
        for (idx, spec) in specs.iter().enumerate() {
            by_long.insert(spec.long.to_lowercase(), idx);
            if let Some(short) = &spec.short {
                by_short.insert(short.to_lowercase(), idx);
            }
        }

        let mut present: BTreeSet<String> = BTreeSet::new();

        for raw in tokens {
            let token = raw.to_lowercase();
            let (name, value) = match token.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (token, None),
            };

            let Some(&idx) = by_long.get(&name).or_else(|| by_short.get(&name)) else {
                continue;
            };
            present.insert(specs[idx].long.to_lowercase());

            // "--opt=" still counts as an inline value here, and an empty
            // value never satisfies a filter pattern.
            if let Some(value) = value {
                specs[idx].value = Some(value.clone());
                let failed = match specs[idx].pattern.as_deref() {
                    Some(raw) if !raw.trim().is_empty() => {
                        pattern::extract_first(raw, &value).is_none()
                    }
                    _ => false,
                };
                if failed {
                    let mut result =
                        self.result_at(ResolveStatus::InvalidOption, node, args, tokens);
                    result.invalid_options = vec![specs[idx].long.clone()];
                    return Err(Box::new(result));
                }
            }
        }

        let missing: Vec<String> = specs
            .iter()
            .filter(|s| s.required && !present.contains(&s.long.to_lowercase()))
            .map(|s| s.long.clone())
            .collect();
        if !missing.is_empty() {
            let mut result = self.result_at(ResolveStatus::MissingOption, node, args, tokens);
            result.missing_options = missing;
            return Err(Box::new(result));
        }

        Ok(specs.into_iter().filter(|s| !s.is_global).collect())
    }
}

/// Split input into command path tokens and `-`-prefixed option tokens.
///
/// Per whitespace-separated token: a leading `/` is dropped, anything from
/// the first `@` on is dropped (bot mentions), the token is lowercased.
/// Non-option tokens split further on `:`.
fn split_command_and_options(input: &str) -> (Vec<String>, Vec<String>) {
    let mut parts = Vec::new();
    let mut options = Vec::new();

    for raw in input.split_whitespace() {
        let mut token = raw.strip_prefix('/').unwrap_or(raw).to_string();
        if let Some(at) = token.find('@') {
            token.truncate(at);
        }
        let token = token.to_lowercase();

        if token.starts_with('-') {
            options.push(token);
            continue;
        }
        for segment in token.split(':') {
            if !segment.is_empty() {
                parts.push(segment.to_string());
            }
        }
    }

    (parts, options)
}
