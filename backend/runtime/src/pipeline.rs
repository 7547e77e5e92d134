//! Per-bot update pipeline.
//!
//! [`PipelineBuilder`] assembles one bot from its config: declared
//! commands merge into the roster, the command tree compiles (through
//! the cache snapshot when caching is on), middleware rules normalize
//! and compile into the per-bot plan, and the language dictionary
//! loads. The resulting [`Pipeline`] processes each update in a fixed
//! order: middleware chain, pending-reply interception, command
//! dispatch. The pipeline is itself the [`DispatchSink`] the
//! interceptor re-enters when a collected reply completes a command
//! line.

use anyhow::Context as _;
use async_trait::async_trait;
use botshell_cache::{KvCache, MemoryCache};
use botshell_commands::{
    resolve_options, CommandHandler, CommandRegistry, CommandResolver, HandlerRegistry,
    HelpRenderer, InteractivePrompts, Invocation, ResolveResult,
};
use botshell_config::{
    commands_for_bot, merge_declared, BotshellConfig, ConsoleConfig, DeclaredCommand,
};
use botshell_core::{BotError, IncomingMessage, ReplySink, UpdateContext, UpdateEvent, UpdateMeta};
use botshell_i18n::{Dictionary, DictionarySource};
use botshell_logging::{PipelineEvent, PipelineTrace};
use botshell_middleware::{
    compile_for_bot, normalize_rules, BotMiddleware, Middleware, MiddlewareRegistry,
};
use botshell_reply::{CacheReplyStore, DispatchSink, ReplyInterceptor, ReplyListener, ReplyStore};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Hook that decorates the per-update [`UpdateMeta`] before any
/// authorization gate sees it.
type MetaEnricher = dyn Fn(&UpdateContext, UpdateMeta) -> UpdateMeta + Send + Sync;

/// Everything one bot needs to process updates.
pub struct Pipeline {
    bot: String,
    console: ConsoleConfig,
    registry: CommandRegistry,
    handlers: HandlerRegistry,
    middleware: MiddlewareRegistry,
    plan: BotMiddleware,
    dict: Dictionary,
    store: Arc<dyn ReplyStore>,
    interceptor: ReplyInterceptor,
    sink: Arc<dyn ReplySink>,
    enrich: Option<Arc<MetaEnricher>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("bot", &self.bot).finish_non_exhaustive()
    }
}

/// Assembles a [`Pipeline`] for one bot.
pub struct PipelineBuilder {
    config: BotshellConfig,
    bot: Option<String>,
    handlers: HandlerRegistry,
    middleware: MiddlewareRegistry,
    declared_commands: Vec<DeclaredCommand>,
    declared_middleware: Vec<String>,
    cache: Option<Arc<dyn KvCache>>,
    sink: Option<Arc<dyn ReplySink>>,
    enrich: Option<Arc<MetaEnricher>>,
}

impl PipelineBuilder {
    pub fn new(config: BotshellConfig) -> Self {
        Self {
            config,
            bot: None,
            handlers: HandlerRegistry::new(),
            middleware: MiddlewareRegistry::new(),
            declared_commands: Vec::new(),
            declared_middleware: Vec::new(),
            cache: None,
            sink: None,
            enrich: None,
        }
    }

    /// Which bot this pipeline serves; defaults to the config's
    /// `defaultBot`.
    pub fn bot(mut self, name: impl Into<String>) -> Self {
        self.bot = Some(name.into());
        self
    }

    /// Register a command: the handler under the declared id plus its
    /// roster placement.
    pub fn command(mut self, declared: DeclaredCommand, handler: Arc<dyn CommandHandler>) -> Self {
        self.handlers.register(declared.id.clone(), handler);
        self.declared_commands.push(declared);
        self
    }

    /// Register a middleware. Declaration order is the order declared
    /// entries run in.
    pub fn middleware(mut self, id: impl Into<String>, middleware: Arc<dyn Middleware>) -> Self {
        let id = id.into();
        self.middleware.register(id.clone(), middleware);
        self.declared_middleware.push(id);
        self
    }

    /// Share a cache across registry snapshots, dictionaries and
    /// pending replies. Defaults to a fresh in-memory cache.
    pub fn cache(mut self, cache: Arc<dyn KvCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Where outbound text goes. Required.
    pub fn sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Enrich the per-update [`UpdateMeta`] before authorization gates
    /// consult it, e.g. to mark admins. Runs for direct updates and for
    /// re-dispatched replies alike, so gated commands stay open across
    /// an interactive exchange.
    pub fn enrich_meta(
        mut self,
        f: impl Fn(&UpdateContext, UpdateMeta) -> UpdateMeta + Send + Sync + 'static,
    ) -> Self {
        self.enrich = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<Pipeline, BotError> {
        let Some(sink) = self.sink else {
            return Err(BotError::config("a reply sink is required"));
        };
        let mut config = self.config;
        let bot = self.bot.unwrap_or_else(|| config.default_bot.clone());
        let cache: Arc<dyn KvCache> = self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new()));

        merge_declared(&mut config, &self.declared_commands)?;
        let known: BTreeSet<String> = self.handlers.ids().into_iter().collect();
        let ids = commands_for_bot(&config, &bot, &known)?;
        let registry = if config.cache.enabled {
            CommandRegistry::from_handlers_cached(&ids, &self.handlers, cache.as_ref())?
        } else {
            CommandRegistry::from_handlers(&ids, &self.handlers)?
        };

        let rules = normalize_rules(&config)?;
        let plan = compile_for_bot(&bot, &self.declared_middleware, &rules, &self.middleware)?;

        let paths: Vec<PathBuf> = config.console.lang_paths.iter().map(PathBuf::from).collect();
        let mut source = DictionarySource::new(paths);
        if config.cache.enabled {
            source = source.with_cache(cache.clone());
        }
        let dict = source.load(&config.console.lang);

        let store: Arc<dyn ReplyStore> = Arc::new(CacheReplyStore::new(cache));
        info!(bot = %bot, commands = ids.len(), "pipeline ready");

        Ok(Pipeline {
            bot,
            console: config.console,
            registry,
            handlers: self.handlers,
            middleware: self.middleware,
            plan,
            dict,
            interceptor: ReplyInterceptor::new(store.clone()),
            store,
            sink,
            enrich: self.enrich,
        })
    }
}

impl Pipeline {
    /// Process one update end to end. Failures are recorded to the
    /// pipeline trace before they propagate.
    pub async fn handle(&self, ctx: &UpdateContext) -> Result<(), BotError> {
        let outcome = self.process(ctx).await;
        if let Err(err) = &outcome {
            PipelineTrace::record(&self.bot, PipelineEvent::Failed { error_msg: err.to_string() });
        }
        outcome
    }

    /// Build the context from a message-bearing update and handle it.
    pub async fn handle_message(
        &self,
        event: UpdateEvent,
        message: IncomingMessage,
    ) -> Result<(), BotError> {
        let ctx = UpdateContext::from_message(self.bot.as_str(), event, message);
        self.handle(&ctx).await
    }

    /// Arm a custom-mode pending reply with this pipeline's store and
    /// configured TTL.
    pub fn listener(&self) -> ReplyListener {
        ReplyListener::new(
            self.store.clone(),
            Duration::from_secs(self.console.listen_reply_ttl),
        )
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn bot(&self) -> &str {
        &self.bot
    }

    async fn process(&self, ctx: &UpdateContext) -> Result<(), BotError> {
        let meta = self.meta_for(ctx);
        if !self.run_middleware(ctx, &meta).await? {
            return Ok(());
        }
        let consumed = self
            .interceptor
            .intercept(ctx, self, &self.handlers)
            .await
            .context("reply interception failed")?;
        if consumed {
            return Ok(());
        }
        if !ctx.is_command {
            return Ok(());
        }
        self.dispatch_command(ctx, &meta).await
    }

    /// Run the middleware plan for this update. Commands run the
    /// command buckets; everything else runs its event bucket. Returns
    /// `false` when a middleware stopped the chain.
    async fn run_middleware(
        &self,
        ctx: &UpdateContext,
        meta: &UpdateMeta,
    ) -> Result<bool, BotError> {
        let ids: Vec<String> = if ctx.is_command {
            self.plan.for_command(ctx.command_name.as_deref().unwrap_or(""))
        } else {
            self.plan.for_event(ctx.event).to_vec()
        };

        for id in &ids {
            let Some(middleware) = self.middleware.get(id) else {
                debug!(id, "middleware missing from registry; skipped");
                continue;
            };
            let proceed = middleware
                .handle(ctx, meta)
                .await
                .with_context(|| format!("middleware `{id}` failed"))?;
            if !proceed {
                PipelineTrace::record(
                    &self.bot,
                    PipelineEvent::Blocked {
                        event: ctx.event.key().to_string(),
                        middleware: id.clone(),
                    },
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn dispatch_command(
        &self,
        ctx: &UpdateContext,
        meta: &UpdateMeta,
    ) -> Result<(), BotError> {
        let input = ctx.text.as_deref().unwrap_or("");
        let mut resolver = CommandResolver::new(&self.registry, &self.handlers);
        if !self.console.help_flags.is_empty() {
            resolver = resolver.with_help_flags(self.console.help_flags.clone());
        }
        let result = resolver.resolve(input, meta);
        PipelineTrace::record(
            &self.bot,
            PipelineEvent::Resolved {
                input: input.to_string(),
                status: format!("{:?}", result.status),
            },
        );

        if result.should_stop() {
            let mut renderer = HelpRenderer::new(&self.registry, &self.handlers, &self.dict);
            if self.console.interactive_prompts {
                renderer = renderer.with_interactive(InteractivePrompts::new(
                    self.store.clone(),
                    Duration::from_secs(self.console.listen_reply_ttl),
                ));
            }
            if let Some(text) = renderer.render(&result, ctx, meta) {
                self.sink
                    .send(ctx, &text)
                    .await
                    .context("failed to send rendered reply")?;
            }
            return Ok(());
        }

        self.execute(ctx, &result).await
    }

    async fn execute(&self, ctx: &UpdateContext, result: &ResolveResult) -> Result<(), BotError> {
        let Some(node_id) = result.node else {
            debug!("resolution ended without a node; nothing to run");
            return Ok(());
        };
        let node = self.registry.node(node_id);
        let Some(handler_id) = node.command.as_deref() else {
            debug!(path = %self.registry.path_of(node_id), "node has no handler attached");
            return Ok(());
        };
        let Some(handler) = self.handlers.get(handler_id) else {
            debug!(handler_id, "handler disappeared from the registry");
            return Ok(());
        };

        let mut specs = self.registry.global_options().to_vec();
        specs.extend(result.bound_options.iter().cloned());
        let path = self.registry.path_of(node_id);
        let invocation = Invocation {
            path: path.clone(),
            args: result.bound_args.clone(),
            options: resolve_options(&result.options, &specs),
        };

        let reply = handler
            .handle(ctx, &invocation)
            .await
            .with_context(|| format!("command `{path}` failed"))?;

        if let Some(text) = reply {
            self.sink
                .send(ctx, &text)
                .await
                .context("failed to send command reply")?;
            PipelineTrace::record(
                &self.bot,
                PipelineEvent::Replied { command: path, chars: text.chars().count() },
            );
        }
        Ok(())
    }

    fn meta_for(&self, ctx: &UpdateContext) -> UpdateMeta {
        let meta = UpdateMeta::from_context(ctx);
        match &self.enrich {
            Some(enrich) => enrich(ctx, meta),
            None => meta,
        }
    }
}

#[async_trait]
impl DispatchSink for Pipeline {
    /// Re-dispatch a rebuilt command line. Middleware and interception
    /// already ran for the underlying update; the synthetic line goes
    /// straight to resolution.
    async fn dispatch(&self, ctx: &UpdateContext, input: &str) -> anyhow::Result<()> {
        let synthetic = ctx.with_synthetic_text(input);
        let meta = self.meta_for(&synthetic);
        self.dispatch_command(&synthetic, &meta).await?;
        Ok(())
    }
}
