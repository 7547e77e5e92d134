pub mod authorize;
pub mod descriptor;
pub mod help;
pub mod node;
pub mod pattern;
pub mod registry;
pub mod resolver;
pub mod result;
pub mod spec;
pub mod suggest;

pub use authorize::authorize_node;
pub use descriptor::{CommandDescriptor, CommandHandler, HandlerRegistry, Invocation};
pub use help::{HelpRenderer, InteractivePrompts};
pub use node::{CommandNode, NodeId};
pub use pattern::{resolve_options, OptionValue};
pub use registry::{CommandRegistry, RegistryError, REGISTRY_CACHE_KEY};
pub use resolver::{CommandResolver, DEFAULT_HELP_FLAGS};
pub use result::{ResolveResult, ResolveStatus};
pub use spec::{ArgumentSpec, OptionSpec};
pub use suggest::suggest;
