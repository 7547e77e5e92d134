//! Node authorization.
//!
//! A leaf answers for itself; a group is visible when any handler below
//! it says yes. That keeps group help from advertising subtrees the user
//! cannot reach.

use crate::descriptor::HandlerRegistry;
use crate::node::NodeId;
use crate::registry::CommandRegistry;
use botshell_core::UpdateMeta;
use tracing::debug;

/// True when at least one handler under `id` authorizes `meta`.
pub fn authorize_node(
    registry: &CommandRegistry,
    handlers: &HandlerRegistry,
    id: NodeId,
    meta: &UpdateMeta,
) -> bool {
    let mut keys = Vec::new();
    collect_handler_keys(registry, id, &mut keys);
    for key in keys {
        match handlers.get(&key) {
            Some(handler) => {
                if handler.authorize(meta) {
                    return true;
                }
            }
            None => {
                debug!(handler = %key, "authorization skipped unknown handler");
            }
        }
    }
    false
}

/// Handler keys reachable from `id`. A node carrying a command contributes
/// only its own key; the walk does not descend past it.
fn collect_handler_keys(registry: &CommandRegistry, id: NodeId, out: &mut Vec<String>) {
    let node = registry.node(id);
    if let Some(command) = &node.command {
        out.push(command.clone());
        return;
    }
    for child in node.children.values() {
        collect_handler_keys(registry, *child, out);
    }
}
