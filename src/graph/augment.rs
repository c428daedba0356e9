use crate::error::FlowError;
use crate::graph::residual::ResidualGraph;
use crate::types::{Capacity, EdgeId, FlowNetwork, NodeId};

/// How one hop of an augmenting path changes the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HopUpdate {
    push: Option<(EdgeId, Capacity)>,
    cancel: Option<(EdgeId, Capacity)>,
}

/// Pushes `bottleneck` units along `path` and rebuilds `residual`.
///
/// Each hop u->v adds flow to the first structural edge u->v. Whatever does
/// not fit on that edge (all of it, if there is none) cancels flow on the
/// first edge v->u. All hops are resolved before any flow changes, so an
/// error leaves the network untouched.
pub fn augment(
    network: &mut FlowNetwork,
    residual: &mut ResidualGraph,
    path: &[NodeId],
    bottleneck: Capacity,
) -> Result<(), FlowError> {
    let updates = path
        .windows(2)
        .map(|pair| resolve_hop(network, &pair[0], &pair[1], bottleneck))
        .collect::<Result<Vec<_>, _>>()?;
    for HopUpdate { push, cancel } in updates {
        if let Some((edge, amount)) = push {
            network.add_flow(edge, amount);
        }
        if let Some((edge, amount)) = cancel {
            network.cancel_flow(edge, amount);
        }
    }
    residual.rebuild(network);
    Ok(())
}

fn resolve_hop(
    network: &FlowNetwork,
    from: &NodeId,
    to: &NodeId,
    amount: Capacity,
) -> Result<HopUpdate, FlowError> {
    let forward = network.find_edge(from, to);
    let backward = network.find_edge(to, from);
    let pushed = forward
        .and_then(|id| network.edge(id))
        .map(|e| e.residual_capacity().min(amount))
        .unwrap_or_default();
    let remainder = amount - pushed;
    let cancel = match (remainder, backward) {
        (0, _) => None,
        (r, Some(id)) if network.flow(id).unwrap_or_default() >= r => Some((id, r)),
        _ => {
            return Err(FlowError::MissingEdge {
                from: from.clone(),
                to: to.clone(),
            })
        }
    };
    Ok(HopUpdate {
        push: forward.filter(|_| pushed > 0).map(|id| (id, pushed)),
        cancel,
    })
}
