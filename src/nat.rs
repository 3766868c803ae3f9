//! NAT reconciliation of an endpoint topology.
//!
//! The kernel rewrites connection addresses as traffic crosses a NAT
//! boundary, so the capture pipeline records endpoints that do not match the
//! flow's logical identities. Two rules recover them, per tracked flow:
//!
//! - destination NAT: replace the observed destination with the NAT reply
//!   source (the endpoint the traffic actually reached);
//! - source NAT: represent the observed source under its original identity
//!   via a provenance clone, and drop the rewritten artifact if nothing else
//!   points through it.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::debug;

use crate::conntrack::{Flow, FlowWalker};
use crate::report::{endpoint_node_id, Topology, COPY_OF};
use crate::telemetry::NatStats;

/// An endpoint that was rewritten by NAT: the private (original) identity
/// and the identity the NAT device assigned. Derived per flow record for
/// diagnostics; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointMapping {
    pub original_ip: IpAddr,
    pub original_port: u16,
    pub rewritten_ip: IpAddr,
    pub rewritten_port: u16,
}

impl EndpointMapping {
    /// Orients a flow record. If the original source survives on the reply
    /// path the rewrite hit the destination side; otherwise the source side.
    pub fn from_flow(flow: &Flow) -> Self {
        let orig = &flow.original;
        let reply = &flow.reply;
        if orig.src == reply.dst && orig.src_port == reply.dst_port {
            Self {
                original_ip: reply.src,
                original_port: reply.src_port,
                rewritten_ip: orig.dst,
                rewritten_port: orig.dst_port,
            }
        } else {
            Self {
                original_ip: orig.src,
                original_port: orig.src_port,
                rewritten_ip: reply.dst,
                rewritten_port: reply.dst_port,
            }
        }
    }
}

impl fmt::Display for EndpointMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} rewritten to {}:{}",
            self.original_ip, self.original_port, self.rewritten_ip, self.rewritten_port
        )
    }
}

/// Per-pass budget for sampled diagnostics. Owned by one `apply_nat` call;
/// there is no process-wide counter.
struct DebugSample {
    remaining: u32,
}

impl DebugSample {
    fn new(budget: u32) -> Self {
        Self { remaining: budget }
    }

    fn take(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }
}

/// Default number of flows per pass for which sampled diagnostics are
/// emitted at debug level.
pub const DEFAULT_DEBUG_SAMPLE: u32 = 5;

/// Rewrites an endpoint topology to deal with NAT'd connections.
pub struct NatMapper<W> {
    walker: W,
    debug_sample: u32,
    stats: Option<Arc<NatStats>>,
}

impl<W: FlowWalker> NatMapper<W> {
    /// Creates a mapper over a record source.
    pub fn new(walker: W) -> Self {
        Self {
            walker,
            debug_sample: DEFAULT_DEBUG_SAMPLE,
            stats: None,
        }
    }

    /// Sets how many flows per pass are logged at debug level (0 disables).
    pub fn with_debug_sample(mut self, budget: u32) -> Self {
        self.debug_sample = budget;
        self
    }

    /// Attaches pass counters. Purely observational; rewriting behaves the
    /// same with or without them.
    pub fn with_stats(mut self, stats: Arc<NatStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Walks every tracked flow once and rewrites `topology` in place.
    ///
    /// Endpoint identifiers are derived with `endpoint_node_id(scope, ...)`,
    /// the same codec the capture pipeline used to insert the nodes. A flow
    /// whose observed endpoint is not (or no longer) in the topology is
    /// skipped; the tracking table routinely leads or lags the capture, and
    /// this pass is best-effort over whatever both currently report.
    ///
    /// One pass per report snapshot. Re-running the destination rule over an
    /// already-corrected topology is a no-op, but the source rule is not
    /// re-runnable once it has deleted an emptied original node, so the pass
    /// as a whole is not idempotent.
    pub fn apply_nat(&self, topology: &mut Topology, scope: &str) {
        let mut sample = DebugSample::new(self.debug_sample);
        self.walker.walk_flows(&mut |flow| {
            self.apply_flow(topology, scope, flow, &mut sample);
        });
    }

    fn apply_flow(
        &self,
        topology: &mut Topology,
        scope: &str,
        flow: &Flow,
        sample: &mut DebugSample,
    ) {
        if let Some(stats) = &self.stats {
            stats.flows_walked.inc();
        }
        if !flow.status.is_natted() {
            return;
        }

        if sample.take() {
            debug!(
                flow_id = flow.id,
                protocol = flow.protocol,
                src_nat = flow.status.src_nat,
                dst_nat = flow.status.dst_nat,
                original = %flow.original,
                reply = %flow.reply,
                mapping = %EndpointMapping::from_flow(flow),
                "NAT flow"
            );
        }

        // The observed node sits at the reply destination: the address the
        // capture saw traffic coming from, post-rewrite.
        let from_id = endpoint_node_id(scope, "", flow.reply.dst, flow.reply.dst_port);

        if flow.status.dst_nat {
            let Some(from_node) = topology.node(&from_id) else {
                self.skip(&from_id, sample);
                return;
            };

            // Replace the destination with the NAT reply source.
            let to_id = endpoint_node_id(scope, "", flow.original.dst, flow.original.dst_port);
            let reply_src_id =
                endpoint_node_id(scope, "", flow.reply.src, flow.reply.src_port);
            if reply_src_id != to_id {
                if sample.take() {
                    debug!(from = %from_id, old = %to_id, new = %reply_src_id,
                        "replacing destination with reply source");
                }
                let mut from_node = from_node.clone();
                from_node.adjacency.remove(&to_id);
                from_node.adjacency.insert(reply_src_id);
                topology.add_node(from_node);
                if let Some(stats) = &self.stats {
                    stats.destinations_rewritten.inc();
                }
            }
        }

        if flow.status.src_nat {
            // Re-derive and re-look-up: the destination rule above may have
            // replaced the node's contents under the same identifier.
            let Some(from_node) = topology.node(&from_id).cloned() else {
                self.skip(&from_id, sample);
                return;
            };

            // Replace the source with the NAT original source, as a copy of
            // the observed node under its pre-NAT identity.
            let orig_src_id =
                endpoint_node_id(scope, "", flow.original.src, flow.original.src_port);
            if orig_src_id == from_id {
                return;
            }
            if sample.take() {
                debug!(from = %from_id, copy = %orig_src_id,
                    "adding copy of source under original identity");
            }
            let copy = from_node
                .clone()
                .with_id(orig_src_id)
                .with_latest(COPY_OF, from_id.clone());
            topology.add_node(copy);
            if let Some(stats) = &self.stats {
                stats.copies_added.inc();
            }

            // The edge this flow established now lives on the copy. Remove
            // it from the observed node, and remove the node itself once no
            // other traffic keeps it alive.
            let to_id = endpoint_node_id(scope, "", flow.reply.src, flow.reply.src_port);
            let mut remaining = from_node;
            remaining.adjacency.remove(&to_id);
            if remaining.adjacency.is_empty() {
                topology.remove_node(&from_id);
                if let Some(stats) = &self.stats {
                    stats.nodes_removed.inc();
                }
            } else {
                topology.add_node(remaining);
            }
        }
    }

    fn skip(&self, from_id: &str, sample: &mut DebugSample) {
        if sample.take() {
            debug!(id = %from_id, "endpoint not in report, skipping flow");
        }
        if let Some(stats) = &self.stats {
            stats.flows_skipped.inc();
        }
    }
}
