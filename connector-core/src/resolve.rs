use crate::data::EntityStore;
use crate::error::{Result, StoreError};
use crate::link::LocationLink;
use crate::sink::LinkSink;
use connector_fetch::{LocationId, Router, RouterId};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Outcome of one resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Links recorded during this pass, in discovery order.
    pub links: Vec<LocationLink>,
    /// Storage failures that were logged and skipped.
    pub errors: Vec<StoreError>,
}

/// Mutable state threaded through a single pass.
#[derive(Default)]
struct WalkContext {
    visited: HashSet<RouterId>,
    /// `(predecessor, current)` hops currently on the walk stack.
    active: HashSet<(RouterId, RouterId)>,
    resolution: Resolution,
}

/// One hop of a chain walk: `current` reached from `predecessor`, with the
/// index of the next entry of `current.router_links` to follow.
struct Frame {
    predecessor: RouterId,
    predecessor_location: LocationId,
    current: Router,
    next: usize,
}

impl WalkContext {
    fn skip(&mut self, what: &str, err: StoreError) {
        error!("{}: {}", what, err);
        self.resolution.errors.push(err);
    }
}

/// Derives location links from router links held in an [`EntityStore`].
///
/// A pair of locations is only linked when a router at one of them lists a
/// router at the other and that router lists it back. Chains of intermediate
/// routers are followed to find such pairs, but reachability alone never
/// produces a link.
pub struct LinkResolver<'a, S, K> {
    store: &'a S,
    sink: K,
}

impl<'a, S: EntityStore, K: LinkSink> LinkResolver<'a, S, K> {
    pub fn new(store: &'a S, sink: K) -> Self {
        Self { store, sink }
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Walk every router in input order and record each newly connected
    /// location pair once.
    ///
    /// Dangling router references are skipped. Storage failures are logged,
    /// collected in [`Resolution::errors`] and never abort the pass.
    pub fn resolve(&mut self, routers: &[Router]) -> Resolution {
        info!("Resolving location links across {} routers", routers.len());
        let mut ctx = WalkContext::default();

        for router in routers {
            if ctx.visited.contains(&router.id) {
                continue;
            }

            for &link_id in &router.router_links {
                if link_id == router.id {
                    continue;
                }

                let linked = match self.store.router(link_id) {
                    Ok(Some(linked)) => linked,
                    Ok(None) => {
                        debug!("Router {} links to unknown router {}", router.id, link_id);
                        continue;
                    }
                    Err(e) => {
                        ctx.skip("get router data", e);
                        continue;
                    }
                };

                self.walk(router, linked, &mut ctx);
            }
        }

        info!(
            "Resolved {} new location links ({} storage errors)",
            ctx.resolution.links.len(),
            ctx.resolution.errors.len()
        );
        ctx.resolution
    }

    /// Follow the chain from `predecessor` through `current` depth first.
    ///
    /// Hops live on an explicit stack so chain length is bounded by memory,
    /// not by the thread stack.
    fn walk(&mut self, predecessor: &Router, current: Router, ctx: &mut WalkContext) {
        let mut stack = Vec::new();
        Self::enter(predecessor.id, predecessor.location_id, current, ctx, &mut stack);

        while let Some(frame) = stack.last_mut() {
            let Some(&link_id) = frame.current.router_links.get(frame.next) else {
                if let Some(done) = stack.pop() {
                    ctx.active.remove(&(done.predecessor, done.current.id));
                }
                continue;
            };
            frame.next += 1;

            if link_id == frame.predecessor {
                ctx.visited.insert(frame.predecessor);
                let (source, destination) = (frame.predecessor_location, frame.current.location_id);
                match self.record_link(source, destination) {
                    Ok(Some(link)) => ctx.resolution.links.push(link),
                    Ok(None) => {}
                    Err(e) => ctx.skip("calculate link", e),
                }
                continue;
            }

            let (current_id, current_location) = (frame.current.id, frame.current.location_id);
            match self.store.router(link_id) {
                Ok(Some(next)) => Self::enter(current_id, current_location, next, ctx, &mut stack),
                Ok(None) => {
                    debug!("Router {} links to unknown router {}", current_id, link_id);
                }
                Err(e) => ctx.skip("get router data", e),
            }
        }
    }

    fn enter(
        predecessor: RouterId,
        predecessor_location: LocationId,
        current: Router,
        ctx: &mut WalkContext,
        stack: &mut Vec<Frame>,
    ) {
        // links are bidirectional, the other endpoint covers the reverse direction
        if ctx.visited.contains(&current.id) {
            return;
        }
        if predecessor_location == current.location_id {
            return;
        }
        if !ctx.active.insert((predecessor, current.id)) {
            return;
        }

        stack.push(Frame {
            predecessor,
            predecessor_location,
            current,
            next: 0,
        });
    }

    /// Record a link between two locations unless the pair is already stored.
    ///
    /// Returns the new link after it has been persisted and reported, `None`
    /// when the pair already exists or either location is unknown.
    pub fn record_link(
        &mut self,
        source_id: LocationId,
        destination_id: LocationId,
    ) -> Result<Option<LocationLink>> {
        let Some(source) = self.store.location(source_id)? else {
            debug!("Unknown source location {}", source_id);
            return Ok(None);
        };
        let Some(destination) = self.store.location(destination_id)? else {
            debug!("Unknown destination location {}", destination_id);
            return Ok(None);
        };

        let link = LocationLink::between(&source, &destination);
        if self.store.link(&link.unique_id)?.is_some() {
            debug!("Link {} already recorded", link.unique_id);
            return Ok(None);
        }

        self.store.put(&link)?;
        self.sink.report(&link);
        Ok(Some(link))
    }
}
