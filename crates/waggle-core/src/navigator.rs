//! Plan-following navigation on top of a [`KnowledgeMap`].
//!
//! A [`Navigator`] holds the agent's map together with the plan it is
//! currently walking. Plans are computed from the map's knowledge and are
//! consumed one step per turn; a step that current knowledge says is a wall
//! is refused and the rest of the plan dropped so the caller replans.

use tracing::{debug, trace};
use waggle_types::{Direction, Position, Surroundings};
use waggle_world::{KnowledgeMap, Plan, WorldError};

/// An agent's map plus the walk it is following.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    map: KnowledgeMap,
    plan: Plan,
}

impl Navigator {
    /// Wrap an existing map with no plan.
    pub fn new(map: KnowledgeMap) -> Self {
        Self {
            map,
            plan: Plan::new(),
        }
    }

    /// The agent's knowledge.
    pub const fn map(&self) -> &KnowledgeMap {
        &self.map
    }

    /// Mutable access to the agent's knowledge, for merges and heuristics.
    pub const fn map_mut(&mut self) -> &mut KnowledgeMap {
        &mut self.map
    }

    /// Current logical position.
    pub const fn position(&self) -> Position {
        self.map.position()
    }

    /// Steps left in the current plan.
    pub fn remaining(&self) -> usize {
        self.plan.len()
    }

    /// Whether any steps remain.
    pub fn has_plan(&self) -> bool {
        !self.plan.is_empty()
    }

    /// Drop the rest of the current plan.
    pub fn discard_plan(&mut self) {
        if !self.plan.is_empty() {
            debug!(dropped = self.plan.len(), "plan discarded");
            self.plan.clear();
        }
    }

    /// Record what the agent sees from its current position.
    pub fn perceive<S: Surroundings + ?Sized>(&mut self, surroundings: &S) {
        self.map.observe(surroundings);
    }

    /// The next planned step, without taking it.
    pub fn peek_step(&self) -> Option<Direction> {
        self.plan.front().copied()
    }

    /// Take the next planned step.
    ///
    /// The move is applied to the map's position before returning. If the
    /// map now knows the step leads into a wall, nothing moves, the plan is
    /// discarded, and `None` is returned.
    pub fn next_step(&mut self) -> Option<Direction> {
        let direction = self.peek_step()?;
        if !self.map.can_move(direction) {
            debug!(%direction, position = %self.map.position(), "planned step blocked");
            self.discard_plan();
            return None;
        }
        self.plan.pop_front();
        self.map.apply_move(direction);
        trace!(%direction, position = %self.map.position(), "stepped");
        Some(direction)
    }

    /// Replace the plan with a route to the current target.
    ///
    /// The target is cleared once consumed. When no route exists the plan is
    /// left empty and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates routing errors from [`KnowledgeMap::route_to_target`].
    pub fn plan_to_target(&mut self) -> Result<usize, WorldError> {
        let result = self.map.route_to_target();
        self.map.clear_target();
        self.install(result)
    }

    /// Replace the plan with a route back to the origin.
    ///
    /// # Errors
    ///
    /// Propagates routing errors from [`KnowledgeMap::route_to_origin`].
    pub fn plan_to_origin(&mut self) -> Result<usize, WorldError> {
        let result = self.map.route_to_origin();
        self.install(result)
    }

    fn install(&mut self, result: Result<Plan, WorldError>) -> Result<usize, WorldError> {
        match result {
            Ok(plan) => {
                self.plan = plan;
                Ok(self.plan.len())
            }
            Err(e) => {
                self.plan.clear();
                Err(e)
            }
        }
    }

    /// Give up the navigator and keep the map.
    pub fn into_map(self) -> KnowledgeMap {
        self.map
    }
}
