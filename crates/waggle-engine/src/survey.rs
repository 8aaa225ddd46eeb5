//! Multi-scout survey of a [`Terrain`].
//!
//! Every scout starts on the origin with a blank map. Each turn, in order:
//!
//! 1. every scout perceives its surroundings and takes at most one step,
//! 2. scouts sharing a cell swap snapshots and drop their plans so the next
//!    turn is planned on the merged knowledge.
//!
//! A scout first walks a few dispersal steps in its own preferred
//! direction, then repeatedly routes to the nearest frontier. Once it has no
//! frontier left it walks home. The survey ends when every scout is home
//! with nothing left to explore, or when the turn limit is hit.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use waggle_core::config::SurveyConfig;
use waggle_core::exchange::{self, TargetDisclosure};
use waggle_core::Navigator;
use waggle_types::{CANONICAL_ORDER, Direction};
use waggle_world::{GridCoord, KnowledgeMap};

use crate::error::EngineError;
use crate::terrain::Terrain;

/// Steps a scout walks by preferred heading before it starts routing.
const DISPERSAL_STEPS: u32 = 3;

/// Outcome of a survey run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyReport {
    /// Turns played.
    pub turns: u32,
    /// Whether every scout finished before the turn limit.
    pub completed: bool,
    /// Number of scouts.
    pub scouts: usize,
    /// Steps taken across all scouts.
    pub moves: u64,
    /// Snapshots merged across all scouts.
    pub exchanges: u64,
    /// Cells known by the union of every scout's map.
    pub known_cells: usize,
    /// Food known by the union of every scout's map.
    pub food_known: u64,
    /// Food actually on the terrain.
    pub food_total: u64,
}

#[derive(Debug)]
struct Scout {
    id: usize,
    nav: Navigator,
    heading: usize,
    last_step: Option<Direction>,
    dispersal_left: u32,
    exhausted: bool,
}

impl Scout {
    fn new(id: usize, map: KnowledgeMap) -> Self {
        Self {
            id,
            nav: Navigator::new(map),
            heading: id,
            last_step: None,
            dispersal_left: DISPERSAL_STEPS,
            exhausted: false,
        }
    }

    /// Finished exploring and back on the origin.
    fn is_done(&self) -> bool {
        self.exhausted && !self.nav.has_plan() && self.nav.map().on_origin_cell()
    }

    /// Perceive, choose, and take at most one step. Returns whether it moved.
    fn take_turn(&mut self, terrain: &Terrain) -> bool {
        self.nav.perceive(&terrain.view(self.nav.position()));

        if self.dispersal_left > 0 {
            self.dispersal_left = self.dispersal_left.saturating_sub(1);
            if let Some(direction) = self.dispersal_step() {
                return self.walk_unplanned(direction, terrain);
            }
        }

        if !self.nav.has_plan() {
            self.choose_plan();
        }

        let Some(direction) = self.nav.peek_step() else {
            return false;
        };
        if !terrain.is_open(self.nav.position().step(direction)) {
            warn!(scout = self.id, %direction, "planned step hit unseen wall");
            self.nav.discard_plan();
            return false;
        }
        match self.nav.next_step() {
            Some(step) => {
                self.last_step = Some(step);
                true
            }
            None => false,
        }
    }

    /// First open direction from the preferred heading, never straight back.
    fn dispersal_step(&self) -> Option<Direction> {
        let back = self.last_step.map(Direction::opposite);
        CANONICAL_ORDER
            .iter()
            .cycle()
            .skip(self.heading)
            .take(CANONICAL_ORDER.len())
            .copied()
            .find(|&d| Some(d) != back && self.nav.map().can_move(d))
    }

    fn walk_unplanned(&mut self, direction: Direction, terrain: &Terrain) -> bool {
        if !terrain.is_open(self.nav.position().step(direction)) {
            return false;
        }
        self.nav.map_mut().apply_move(direction);
        self.last_step = Some(direction);
        true
    }

    fn choose_plan(&mut self) {
        if self.nav.map_mut().suggest_scout().is_some() {
            self.exhausted = false;
            if let Err(e) = self.nav.plan_to_target() {
                warn!(scout = self.id, error = %e, "frontier unroutable");
            }
            return;
        }

        if !self.exhausted {
            info!(
                scout = self.id,
                known = self.nav.map().known_cells(),
                "no frontier left, heading home"
            );
            self.exhausted = true;
        }
        if self.nav.map().on_origin_cell() {
            return;
        }
        if let Err(e) = self.nav.plan_to_origin() {
            warn!(scout = self.id, error = %e, "no known way home");
        }
    }
}

/// A set of scouts surveying one terrain.
#[derive(Debug)]
pub struct Survey<'a> {
    terrain: &'a Terrain,
    scouts: Vec<Scout>,
    max_turns: u32,
}

impl<'a> Survey<'a> {
    /// Release `config.agents` scouts at the origin of `terrain`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] if the terrain size is not a valid
    /// grid size.
    pub fn new(terrain: &'a Terrain, config: &SurveyConfig) -> Result<Self, EngineError> {
        let count = usize::try_from(config.agents).unwrap_or(usize::MAX);
        let scouts = (0..count)
            .map(|id| KnowledgeMap::with_size(terrain.size()).map(|map| Scout::new(id, map)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            terrain,
            scouts,
            max_turns: config.max_turns,
        })
    }

    /// Play turns until every scout is done or the turn limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Exchange`] if a snapshot exchange fails, or
    /// [`EngineError::World`] if the final knowledge union cannot be built.
    pub fn run(mut self) -> Result<SurveyReport, EngineError> {
        let mut turns: u32 = 0;
        let mut moves: u64 = 0;
        let mut exchanges: u64 = 0;

        while turns < self.max_turns && !self.all_done() {
            for scout in &mut self.scouts {
                if scout.take_turn(self.terrain) {
                    moves = moves.saturating_add(1);
                }
            }
            exchanges = exchanges.saturating_add(self.exchange_at_shared_cells()?);
            turns = turns.saturating_add(1);
        }

        let completed = self.all_done();
        if !completed {
            warn!(turns, "turn limit reached before the survey finished");
        }

        let union = self.union()?;
        let food_known = union
            .grid()
            .iter()
            .filter_map(|(_, k)| k.food())
            .map(u64::from)
            .sum();

        Ok(SurveyReport {
            turns,
            completed,
            scouts: self.scouts.len(),
            moves,
            exchanges,
            known_cells: union.known_cells(),
            food_known,
            food_total: self.terrain.total_food(),
        })
    }

    fn all_done(&self) -> bool {
        self.scouts.iter().all(Scout::is_done)
    }

    /// Swap snapshots among scouts on the same cell. Returns merges done.
    fn exchange_at_shared_cells(&mut self) -> Result<u64, EngineError> {
        let mut by_cell: BTreeMap<GridCoord, Vec<usize>> = BTreeMap::new();
        for (index, scout) in self.scouts.iter().enumerate() {
            let coord = scout.nav.map().grid().coord_of(scout.nav.position());
            by_cell.entry(coord).or_default().push(index);
        }

        let mut merges: u64 = 0;
        for (coord, group) in by_cell.into_iter().filter(|(_, g)| g.len() > 1) {
            let mut outgoing = Vec::with_capacity(group.len());
            for &index in &group {
                if let Some(scout) = self.scouts.get_mut(index) {
                    let bytes = exchange::outgoing(scout.nav.map_mut(), TargetDisclosure::Withhold)?;
                    outgoing.push((index, bytes));
                }
            }
            for &index in &group {
                let Some(scout) = self.scouts.get_mut(index) else {
                    continue;
                };
                for (sender, bytes) in &outgoing {
                    if *sender != index {
                        exchange::incoming(scout.nav.map_mut(), bytes)?;
                        merges = merges.saturating_add(1);
                    }
                }
                scout.nav.discard_plan();
            }
            debug!(%coord, scouts = group.len(), "snapshots exchanged");
        }
        Ok(merges)
    }

    fn union(&self) -> Result<KnowledgeMap, EngineError> {
        let mut union = KnowledgeMap::with_size(self.terrain.size())?;
        for scout in &self.scouts {
            union.merge(scout.nav.map())?;
        }
        Ok(union)
    }
}
