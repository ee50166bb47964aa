use crate::environment::{Environment, visited_mask};
use crate::error::{Result, TourError};
use crate::mcts_node::{Expansion, SearchNode};
use crate::tour::Tour;
use ego_tree::{NodeId, Tree};
use tracing::{debug, trace};

/// Default exploration weight of the UCB score.
pub const EXPLORATION_PARAMETER: f64 = std::f64::consts::SQRT_2;
/// Default number of successors taken from each candidate list on expansion.
pub const DEFAULT_EXPANSION_WIDTH: usize = 25;
/// Default number of first steps taken from each candidate list per rollout.
pub const DEFAULT_ROLLOUT_WIDTH: usize = 3;
/// Default cap on the first steps tried per rollout.
pub const DEFAULT_ROLLOUT_LIMIT: usize = 5;

/// Knobs of the tour search tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    /// Weight `c` of the exploration term of the UCB score.
    pub exploration: f64,
    /// Successors taken from each of the pheromone and distance lists when a
    /// node is expanded.
    pub expansion_width: usize,
    /// First steps taken from each list per rollout.
    pub rollout_width: usize,
    /// Cap on the first steps completed per rollout.
    pub rollout_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            exploration: EXPLORATION_PARAMETER,
            expansion_width: DEFAULT_EXPANSION_WIDTH,
            rollout_width: DEFAULT_ROLLOUT_WIDTH,
            rollout_limit: DEFAULT_ROLLOUT_LIMIT,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(TourError::InvalidInput(format!(
                "exploration must be a non-negative finite value, got {}",
                self.exploration
            )));
        }
        for (name, value) in [
            ("expansion width", self.expansion_width),
            ("rollout width", self.rollout_width),
            ("rollout limit", self.rollout_limit),
        ] {
            if value == 0 {
                return Err(TourError::InvalidInput(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// Monte Carlo tree search over partial tours.
///
/// Each node is a partial tour; its children extend it by one location.
/// Rollouts complete a partial tour greedily along the environment's pheromone
/// and distance candidate lists, and the shortest tour found bubbles up to the
/// root. The search only reads the [`Environment`].
pub struct SearchTree<'a> {
    environment: &'a Environment,
    tree: Tree<SearchNode>,
    root_id: NodeId,
    acting_root: NodeId,
    settings: SearchSettings,
    next_action: MctsAction,
}

/// A builder for creating instances of [`SearchTree`].
pub struct SearchTreeBuilder<'a> {
    environment: &'a Environment,
    start: usize,
    settings: SearchSettings,
}

impl<'a> SearchTreeBuilder<'a> {
    /// Creates a new builder that searches tours of `environment` starting at location 1.
    pub fn new(environment: &'a Environment) -> Self {
        Self {
            environment,
            start: 1,
            settings: SearchSettings::default(),
        }
    }

    /// Sets the location every tour starts from.
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.settings.exploration = exploration;
        self
    }

    pub fn with_expansion_width(mut self, width: usize) -> Self {
        self.settings.expansion_width = width;
        self
    }

    pub fn with_rollout_width(mut self, width: usize) -> Self {
        self.settings.rollout_width = width;
        self
    }

    pub fn with_rollout_limit(mut self, limit: usize) -> Self {
        self.settings.rollout_limit = limit;
        self
    }

    /// Builds the [`SearchTree`] with the configured parameters.
    pub fn build(self) -> Result<SearchTree<'a>> {
        self.settings.validate()?;
        self.environment.location(self.start)?;
        Ok(SearchTree::new(self.environment, self.start, self.settings))
    }
}

impl<'a> SearchTree<'a> {
    /// Returns a new builder for [`SearchTree`].
    pub fn builder(environment: &'a Environment) -> SearchTreeBuilder<'a> {
        SearchTreeBuilder::new(environment)
    }

    fn new(environment: &'a Environment, start: usize, settings: SearchSettings) -> Self {
        let tree = Tree::new(SearchNode::extending(&[], start, environment.len()));
        let root_id = tree.root().id();

        Self {
            environment,
            tree,
            root_id,
            acting_root: root_id,
            settings,
            next_action: MctsAction::Selection {
                root: root_id,
                path: vec![],
            },
        }
    }

    /// Returns an immutable reference to the underlying search tree.
    pub fn get_tree(&self) -> &Tree<SearchNode> {
        &self.tree
    }

    /// Returns the next step to be performed. Useful for debugging.
    pub fn get_next_mcts_action(&self) -> &MctsAction {
        &self.next_action
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// The true root, holding the best tour found anywhere in the tree.
    pub fn root(&self) -> &SearchNode {
        self.tree.root().value()
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// The node selection currently starts from.
    pub fn acting_root(&self) -> NodeId {
        self.acting_root
    }

    /// The partial tour committed to so far.
    pub fn committed(&self) -> Result<&[usize]> {
        Ok(&self.node(self.acting_root)?.prefix)
    }

    /// Best complete tour discovered anywhere in the tree.
    pub fn best_tour(&self) -> Option<&Tour> {
        self.root().best_tour.as_ref()
    }

    /// Whether the subtree below the acting root has nothing left to try.
    pub fn is_exhausted(&self) -> bool {
        self.next_action == MctsAction::Exhausted
    }

    pub fn node(&self, id: NodeId) -> Result<&SearchNode> {
        self.tree
            .get(id)
            .map(|node| node.value())
            .ok_or(TourError::UnknownNode)
    }

    /// Ids of the children of `id`, in insertion order.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .tree
            .get(id)
            .ok_or(TourError::UnknownNode)?
            .children()
            .map(|child| child.id())
            .collect())
    }

    fn update<F, T>(&mut self, id: NodeId, f: F) -> Result<T>
    where
        F: FnOnce(&mut SearchNode) -> T,
    {
        let mut node = self.tree.get_mut(id).ok_or(TourError::UnknownNode)?;
        Ok(f(node.value()))
    }

    /// Executes a single step of the search (Selection, Simulation or Backpropagation).
    pub fn execute_action(&mut self) -> Result<()> {
        trace!(action = %self.next_action.get_name(), "search step");
        match std::mem::replace(&mut self.next_action, MctsAction::Exhausted) {
            MctsAction::Selection { root, path: _ } => {
                self.next_action = if self.node(root)?.is_settled {
                    MctsAction::Exhausted
                } else {
                    MctsAction::Simulation {
                        leaf: self.select(root)?,
                    }
                };
            }
            MctsAction::Simulation { leaf } => {
                let tour = self.rollout(leaf)?;
                self.next_action = MctsAction::Backpropagation { leaf, tour };
            }
            MctsAction::Backpropagation { leaf, tour } => {
                let path = self.backpropagate(leaf, &tour)?;
                self.next_action = MctsAction::Selection {
                    root: self.acting_root,
                    path,
                };
            }
            MctsAction::Exhausted => {}
        }
        Ok(())
    }

    /// Performs one full iteration (Selection, Simulation, Backpropagation).
    /// Returns the path of nodes that were updated during backpropagation.
    pub fn do_iteration(&mut self) -> Result<Vec<NodeId>> {
        self.execute_action()?;
        while !matches!(
            self.next_action,
            MctsAction::Selection { .. } | MctsAction::Exhausted
        ) {
            self.execute_action()?;
        }

        match &self.next_action {
            MctsAction::Selection { root: _, path } => Ok(path.clone()),
            _ => Ok(vec![]),
        }
    }

    /// Runs the search for a specified number of iterations.
    pub fn iterate_n_times(&mut self, n: u32) -> Result<()> {
        for _ in 0..n {
            self.do_iteration()?;
            if self.is_exhausted() {
                break;
            }
        }
        Ok(())
    }

    /// Walks down from `from` to the node the next rollout should start at.
    ///
    /// Unexpanded nodes are expanded on the way. A partially expanded node
    /// hands out its next unvisited child. Fully expanded nodes are descended
    /// through by their UCB score. Terminal nodes are returned as they are.
    pub fn select(&mut self, from: NodeId) -> Result<NodeId> {
        let mut current = from;
        loop {
            let (is_terminal, expansion) = {
                let node = self.node(current)?;
                (node.is_terminal, node.expansion)
            };
            if is_terminal {
                return Ok(current);
            }

            match expansion {
                Expansion::Unexpanded => {
                    self.expand(current)?;
                    if self.node(current)?.is_terminal {
                        return Ok(current);
                    }
                }
                Expansion::PartiallyExpanded => {
                    if let Some(child) = self.next_unvisited_child(current)? {
                        return Ok(child);
                    }
                    self.update(current, |node| node.expansion = Expansion::FullyExpanded)?;
                }
                Expansion::FullyExpanded => match self.best_child_by_ucb(current)? {
                    Some(child) => current = child,
                    None => {
                        self.update(current, |node| node.is_settled = true)?;
                        return Ok(current);
                    }
                },
            }
        }
    }

    /// Materializes the children of `id`: the union of its strongest-pheromone
    /// and nearest unvisited successors. Does nothing if the node already has
    /// children or is terminal.
    pub fn expand(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if node.expansion != Expansion::Unexpanded || node.is_terminal {
            return Ok(());
        }

        let environment = self.environment;
        let size = environment.len();
        let from = node.location;
        let prefix = node.prefix.clone();
        let visited = visited_mask(size, &prefix);
        let width = self.settings.expansion_width;

        let mut successors: Vec<usize> = Vec::with_capacity(2 * width);
        let strongest = environment.best_pheromone_trails_from(from)?;
        let nearest = environment.nearest_trails_from(from)?;
        for list in [strongest, nearest] {
            for &candidate in list.iter().filter(|&&id| !visited[id]).take(width) {
                if !successors.contains(&candidate) {
                    successors.push(candidate);
                }
            }
        }
        if successors.is_empty() {
            let error = TourError::NoCandidates { from };
            debug!(%error, "candidate lists exhausted, scanning every location");
            successors.extend(environment.nearest_unvisited(from, &visited)?);
        }

        if successors.is_empty() {
            self.update(id, |node| {
                node.is_terminal = true;
                node.is_settled = true;
            })?;
            return Ok(());
        }

        let mut parent = self.tree.get_mut(id).ok_or(TourError::UnknownNode)?;
        for successor in successors {
            parent.append(SearchNode::extending(&prefix, successor, size));
        }
        parent.value().expansion = Expansion::PartiallyExpanded;
        trace!(depth = prefix.len(), "expanded node");
        Ok(())
    }

    /// Picks the unvisited child to try next by putting the strongest-pheromone
    /// and nearest candidates on the same scale. Falls back to the first
    /// unvisited child when neither list names one.
    fn next_unvisited_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        let parent = self.tree.get(id).ok_or(TourError::UnknownNode)?;
        let from = parent.value().location;
        let unvisited: Vec<(usize, NodeId)> = parent
            .children()
            .filter(|child| !child.value().is_visited())
            .map(|child| (child.value().location, child.id()))
            .collect();
        let Some(&(_, first)) = unvisited.first() else {
            return Ok(None);
        };

        let child_at = |location: usize| {
            unvisited
                .iter()
                .find(|(candidate, _)| *candidate == location)
                .map(|(_, child)| *child)
        };
        let first_listed = |list: &[usize]| {
            list.iter()
                .copied()
                .find(|&location| child_at(location).is_some())
        };
        let by_pheromone = first_listed(self.environment.best_pheromone_trails_from(from)?);
        let by_distance = first_listed(self.environment.nearest_trails_from(from)?);

        let chosen = match (by_pheromone, by_distance) {
            (Some(p), Some(d)) => {
                if self.environment.prefers_pheromone(from, p, d)? {
                    Some(p)
                } else {
                    Some(d)
                }
            }
            (Some(p), None) => Some(p),
            (None, Some(d)) => Some(d),
            (None, None) => None,
        };
        Ok(Some(chosen.and_then(child_at).unwrap_or(first)))
    }

    /// Child of `id` with the lowest UCB score among those not settled.
    ///
    /// The score is `best_length / N - c * sqrt(ln(parent visits) / child visits)`,
    /// so short tours and rarely visited children both pull the score down.
    /// Ties go to the first child in insertion order.
    fn best_child_by_ucb(&self, id: NodeId) -> Result<Option<NodeId>> {
        let parent = self.tree.get(id).ok_or(TourError::UnknownNode)?;
        let parent_visits = parent.value().visits;
        let size = self.environment.len() as f64;

        let mut best: Option<(NodeId, f64)> = None;
        for child in parent.children() {
            let node = child.value();
            if node.is_settled {
                continue;
            }
            let score = self.ucb_value(parent_visits, node.best_length / size, node.visits);
            if best.is_none_or(|(_, lowest)| score < lowest) {
                best = Some((child.id(), score));
            }
        }
        Ok(best.map(|(child, _)| child))
    }

    fn ucb_value(&self, total_visits: u32, mean_edge: f64, node_visits: u32) -> f64 {
        if node_visits == 0 {
            f64::NEG_INFINITY
        } else {
            mean_edge
                - self.settings.exploration
                    * f64::sqrt(f64::ln(total_visits.max(1) as f64) / node_visits as f64)
        }
    }

    /// Completes the partial tour of `id` greedily and returns the shortest of
    /// the resulting tours.
    ///
    /// Several first steps are tried: a few from each candidate list, ordered
    /// by how far they stand out from the average trail. Each is then finished
    /// by following the strongest unvisited trail, or the nearest unvisited
    /// location when no trail is left.
    pub fn rollout(&self, id: NodeId) -> Result<Tour> {
        let node = self.node(id)?;
        let size = self.environment.len();
        if node.prefix.len() >= size {
            return Tour::new(self.environment, node.prefix.clone());
        }

        let from = node.location;
        let visited = visited_mask(size, &node.prefix);
        let width = self.settings.rollout_width;
        let mut first_steps: Vec<usize> = Vec::with_capacity(2 * width);
        for list in [
            self.environment.best_pheromone_trails_from(from)?,
            self.environment.nearest_trails_from(from)?,
        ] {
            for &candidate in list.iter().filter(|&&id| !visited[id]).take(width) {
                if !first_steps.contains(&candidate) {
                    first_steps.push(candidate);
                }
            }
        }
        if first_steps.is_empty() {
            first_steps.extend(self.environment.nearest_unvisited(from, &visited)?);
        }

        let mut ranked = Vec::with_capacity(first_steps.len());
        for step in first_steps {
            ranked.push((step, self.environment.desirability(from, step)?));
        }
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.settings.rollout_limit);

        let mut shortest: Option<Tour> = None;
        for (step, _) in ranked {
            let tour = self.complete_greedily(&node.prefix, &visited, step)?;
            if shortest.as_ref().is_none_or(|best| tour.is_shorter_than(best)) {
                shortest = Some(tour);
            }
        }
        shortest.ok_or(TourError::NoCandidates { from })
    }

    fn complete_greedily(&self, prefix: &[usize], visited: &[bool], step: usize) -> Result<Tour> {
        let mut visited = visited.to_vec();
        let mut ids = Vec::with_capacity(self.environment.len());
        ids.extend_from_slice(prefix);

        let mut current = step;
        visited[current] = true;
        ids.push(current);
        loop {
            let next = match self.environment.strongest_unvisited(current, &visited)? {
                Some(next) => Some(next),
                None => self.environment.nearest_unvisited(current, &visited)?,
            };
            let Some(next) = next else {
                break;
            };
            visited[next] = true;
            ids.push(next);
            current = next;
        }
        Tour::new(self.environment, ids)
    }

    /// Counts a visit on every node from `leaf` up to the true root and keeps
    /// the shorter of each node's best tour and `tour`.
    /// Returns the updated path, leaf first.
    pub fn backpropagate(&mut self, leaf: NodeId, tour: &Tour) -> Result<Vec<NodeId>> {
        let mut branch = vec![leaf];
        let mut current = self.tree.get(leaf).ok_or(TourError::UnknownNode)?;
        while let Some(parent) = current.parent() {
            branch.push(parent.id());
            current = parent;
        }

        for &node_id in &branch {
            let settled = self.is_settled(node_id)?;
            self.update(node_id, |node| {
                node.visits += 1;
                node.record(tour);
                if settled {
                    node.is_settled = true;
                }
            })?;
        }

        Ok(branch)
    }

    fn is_settled(&self, id: NodeId) -> Result<bool> {
        let node = self.tree.get(id).ok_or(TourError::UnknownNode)?;
        let value = node.value();
        if value.is_terminal || value.is_settled {
            return Ok(true);
        }
        Ok(value.expansion == Expansion::FullyExpanded
            && node.has_children()
            && node.children().all(|child| child.value().is_settled))
    }

    /// Commits to the visited child of the acting root with the shortest best
    /// tour and drops its siblings. Returns the committed location, or `None`
    /// when there is nothing to commit to.
    pub fn advance(&mut self) -> Result<Option<usize>> {
        let acting = self.tree.get(self.acting_root).ok_or(TourError::UnknownNode)?;
        if acting.value().is_terminal {
            return Ok(None);
        }

        let mut best: Option<(NodeId, f64)> = None;
        for child in acting.children().filter(|child| child.value().is_visited()) {
            let length = child.value().best_length;
            if best.is_none_or(|(_, shortest)| length < shortest) {
                best = Some((child.id(), length));
            }
        }
        let Some((chosen, _)) = best else {
            return Ok(None);
        };
        let siblings: Vec<NodeId> = acting
            .children()
            .map(|child| child.id())
            .filter(|&child| child != chosen)
            .collect();

        for sibling in siblings {
            if let Some(mut node) = self.tree.get_mut(sibling) {
                node.detach();
            }
        }
        self.acting_root = chosen;
        self.next_action = MctsAction::Selection {
            root: chosen,
            path: vec![],
        };

        let location = self.node(chosen)?.location;
        debug!(location, depth = self.node(chosen)?.depth(), "committed to location");
        Ok(Some(location))
    }
}

/// Represents the stages of one search iteration.
#[derive(Debug, PartialEq, Clone)]
pub enum MctsAction {
    /// **Selection**: start from `root`, expanding and descending until a node
    /// to roll out from is found.
    Selection {
        /// The node selection starts from.
        root: NodeId,
        /// The path of nodes updated during the last backpropagation.
        path: Vec<NodeId>,
    },
    /// **Simulation**: complete the partial tour of `leaf`.
    Simulation {
        /// The node the rollout starts from.
        leaf: NodeId,
    },
    /// **Backpropagation**: update every node from `leaf` up to the root.
    Backpropagation {
        /// The node the rollout started from.
        leaf: NodeId,
        /// The completed tour.
        tour: Tour,
    },
    /// Nothing below the acting root is left to try.
    Exhausted,
}

impl MctsAction {
    /// Returns the name of the current action as a string.
    pub fn get_name(&self) -> String {
        match self {
            MctsAction::Selection { .. } => "Selection".to_string(),
            MctsAction::Simulation { .. } => "Simulation".to_string(),
            MctsAction::Backpropagation { .. } => "Backpropagation".to_string(),
            MctsAction::Exhausted => "Exhausted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn arms() -> Environment {
        let points = [
            (1.0, 1.0),
            (1.0, 2.0),
            (1.0, 3.0),
            (1.0, 4.0),
            (1.0, 5.0),
            (2.0, 1.0),
            (3.0, 1.0),
            (4.0, 1.0),
            (5.0, 1.0),
            (10.0, 10.0),
        ];
        let locations: Vec<Location> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Location::new(i + 1, x, y))
            .collect();
        Environment::build(&locations, 50).unwrap()
    }

    fn triangle() -> Environment {
        let locations = vec![
            Location::new(1, 0.0, 0.0),
            Location::new(2, 3.0, 0.0),
            Location::new(3, 0.0, 4.0),
        ];
        Environment::build(&locations, 10).unwrap()
    }

    #[test]
    fn expand_is_idempotent() {
        // arrange
        let environment = arms();
        let mut search = SearchTree::builder(&environment).build().unwrap();
        let root = search.root_id();

        // act
        search.expand(root).unwrap();
        let first = search.children(root).unwrap();
        search.expand(root).unwrap();
        let second = search.children(root).unwrap();

        // assert
        assert_eq!(first.len(), 9);
        assert_eq!(first, second);
        assert_eq!(search.node(root).unwrap().expansion, Expansion::PartiallyExpanded);
    }

    #[test]
    fn expansion_is_bounded_by_width() {
        let environment = arms();
        let mut search = SearchTree::builder(&environment)
            .with_expansion_width(2)
            .build()
            .unwrap();
        let root = search.root_id();

        search.expand(root).unwrap();

        let children = search.children(root).unwrap();
        assert!(!children.is_empty());
        assert!(children.len() <= 4);
        let locations: Vec<usize> = children
            .iter()
            .map(|&child| search.node(child).unwrap().location)
            .collect();
        assert!(locations.contains(&2));
        assert!(locations.contains(&6));
    }

    #[test]
    fn rollout_completes_the_tour() {
        let environment = arms();
        let search = SearchTree::builder(&environment).build().unwrap();

        let tour = search.rollout(search.root_id()).unwrap();

        let mut ids = tour.ids().to_vec();
        assert_eq!(ids[0], 1);
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn rollout_follows_distance_until_trails_are_reinforced() {
        // arrange
        // Ten evenly spaced points on a line, ids scrambled against position.
        let ids = [7, 3, 9, 1, 5, 10, 2, 8, 4, 6];
        let locations: Vec<Location> = ids
            .iter()
            .enumerate()
            .map(|(x, &id)| Location::new(id, x as f64, 0.0))
            .collect();
        let environment = Environment::build(&locations, 50).unwrap();
        let search = SearchTree::builder(&environment)
            .with_exploration(0.0)
            .build()
            .unwrap();

        // act
        let tour = search.rollout(search.root_id()).unwrap();

        // assert
        assert_eq!(tour.ids()[0], 1);
        assert!((tour.length() - 18.0).abs() < 1e-9, "got {:?}", tour.ids());
    }

    #[test]
    fn backpropagation_only_improves() {
        // arrange
        let environment = arms();
        let mut search = SearchTree::builder(&environment).build().unwrap();
        let root = search.root_id();
        search.expand(root).unwrap();
        let child = search.children(root).unwrap()[0];
        let short = Tour::new(&environment, vec![1, 2, 3, 4, 5, 10, 9, 8, 7, 6]).unwrap();
        let long = Tour::new(&environment, vec![1, 10, 2, 9, 3, 8, 4, 7, 5, 6]).unwrap();

        // act
        let path = search.backpropagate(child, &short).unwrap();
        search.backpropagate(child, &long).unwrap();

        // assert
        assert_eq!(path, vec![child, root]);
        assert_eq!(search.node(child).unwrap().visits, 2);
        assert_eq!(search.root().visits, 2);
        assert!((search.root().best_length - short.length()).abs() < 1e-12);
        assert_eq!(search.best_tour(), Some(&short));
    }

    #[test]
    fn terminal_nodes_select_themselves() {
        let environment = triangle();
        let mut search = SearchTree::builder(&environment).build().unwrap();
        let root = search.root_id();

        // 1 -> x -> y covers all three locations.
        let child = search.select(root).unwrap();
        assert_eq!(search.node(child).unwrap().depth(), 2);
        search.expand(child).unwrap();
        let grandchild = search.children(child).unwrap()[0];

        assert!(search.node(grandchild).unwrap().is_terminal);
        assert_eq!(search.select(grandchild).unwrap(), grandchild);
        let tour = search.rollout(grandchild).unwrap();
        assert!((tour.length() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn small_instance_is_exhausted() {
        let environment = triangle();
        let mut search = SearchTree::builder(&environment).build().unwrap();

        search.iterate_n_times(100).unwrap();

        assert!(search.is_exhausted());
        assert!((search.best_tour().unwrap().length() - 12.0).abs() < 1e-12);
        assert_eq!(search.get_next_mcts_action().get_name(), "Exhausted");
    }

    #[test]
    fn iterations_never_worsen_the_root() {
        let environment = arms();
        let mut search = SearchTree::builder(&environment).build().unwrap();

        let mut previous = f64::INFINITY;
        for _ in 0..60 {
            let path = search.do_iteration().unwrap();
            assert_eq!(path.last(), Some(&search.root_id()));
            let best = search.root().best_length;
            assert!(best <= previous);
            previous = best;
        }
        assert_eq!(search.root().visits, 60);
    }

    #[test]
    fn advance_commits_to_the_best_child() {
        let environment = arms();
        let mut search = SearchTree::builder(&environment).build().unwrap();
        assert_eq!(search.advance().unwrap(), None);

        search.iterate_n_times(20).unwrap();
        let location = search.advance().unwrap().unwrap();

        let acting = search.acting_root();
        assert_ne!(acting, search.root_id());
        assert_eq!(search.committed().unwrap(), &[1, location]);
        assert_eq!(search.children(search.root_id()).unwrap(), vec![acting]);
        assert_eq!(
            search.node(acting).unwrap().best_length,
            search
                .children(search.root_id())
                .unwrap()
                .iter()
                .map(|&child| search.node(child).unwrap().best_length)
                .fold(f64::INFINITY, f64::min)
        );
    }

    #[test]
    fn rejects_bad_settings() {
        let environment = arms();
        assert!(matches!(
            SearchTree::builder(&environment).with_start(11).build(),
            Err(TourError::OutOfRange { id: 11, size: 10 })
        ));
        assert!(matches!(
            SearchTree::builder(&environment).with_rollout_limit(0).build(),
            Err(TourError::InvalidInput(_))
        ));
    }
}
