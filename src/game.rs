use crate::grid::{all_cells, BoundaryPolicy, Cell, Direction};
use log::{debug, info};
use rand::{seq::IteratorRandom, Rng};
use std::collections::{HashSet, VecDeque};

/// Immutable parameters of a game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rules {
    pub grid_size: u16,
    pub boundary: BoundaryPolicy,
    pub start_direction: Direction,
}

impl Default for Rules {
    fn default() -> Self {
        Rules::new(20, BoundaryPolicy::Wrap)
    }
}

impl Rules {
    pub fn new(grid_size: u16, boundary: BoundaryPolicy) -> Self {
        Rules {
            grid_size,
            boundary,
            start_direction: Direction::Right,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size as usize * self.grid_size as usize
    }

    pub fn start_cell(&self) -> Cell {
        Cell::new(self.grid_size / 2, self.grid_size / 2)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Running,
    GameOver,
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Halted,             // Not running, nothing happened
    Moved,              // Normal movement
    Ate(u32),           // Ate food, with the new score
    Collision(Collision),
    Won,                // Snake fills the grid
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Snake,
    Food,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameState {
    snake: VecDeque<Cell>, // head first
    direction: Direction,
    queued_direction: Direction,
    food: Option<Cell>,
    score: u32,
    status: Status,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, rules: &Rules, rng: &mut impl Rng) {
        self.snake.clear();
        self.snake.push_back(rules.start_cell());
        self.direction = rules.start_direction;
        self.queued_direction = rules.start_direction;
        self.score = 0;
        self.food = spawn_food(&self.snake, rules.grid_size, rng);
        self.status = Status::Running;

        info!(
            "Game started on {0}x{0} grid ({1} boundary), food at {2:?}",
            rules.grid_size, rules.boundary, self.food
        );
    }

    /// Buffers `direction` for the next tick. Returns whether it was accepted.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.status != Status::Running || direction == self.direction.opposite() {
            return false;
        }
        self.queued_direction = direction;
        true
    }

    pub fn tick(&mut self, rules: &Rules, rng: &mut impl Rng) -> StepResult {
        if self.status != Status::Running {
            return StepResult::Halted;
        }
        let Some(head) = self.head() else {
            return StepResult::Halted;
        };

        self.direction = self.queued_direction;

        let Some(new_head) = head.step(self.direction, rules.grid_size, rules.boundary) else {
            return self.collide(Collision::Wall);
        };
        if self.snake.contains(&new_head) {
            return self.collide(Collision::Body);
        }

        self.snake.push_front(new_head);

        if self.food != Some(new_head) {
            self.snake.pop_back();
            return StepResult::Moved;
        }

        self.score += 1;
        if self.snake.len() >= rules.cell_count() {
            self.food = None;
            self.status = Status::Won;
            info!("Snake fills the grid, won with score {}", self.score);
            return StepResult::Won;
        }

        self.food = spawn_food(&self.snake, rules.grid_size, rng);
        debug!("Score {}, new food at {:?}", self.score, self.food);
        StepResult::Ate(self.score)
    }

    fn collide(&mut self, collision: Collision) -> StepResult {
        self.status = Status::GameOver;
        info!(
            "Game over: {:?} collision at length {}, score {}",
            collision,
            self.len(),
            self.score
        );
        StepResult::Collision(collision)
    }

    /// One entry per grid cell, row-major.
    pub fn cells(&self, rules: &Rules) -> Vec<CellState> {
        let mut cells = vec![CellState::Empty; rules.cell_count()];
        for cell in &self.snake {
            cells[cell.index(rules.grid_size)] = CellState::Snake;
        }
        if let Some(food) = self.food {
            cells[food.index(rules.grid_size)] = CellState::Food;
        }
        cells
    }

    pub fn snake(&self) -> &VecDeque<Cell> {
        &self.snake
    }

    pub fn head(&self) -> Option<Cell> {
        self.snake.front().copied()
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    pub fn is_won(&self) -> bool {
        self.status == Status::Won
    }
}

/// Picks a free cell uniformly at random, or `None` when the snake covers the grid.
pub fn spawn_food(snake: &VecDeque<Cell>, grid_size: u16, rng: &mut impl Rng) -> Option<Cell> {
    let cell_count = grid_size as usize * grid_size as usize;
    if snake.len() >= cell_count {
        return None;
    }

    // Rejection sampling only while at least half the grid is free
    if snake.len() * 2 < cell_count {
        loop {
            let cell = Cell {
                x: rng.gen_range(0..grid_size),
                y: rng.gen_range(0..grid_size),
            };
            if !snake.contains(&cell) {
                return Some(cell);
            }
        }
    }

    let occupied: HashSet<Cell> = snake.iter().copied().collect();
    all_cells(grid_size)
        .filter(|cell| !occupied.contains(cell))
        .choose(rng)
}

#[cfg(test)]
impl GameState {
    /// A running game with the given body (head first) and heading.
    pub(crate) fn running_with(snake: &[Cell], direction: Direction, food: Option<Cell>) -> Self {
        GameState {
            snake: snake.iter().copied().collect(),
            direction,
            queued_direction: direction,
            food,
            score: 0,
            status: Status::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_start_resets_state() {
        let rules = Rules::new(10, BoundaryPolicy::Wrap);
        let mut state = GameState::new();
        assert_eq!(state.status(), Status::Idle);

        state.start(&rules, &mut rng());

        assert!(state.is_running());
        assert!(!state.is_game_over());
        assert_eq!(state.score(), 0);
        assert_eq!(state.len(), 1);
        assert_eq!(state.head(), Some(Cell::new(5, 5)));
        assert_eq!(state.direction(), Direction::Right);

        let food = state.food().expect("food spawned");
        assert_ne!(Some(food), state.head());
    }

    #[test]
    fn test_start_twice_is_idempotent() {
        let rules = Rules::new(8, BoundaryPolicy::Collide);
        let mut rng = rng();
        let mut state = GameState::new();

        state.start(&rules, &mut rng);
        let first = state.clone();
        state.tick(&rules, &mut rng);
        state.start(&rules, &mut rng);

        assert_eq!(state.snake(), first.snake());
        assert_eq!(state.direction(), first.direction());
        assert_eq!(state.score(), first.score());
        assert_eq!(state.status(), first.status());
    }

    #[test]
    fn test_start_after_game_over() {
        let rules = Rules::new(5, BoundaryPolicy::Collide);
        let mut state = GameState::running_with(&[Cell::new(4, 0)], Direction::Right, None);
        state.tick(&rules, &mut rng());
        assert!(state.is_game_over());

        state.start(&rules, &mut rng());
        assert!(state.is_running());
        assert_eq!(state.head(), Some(Cell::new(2, 2)));
    }

    #[test]
    fn test_eats_food_two_ticks_away() {
        let rules = Rules::new(5, BoundaryPolicy::Wrap);
        let mut rng = rng();
        let mut state =
            GameState::running_with(&[Cell::new(2, 2)], Direction::Right, Some(Cell::new(4, 2)));

        assert_eq!(state.tick(&rules, &mut rng), StepResult::Moved);
        assert_eq!(state.tick(&rules, &mut rng), StepResult::Ate(1));

        assert_eq!(state.head(), Some(Cell::new(4, 2)));
        assert_eq!(state.score(), 1);
        assert_eq!(state.len(), 2);
        assert_eq!(state.snake()[1], Cell::new(3, 2));
    }

    #[test]
    fn test_self_collision_leaves_snake_unchanged() {
        let rules = Rules::new(10, BoundaryPolicy::Wrap);
        // Heading left straight into the second segment
        let body = [Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
        let mut state = GameState::running_with(&body, Direction::Left, None);

        let result = state.tick(&rules, &mut rng());

        assert_eq!(result, StepResult::Collision(Collision::Body));
        assert!(state.is_game_over());
        assert!(!state.is_running());
        assert_eq!(state.snake().iter().copied().collect::<Vec<_>>(), body);
    }

    #[test]
    fn test_tail_counts_as_body() {
        let rules = Rules::new(10, BoundaryPolicy::Wrap);
        // 2x2 loop: head at (1,0) moving down onto the tail at (1,1)
        let body = [Cell::new(1, 0), Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 1)];
        let mut state = GameState::running_with(&body, Direction::Down, None);

        assert_eq!(
            state.tick(&rules, &mut rng()),
            StepResult::Collision(Collision::Body)
        );
    }

    #[test]
    fn test_wall_collision() {
        let rules = Rules::new(5, BoundaryPolicy::Collide);

        for (cell, dir) in [
            (Cell::new(0, 2), Direction::Left),
            (Cell::new(4, 2), Direction::Right),
            (Cell::new(2, 0), Direction::Up),
            (Cell::new(2, 4), Direction::Down),
        ] {
            let mut state = GameState::running_with(&[cell], dir, None);
            assert_eq!(
                state.tick(&rules, &mut rng()),
                StepResult::Collision(Collision::Wall)
            );
            assert!(state.is_game_over());
            assert_eq!(state.head(), Some(cell));
        }
    }

    #[test]
    fn test_wrap_through_edge() {
        let rules = Rules::new(5, BoundaryPolicy::Wrap);
        let mut state = GameState::running_with(&[Cell::new(0, 2)], Direction::Left, None);

        assert_eq!(state.tick(&rules, &mut rng()), StepResult::Moved);
        assert_eq!(state.head(), Some(Cell::new(4, 2)));
    }

    #[test]
    fn test_ticks_after_game_over_do_nothing() {
        let rules = Rules::new(5, BoundaryPolicy::Collide);
        let mut state = GameState::running_with(&[Cell::new(4, 4)], Direction::Down, None);
        state.tick(&rules, &mut rng());
        let frozen = state.clone();

        assert_eq!(state.tick(&rules, &mut rng()), StepResult::Halted);
        assert_eq!(state, frozen);
    }

    #[test]
    fn test_idle_tick_is_halted() {
        let mut state = GameState::new();
        assert_eq!(state.tick(&Rules::default(), &mut rng()), StepResult::Halted);
        assert_eq!(state.status(), Status::Idle);
    }

    #[test]
    fn test_change_direction() {
        let rules = Rules::new(10, BoundaryPolicy::Wrap);
        let mut state = GameState::new();

        // Ignored while idle
        assert!(!state.set_direction(Direction::Up));

        state.start(&rules, &mut rng());
        assert!(state.set_direction(Direction::Up));

        // Can't reverse the applied direction
        assert!(!state.set_direction(Direction::Left));
        state.tick(&rules, &mut rng());
        assert_eq!(state.direction(), Direction::Up);
        assert!(!state.set_direction(Direction::Down));
    }

    #[test]
    fn test_latest_direction_wins() {
        let rules = Rules::new(10, BoundaryPolicy::Wrap);
        let mut state = GameState::running_with(&[Cell::new(5, 5), Cell::new(4, 5)], Direction::Right, None);

        assert!(state.set_direction(Direction::Up));
        assert!(state.set_direction(Direction::Down));
        state.tick(&rules, &mut rng());

        assert_eq!(state.direction(), Direction::Down);
        assert_eq!(state.head(), Some(Cell::new(5, 6)));
    }

    #[test]
    fn test_quick_turns_cannot_reverse() {
        let rules = Rules::new(10, BoundaryPolicy::Wrap);
        let body = [Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
        let mut state = GameState::running_with(&body, Direction::Right, None);

        // Up then Left within one tick: Left is checked against the applied Right
        assert!(state.set_direction(Direction::Up));
        assert!(!state.set_direction(Direction::Left));
        assert_eq!(state.tick(&rules, &mut rng()), StepResult::Moved);
        assert_eq!(state.head(), Some(Cell::new(5, 4)));
    }

    #[test]
    fn test_win_fills_grid() {
        let rules = Rules::new(2, BoundaryPolicy::Collide);
        let body = [Cell::new(0, 1), Cell::new(0, 0), Cell::new(1, 0)];
        let mut state = GameState::running_with(&body, Direction::Right, Some(Cell::new(1, 1)));

        assert_eq!(state.tick(&rules, &mut rng()), StepResult::Won);
        assert!(state.is_won());
        assert!(!state.is_running());
        assert!(!state.is_game_over());
        assert_eq!(state.len(), rules.cell_count());
        assert_eq!(state.food(), None);
    }

    #[test]
    fn test_length_changes_at_most_one_per_tick() {
        let rules = Rules::new(6, BoundaryPolicy::Wrap);
        let mut rng = rng();
        let mut state = GameState::new();
        state.start(&rules, &mut rng);

        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
        for i in 0..500 {
            if i % 3 == 0 {
                state.set_direction(turns[(i / 3) % turns.len()]);
            }
            let before = state.len();
            state.tick(&rules, &mut rng);
            let after = state.len();
            assert!(after >= before);
            assert!(after - before <= 1);

            if let Some(food) = state.food() {
                assert!(!state.snake().contains(&food));
            }
            if !state.is_running() {
                state.start(&rules, &mut rng);
            }
        }
    }

    #[test]
    fn test_spawn_food_avoids_snake() {
        let mut rng = rng();

        // Dense snake forces the free-cell enumeration path
        let snake: VecDeque<Cell> = all_cells(4).filter(|c| *c != Cell::new(2, 3)).collect();
        for _ in 0..20 {
            assert_eq!(spawn_food(&snake, 4, &mut rng), Some(Cell::new(2, 3)));
        }

        let snake = VecDeque::from([Cell::new(1, 1), Cell::new(1, 2)]);
        for _ in 0..100 {
            let food = spawn_food(&snake, 4, &mut rng).expect("free cells remain");
            assert!(!snake.contains(&food));
            assert!(food.x < 4 && food.y < 4);
        }

        let full: VecDeque<Cell> = all_cells(3).collect();
        assert_eq!(spawn_food(&full, 3, &mut rng), None);
    }

    #[test]
    fn test_cells_render_states() {
        let rules = Rules::new(3, BoundaryPolicy::Wrap);
        let state = GameState::running_with(
            &[Cell::new(1, 1), Cell::new(0, 1)],
            Direction::Right,
            Some(Cell::new(2, 0)),
        );

        let cells = state.cells(&rules);

        assert_eq!(cells.len(), 9);
        assert_eq!(cells[4], CellState::Snake);
        assert_eq!(cells[3], CellState::Snake);
        assert_eq!(cells[2], CellState::Food);
        assert_eq!(cells.iter().filter(|c| **c == CellState::Empty).count(), 6);
    }
}
