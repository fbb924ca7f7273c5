//! # Campaign 2048 CLI
//!
//! Command-line session controller: play any mode interactively, or run
//! headless simulations with simple policies.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use campaign_2048_core::achievements::achievement;
use campaign_2048_core::progression::Tier;
use campaign_2048_core::{
    level_spec, CampaignProgress, Direction, Event, GameConfig, GameMode, GameOverReason, PowerUp,
    Session, SessionStep, Status,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-2048")]
#[command(author, version, about = "Play the 2048 campaign in the terminal or run simulations")]
struct Args {
    /// Game mode
    #[arg(short = 'M', long, value_enum, default_value = "campaign")]
    mode: Mode,

    /// Campaign level to start from
    #[arg(short, long, default_value = "1")]
    level: u32,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Simulated time per headless step in milliseconds (0 = clock stopped,
    /// which also keeps the speed-run achievement locked)
    #[arg(long, default_value = "0")]
    tick_ms: u64,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// JSON file with game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file holding campaign progress; read at start, written on exit
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Print the level table and exit
    #[arg(long)]
    list_levels: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Classic,
    TimeAttack,
    Campaign,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random valid moves
    Random,
    /// Cycle through actions: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if args.list_levels {
        let first = args.level.max(1);
        print_level_table(first, first.saturating_add(19));
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let progress = load_progress(args.progress.as_deref())?;
    let mode = match args.mode {
        Mode::Classic => GameMode::Classic,
        Mode::TimeAttack => GameMode::TimeAttack,
        Mode::Campaign => GameMode::Campaign(args.level),
    };
    if let GameMode::Campaign(level) = mode {
        if !progress.is_unlocked(level) {
            warn!(
                "level {} is not unlocked yet (highest unlocked: {})",
                level,
                progress.highest_unlocked()
            );
        }
    }

    let progress = if let Some(episodes) = args.episodes {
        run_headless(&args, mode, config, progress, episodes)?
    } else {
        run_interactive(&args, mode, config, progress)?
    };

    if let Some(path) = &args.progress {
        save_progress(path, &progress)?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

fn load_progress(path: Option<&Path>) -> Result<CampaignProgress> {
    match path {
        Some(path) if path.exists() => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading progress {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing progress {}", path.display()))
        }
        _ => Ok(CampaignProgress::new()),
    }
}

fn save_progress(path: &Path, progress: &CampaignProgress) -> Result<()> {
    let text = serde_json::to_string_pretty(progress)?;
    fs::write(path, text).with_context(|| format!("writing progress {}", path.display()))?;
    info!("saved progress to {}", path.display());
    Ok(())
}

fn print_level_table(first: u32, last: u32) {
    println!("level  target  board  tier    p(4)  time");
    for level in first..=last {
        let spec = level_spec(level);
        let time = spec
            .time_limit
            .map_or_else(|| "-".to_string(), |t| format!("{}s", t.as_secs()));
        println!(
            "{:>5}  {:>6}  {}x{}    {:<6}  {:.2}  {}",
            level,
            spec.target,
            spec.board_size,
            spec.board_size,
            tier_name(spec.tier),
            spec.four_probability,
            time
        );
    }
}

fn tier_name(tier: Tier) -> &'static str {
    match tier {
        Tier::Easy => "easy",
        Tier::Normal => "normal",
        Tier::Hard => "hard",
        Tier::Expert => "expert",
    }
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(
    args: &Args,
    mode: GameMode,
    config: GameConfig,
    progress: CampaignProgress,
) -> Result<CampaignProgress> {
    let mut session = Session::with_progress(mode, config, args.seed, progress)?;

    // Set terminal to raw mode for single-key input
    enable_raw_mode();
    let played = play(&mut session, args.seed);
    disable_raw_mode();
    played?;

    println!("\nGoodbye!");
    Ok(session.into_progress())
}

fn play(session: &mut Session, seed: u64) -> Result<()> {
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    let mut last_tick = Instant::now();
    let mut restarts = 0u64;
    let mut aim = SmashAim::Off;
    redraw(session, None, aim);
    let mut shown = session.state().time_remaining().map(|t| t.as_secs());

    loop {
        // Zero bytes means the poll interval passed without a key.
        let bytes_read = stdin.read(&mut buffer).unwrap_or(0);

        let now = Instant::now();
        let was_active = session.state().status() == Status::Active;
        let tick = session.dispatch(Event::Tick(now - last_tick))?;
        last_tick = now;
        let left = session.state().time_remaining().map(|t| t.as_secs());
        if left != shown || (was_active && tick.outcome.status != Status::Active) {
            redraw(session, Some(&tick), aim);
        }
        shown = left;

        if bytes_read == 0 {
            continue;
        }

        let action = parse_input(&buffer[..bytes_read]);
        let (next_aim, smash) = aim_smash(aim, &action);
        aim = next_aim;
        let event = if let Some(power_up) = smash {
            Event::UsePowerUp(power_up)
        } else {
            match action {
                InputAction::Move(direction) => Event::Move(direction),
                InputAction::Undo => Event::UsePowerUp(PowerUp::Undo),
                InputAction::Shuffle => Event::UsePowerUp(PowerUp::Shuffle),
                InputAction::Smash | InputAction::Digit(_) => {
                    redraw(session, None, aim);
                    continue;
                }
                InputAction::Pause if session.state().is_paused() => Event::Resume,
                InputAction::Pause => Event::Pause,
                InputAction::Restart => {
                    restarts += 1;
                    session.restart(seed.wrapping_add(restarts))?;
                    redraw(session, None, aim);
                    continue;
                }
                InputAction::NextLevel => {
                    if session.advance()? {
                        redraw(session, None, aim);
                    }
                    continue;
                }
                InputAction::Quit => return Ok(()),
                InputAction::None => continue,
            }
        };

        match session.dispatch(event) {
            Ok(step) => redraw(session, Some(&step), aim),
            Err(err) => {
                redraw(session, None, aim);
                println!("  {}", err);
            }
        }
    }
}

/// Progress of picking a cell for the smash power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmashAim {
    Off,
    Row,
    Col(usize),
}

/// Feed one key into the smash prompt. Yields the power-up once a row and a
/// column have been typed; any other key cancels.
fn aim_smash(aim: SmashAim, action: &InputAction) -> (SmashAim, Option<PowerUp>) {
    match (aim, action) {
        (_, InputAction::Smash) => (SmashAim::Row, None),
        (SmashAim::Row, &InputAction::Digit(row)) => (SmashAim::Col(row), None),
        (SmashAim::Col(row), &InputAction::Digit(col)) => {
            (SmashAim::Off, Some(PowerUp::Smash { row, col }))
        }
        _ => (SmashAim::Off, None),
    }
}

fn redraw(session: &Session, step: Option<&SessionStep>, aim: SmashAim) {
    let state = session.state();
    print!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== 2048: {} ===", state.mode());
    println!(
        "Controls: WASD/Arrows | U undo | B smash | X shuffle | P pause | N next | R restart | Q quit\n"
    );
    println!(
        "Score: {}   Moves: {}   Target: {}",
        state.score(),
        state.moves(),
        state.level().target
    );
    if let Some(left) = state.time_remaining() {
        println!("Time left: {}s", left.as_secs());
    }
    let inventory = state.power_ups();
    println!(
        "Power-ups: undo {} | smash {} | shuffle {}",
        inventory.undo, inventory.smash, inventory.shuffle
    );
    print!("{}", state.grid());
    match aim {
        SmashAim::Off => {}
        SmashAim::Row => println!("  Smash: type the row (1-{})", state.grid().size()),
        SmashAim::Col(row) => println!(
            "  Smash: row {}, type the column (1-{})",
            row + 1,
            state.grid().size()
        ),
    }

    if let Some(step) = step {
        if step.outcome.score_delta > 0 {
            println!("  +{} points!", step.outcome.score_delta);
        }
        for id in &step.unlocked {
            let rule = achievement(*id);
            println!("  Achievement unlocked: {} ({})", rule.title, rule.description);
        }
        if let Some(record) = step.record {
            println!("  {}", "*".repeat(usize::from(record.stars)));
        }
    }

    if state.is_paused() {
        println!("\n  -- PAUSED --");
    }
    match state.status() {
        Status::Active => {}
        Status::LevelCompleted => {
            println!("\n  *** LEVEL COMPLETE ***");
            println!("  Press N for the next level or R to replay");
        }
        Status::GameOver(reason) => {
            let why = match reason {
                GameOverReason::NoMoves => "no moves left",
                GameOverReason::TimeUp => "time is up",
            };
            println!("\n  *** GAME OVER ({}) ***", why);
            println!("  Final Score: {}", state.score());
            println!("  Max Tile: {}", state.max_tile());
            println!("\n  Press R to restart or Q to quit");
        }
    }
    let _ = io::stdout().flush();
}

/// Run headless simulation mode.
fn run_headless(
    args: &Args,
    mode: GameMode,
    config: GameConfig,
    mut progress: CampaignProgress,
    episodes: u32,
) -> Result<CampaignProgress> {
    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut completed = 0u32;
    let mut timed_out = 0u32;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut max_tiles: Vec<u32> = Vec::with_capacity(episodes as usize);
    let tick = Duration::from_millis(args.tick_ms);

    // Use a separate RNG for action selection
    let mut action_rng = SimpleRng::new(args.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_seed = args.seed.wrapping_add(episode as u64);
        let mut session = Session::with_progress(mode, config, episode_seed, progress)?;
        let mut steps = 0;
        let mut action_cycle = 0;

        while !session.state().status().is_finished()
            && (args.max_steps == 0 || steps < args.max_steps)
        {
            let legal = session.state().legal_directions();
            let action = match args.policy {
                Policy::Random => select_random_action(legal, &mut action_rng),
                Policy::Cycle => select_cycle_action(legal, &mut action_cycle),
            };
            let Some(direction) = action else {
                break; // No valid actions
            };

            session.dispatch(Event::Move(direction))?;
            if !tick.is_zero() {
                session.dispatch(Event::Tick(tick))?;
            }
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {:?}", episode + 1, steps, direction);
                print!("{}", session.state().grid());
            }
        }

        let state = session.state();
        let score = state.score();
        let max_tile = state.max_tile();
        match state.status() {
            Status::LevelCompleted => completed += 1,
            Status::GameOver(GameOverReason::TimeUp) => timed_out += 1,
            _ => {}
        }

        scores.push(score);
        max_tiles.push(max_tile);
        total_score += score as u64;
        max_tile_overall = max_tile_overall.max(max_tile);

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}, Status={:?}",
                episode + 1,
                score,
                max_tile,
                steps,
                state.status()
            );
        }
        progress = session.into_progress();
    }

    // Compute statistics
    let avg_score = total_score as f64 / episodes.max(1) as f64;
    scores.sort();
    let median_score = match scores.len() {
        0 => 0.0,
        n if n % 2 == 0 => (scores[n / 2 - 1] + scores[n / 2]) as f64 / 2.0,
        n => scores[n / 2] as f64,
    };

    // Count tile distribution
    let mut tile_counts = BTreeMap::new();
    for tile in &max_tiles {
        *tile_counts.entry(*tile).or_insert(0u32) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("mode={}", mode);
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", args.seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().unwrap_or(&0));
    println!("max_score={}", scores.last().unwrap_or(&0));
    println!("max_tile_overall={}", max_tile_overall);
    println!("completed={}", completed);
    println!("timed_out={}", timed_out);
    println!("achievements={}", progress.achievements.unlocked().count());

    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", distribution.join(","));

    Ok(progress)
}

/// Select a random valid action.
fn select_random_action(legal: [bool; 4], rng: &mut SimpleRng) -> Option<Direction> {
    let valid: Vec<Direction> = Direction::all()
        .into_iter()
        .filter(|d| legal[*d as usize])
        .collect();

    if valid.is_empty() {
        None
    } else {
        let idx = (rng.next() as usize) % valid.len();
        Some(valid[idx])
    }
}

/// Select action in a cycle: Left, Down, Right, Up.
fn select_cycle_action(legal: [bool; 4], cycle: &mut usize) -> Option<Direction> {
    let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];

    // Try actions in cycle order, starting from current position
    for _ in 0..4 {
        let direction = order[*cycle % 4];
        *cycle += 1;
        if legal[direction as usize] {
            return Some(direction);
        }
    }

    None
}

/// Simple xorshift RNG for action selection.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

#[derive(Debug, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Undo,
    Smash,
    Shuffle,
    /// Zero-based cell coordinate typed as 1-8.
    Digit(usize),
    Pause,
    Restart,
    NextLevel,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Power-ups and session control
        [b'u'] | [b'U'] => InputAction::Undo,
        [b'b'] | [b'B'] => InputAction::Smash,
        [b'x'] | [b'X'] => InputAction::Shuffle,
        [digit @ b'1'..=b'8'] => InputAction::Digit(usize::from(digit - b'1')),
        [b'p'] | [b'P'] => InputAction::Pause,
        [b'n'] | [b'N'] => InputAction::NextLevel,
        [b'r'] | [b'R'] => InputAction::Restart,
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc

        _ => InputAction::None,
    }
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        // Return from read after 200 ms without a key so the clock can tick.
        termios.c_cc[libc::VMIN] = 0;
        termios.c_cc[libc::VTIME] = 2;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // Without raw mode each key needs Enter
}

#[cfg(not(unix))]
fn disable_raw_mode() {}
