#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_rules::{
    calc_pdf, choose_target, init_logging, random_layout,
    protocol::{GameView, MoveView, RankView, ScoreView},
    ui::{render_player_view, render_primary, render_probability_board},
    BattleshipService, Coordinate, GameError, GameId, InMemoryStore, LogNotifier, Participant,
    PlayerId, ServiceConfig, ServiceError, Side, Transition, STANDARD_FLEET,
};

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play against the computer in the terminal.
    Play {
        #[arg(long, default_value = "player")]
        name: String,
        #[arg(long, help = "Show the targeting probability board each turn")]
        hints: bool,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Run computer-driven games between two named players and print a JSON summary.
    Sim {
        #[arg(long, default_value_t = 1)]
        games: usize,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
type Service = BattleshipService<InMemoryStore, LogNotifier>;

#[cfg(feature = "std")]
fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut config = ServiceConfig::from_env();

    match cli.command {
        Commands::Play { name, hints, seed } => {
            config.seed = seed.or(config.seed);
            let service = BattleshipService::new(InMemoryStore::new(), LogNotifier, config);
            play(&service, name, hints, seed).await?;
        }
        Commands::Sim { games, seed } => {
            config.seed = seed.or(config.seed);
            let service = BattleshipService::new(InMemoryStore::new(), LogNotifier, config);
            sim(&service, games, seed).await?;
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
fn read_target(stdin: &mut impl BufRead) -> anyhow::Result<Option<Coordinate>> {
    loop {
        print!("Target (e.g. B7, q to quit): ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<Coordinate>() {
            Ok(coord) => return Ok(Some(coord)),
            Err(e) => println!("{}", e),
        }
    }
}

#[cfg(feature = "std")]
async fn play(
    service: &Service,
    name: String,
    hints: bool,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut rng = seeded_rng(seed);
    let layout = random_layout(&mut rng, &STANDARD_FLEET)?;
    let game = service
        .create_game(PlayerId::new(name), Participant::Automated, &layout, None)
        .await?;
    let id = game.id();
    println!("Game {} started. Your fleet:", id);
    print!("{}", render_primary(game.primary(Side::Player1), true));

    let mut stdin = io::stdin().lock();
    loop {
        let game = service.get_game(id).await?;
        println!(
            "\n{}",
            render_player_view(game.primary(Side::Player1), game.tracking(Side::Player1))
        );
        if hints {
            let remaining: Vec<usize> = game
                .primary(Side::Player2)
                .kinds_afloat()
                .map(|kind| kind.length())
                .collect();
            let pdf = calc_pdf(game.tracking(Side::Player1), &remaining);
            print!("{}", render_probability_board(&pdf));
        }
        let Some(target) = read_target(&mut stdin)? else {
            service.cancel_game(id).await?;
            println!("Game cancelled.");
            return Ok(());
        };
        let report = match service.make_move(id, Side::Player1, target).await {
            Ok(report) => report,
            Err(ServiceError::Game(e @ GameError::AlreadyTargeted(_))) => {
                println!("{}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        println!("{}", report.message);
        if matches!(report.transition, Transition::Finished { .. }) {
            break;
        }
        let reply = service.automated_move(id).await?;
        println!("{}", reply.message);
        if matches!(reply.transition, Transition::Finished { .. }) {
            break;
        }
    }

    let game = service.get_game(id).await?;
    println!("\n{}", render_player_view(game.primary(Side::Player1), game.tracking(Side::Player1)));
    for score in service.list_scores().await? {
        println!("{}", ScoreView::from(&score).summary);
    }
    Ok(())
}

#[cfg(feature = "std")]
async fn play_out(service: &Service, id: GameId, rng: &mut SmallRng) -> anyhow::Result<GameView> {
    loop {
        let game = service.get_game(id).await?;
        let side = game.current_player();
        let remaining: Vec<usize> = game
            .primary(side.other())
            .kinds_afloat()
            .map(|kind| kind.length())
            .collect();
        let target = choose_target(game.tracking(side), &remaining, rng)
            .ok_or_else(|| anyhow::anyhow!("no cells left to target in game {}", id))?;
        let report = service.make_move(id, side, target).await?;
        log::debug!("{}", MoveView::from(&report).message);
        if matches!(report.transition, Transition::Finished { .. }) {
            return Ok(GameView::from(&service.get_game(id).await?));
        }
    }
}

#[cfg(feature = "std")]
async fn sim(service: &Service, games: usize, seed: Option<u64>) -> anyhow::Result<()> {
    let mut rng = seeded_rng(seed.map(|s| s.wrapping_add(1)));
    let players = [PlayerId::new("alpha"), PlayerId::new("bravo")];
    let mut results = Vec::with_capacity(games);
    for i in 0..games {
        let (first, second) = (&players[i % 2], &players[(i + 1) % 2]);
        let layout1 = random_layout(&mut rng, &STANDARD_FLEET)?;
        let layout2 = random_layout(&mut rng, &STANDARD_FLEET)?;
        let game = service
            .create_game(
                first.clone(),
                Participant::Human(second.clone()),
                &layout1,
                Some(&layout2),
            )
            .await?;
        results.push(play_out(service, game.id(), &mut rng).await?);
    }

    let rankings: Vec<RankView> = service.rankings().await?.iter().map(RankView::from).collect();
    let top: Vec<ScoreView> = service
        .top_scores(games.max(1) as i64)
        .await?
        .iter()
        .map(ScoreView::from)
        .collect();
    let summary = serde_json::json!({
        "games": results,
        "rankings": rankings,
        "top_scores": top,
    });
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
