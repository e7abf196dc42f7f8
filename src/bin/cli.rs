use bastion::board::{Board, Color};
use bastion::book::PolyglotBook;
use bastion::moves::attacks::attack_tables;
use bastion::moves::execute::make_move;
use bastion::moves::movegen::parse_move;
use bastion::moves::perft::perft_divide;
use bastion::moves::types::MoveKind;
use bastion::search::eval::evaluate;
use bastion::search::tt::TransTable;
use bastion::search::workers::{DEFAULT_THREADS, SearchInfo, start_search};
use bastion::search::MAX_PLY;
use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const ENGINE_NAME: &str = "Bastion";
const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_HASH_MB: usize = 128;
const BOOK_FILE: &str = "book.bin";
const LOG_FILE: &str = "logs/bastion.log";

/// Sends tracing output to an append-only file so stdout stays a clean UCI
/// channel. The path can be redirected with `BASTION_LOG_FILE` and the
/// filter with `RUST_LOG` (default: this crate at `info`). Returns the
/// appender guard, which `main` keeps alive for the life of the process;
/// `None` means logging could not start (read-only filesystem, bad filter)
/// and the engine simply runs without it.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{EnvFilter, fmt};

    let path = std::env::var("BASTION_LOG_FILE").unwrap_or_else(|_| LOG_FILE.to_string());
    let path = std::path::Path::new(&path);
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(concat!(env!("CARGO_PKG_NAME"), "=info")))
        .ok()?;
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok()?;
    Some(guard)
}

struct Engine {
    board: Board,
    tt: Arc<TransTable>,
    book: Option<Arc<PolyglotBook>>,
    use_book: bool,
    debug: bool,
    active_search: Option<(Arc<SearchInfo>, JoinHandle<()>)>,
}

impl Engine {
    fn new() -> Self {
        let book = match PolyglotBook::load(BOOK_FILE) {
            Ok(book) => {
                println!("info string opening book loaded ({} entries)", book.len());
                Some(Arc::new(book))
            }
            Err(_) => None,
        };
        Engine {
            board: Board::new(),
            tt: Arc::new(TransTable::new(DEFAULT_HASH_MB)),
            book,
            use_book: false,
            debug: false,
            active_search: None,
        }
    }

    /// Joins the running search, flagging it to stop first.
    fn halt_search(&mut self) {
        if let Some((info, handle)) = self.active_search.take() {
            info.request_stop();
            let _ = handle.join();
        }
    }
}

fn main() {
    let _log_guard = init_logging();
    // Warm the one-time tables before the host starts timing us.
    attack_tables();
    bastion::hash::zobrist::zobrist_keys();

    let mut engine = Engine::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens[0] {
            "uci" => {
                println!("id name {} {}", ENGINE_NAME, ENGINE_VERSION);
                println!("id author the {} developers", ENGINE_NAME);
                println!("option name Hash type spin default {} min 1 max 1024", DEFAULT_HASH_MB);
                println!(
                    "option name Book type check default {}",
                    if engine.use_book { "true" } else { "false" }
                );
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                engine.halt_search();
                engine.tt.clear();
                engine.board = Board::new();
            }
            "position" => handle_position(&mut engine, &tokens),
            "go" => handle_go(&mut engine, &tokens),
            "stop" => engine.halt_search(),
            "quit" => {
                engine.halt_search();
                break;
            }
            "setoption" => handle_setoption(&mut engine, &tokens),
            "d" | "display" => print!("{}", engine.board),
            "eval" => println!("Current eval: {}", evaluate(&engine.board)),
            "perft" => handle_perft(&mut engine, &tokens),
            "debug" => match tokens.get(1) {
                Some(&"on") => engine.debug = true,
                Some(&"off") => engine.debug = false,
                _ => println!("info string debug expects 'on' or 'off'"),
            },
            _ => println!("Unknown command: {}", line),
        }
    }
}

fn handle_position(engine: &mut Engine, tokens: &[&str]) {
    engine.halt_search();

    let moves_at = tokens.iter().position(|&t| t == "moves");
    match tokens.get(1) {
        Some(&"startpos") => engine.board = Board::new(),
        Some(&"fen") => {
            let fen_end = moves_at.unwrap_or(tokens.len());
            let fen = tokens[2..fen_end].join(" ");
            if let Err(err) = engine.board.set_fen(&fen) {
                println!("info string bad FEN: {}", err);
                return;
            }
        }
        _ => {
            println!("info string position expects 'startpos' or 'fen'");
            return;
        }
    }

    if let Some(at) = moves_at {
        for text in &tokens[at + 1..] {
            let mv = parse_move(&engine.board, text);
            if mv.is_none() {
                // Unparseable moves are skipped; later moves still apply.
                continue;
            }
            engine.board.push_repetition();
            if !make_move(&mut engine.board, mv, MoveKind::All) {
                engine.board.pop_repetition();
            }
        }
    }
}

fn token_value<T: FromStr>(tokens: &[&str], name: &str) -> Option<T> {
    let at = tokens.iter().position(|&t| t == name)?;
    tokens.get(at + 1)?.parse().ok()
}

/// Carves a per-move budget out of the clock: `timeLeft / movesToGo +
/// increment`, shaved by a 50 ms safety margin. `movetime` short-circuits as
/// a one-move allocation.
fn handle_go(engine: &mut Engine, tokens: &[&str]) {
    engine.halt_search();

    let mut depth: i32 = token_value(tokens, "depth").unwrap_or(-1);
    let mut moves_to_go: i64 = token_value(tokens, "movestogo").unwrap_or(40);
    let mut time_left: i64 = match engine.board.side_to_move {
        Color::White => token_value(tokens, "wtime").unwrap_or(-1),
        Color::Black => token_value(tokens, "btime").unwrap_or(-1),
    };
    let increment: i64 = match engine.board.side_to_move {
        Color::White => token_value(tokens, "winc").unwrap_or(0),
        Color::Black => token_value(tokens, "binc").unwrap_or(0),
    };

    if tokens.contains(&"infinite") {
        depth = MAX_PLY as i32;
        time_left = -1;
    }
    if let Some(movetime) = token_value::<i64>(tokens, "movetime") {
        time_left = movetime;
        moves_to_go = 1;
    }
    if depth == -1 {
        depth = MAX_PLY as i32;
    }

    let start = Instant::now();
    let stop_time = if time_left != -1 {
        let mut budget = time_left / moves_to_go.max(1);
        if budget > 1500 {
            budget -= 50;
        }
        let until_stop = if budget < 1500 && increment > 0 && depth == MAX_PLY as i32 {
            increment - 50
        } else {
            budget + increment
        };
        Some(start + Duration::from_millis(until_stop.max(1) as u64))
    } else {
        None
    };

    if engine.debug && let Some(deadline) = stop_time {
        println!(
            "info string budget {}ms depth {}",
            deadline.duration_since(start).as_millis(),
            depth
        );
    }

    let info = Arc::new(SearchInfo::new(depth, stop_time, DEFAULT_THREADS));
    let book = if engine.use_book { engine.book.clone() } else { None };
    if engine.use_book && engine.book.is_none() {
        println!("info string no opening book available, searching instead");
    }
    let handle = start_search(&engine.board, &engine.tt, &info, book);
    engine.active_search = Some((info, handle));
}

fn handle_setoption(engine: &mut Engine, tokens: &[&str]) {
    let name: Option<String> = token_value(tokens, "name");
    let value: Option<String> = token_value(tokens, "value");
    match (name.as_deref(), value.as_deref()) {
        (Some("Hash"), Some(value)) => match value.parse::<usize>() {
            Ok(mb) => {
                engine.halt_search();
                engine.tt = Arc::new(TransTable::new(mb));
                println!(
                    "info string hash resized, {} entries",
                    engine.tt.entry_count()
                );
            }
            Err(_) => println!("info string Hash expects a size in MB"),
        },
        (Some("Book"), Some(value)) => {
            engine.use_book = value == "true";
            if engine.use_book && engine.book.is_none() {
                println!("info string warning: no book file loaded ({})", BOOK_FILE);
            }
        }
        _ => println!("info string unknown or incomplete option"),
    }
}

fn handle_perft(engine: &mut Engine, tokens: &[&str]) {
    let depth: u32 = match tokens.get(1).and_then(|t| t.parse().ok()) {
        Some(d) => d,
        None => {
            println!("info string perft expects a depth");
            return;
        }
    };
    let start = Instant::now();
    let per_move = perft_divide(&mut engine.board, depth);
    let total: u64 = per_move.iter().map(|(_, n)| n).sum();
    for (mv, nodes) in per_move {
        println!("{}: {}", mv, nodes);
    }
    println!("Total number of moves: {}", total);
    if engine.debug {
        println!("info string perft took {}ms", start.elapsed().as_millis());
    }
}
