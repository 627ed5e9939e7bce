//! Interactive shell for the piece-supply simulator.
//!
//! Deliberately thin: it collects one command, dispatches exactly one core
//! operation, prints the outcome and re-renders the full state. The only
//! validation here is syntactic (is this a number, is this a known piece
//! letter) with a re-prompt on bad input; range and capacity checks live in
//! tetra-core and come back as status messages.
//!
//! Usage: tetra [--seed N]

use std::env;
use std::io::{self, BufRead, Write};

use tetra_core::{PieceKind, Supply};

fn main() {
    let args: Vec<String> = env::args().collect();
    let seed = match parse_seed(&args) {
        Ok(seed) => seed,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Usage: tetra [--seed N]");
            std::process::exit(2);
        }
    };

    let mut supply = match seed {
        Some(s) => Supply::with_seed(s),
        None => Supply::new(),
    };

    println!("Tetra Stack: upcoming piece supply");
    println!("==================================");
    if let Some(s) = seed {
        println!("Piece stream seed: {s}");
    }

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();

    loop {
        render(&supply);
        print_menu();
        let Some(line) = read_line(&mut input) else {
            break;
        };
        let choice = match line.trim().parse::<u32>() {
            Ok(n) => n,
            Err(_) => {
                println!("\nInvalid option. Enter a number from the menu.");
                continue;
            }
        };
        if dispatch(choice, &mut supply, &mut input) {
            break;
        }
    }

    println!("\nLeaving the piece supply.");
}

/// Hand-parsed `--seed N`. Returns `Ok(None)` when the flag is absent.
fn parse_seed(args: &[String]) -> Result<Option<u64>, String> {
    let Some(i) = args.iter().position(|a| a == "--seed") else {
        return Ok(None);
    };
    let Some(value) = args.get(i + 1) else {
        return Err("--seed needs a value".to_string());
    };
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| format!("bad seed {value:?}: expected a non-negative integer"))
}

/// Run one command. Returns true when the session should end.
fn dispatch<I>(choice: u32, supply: &mut Supply, input: &mut I) -> bool
where
    I: Iterator<Item = io::Result<String>>,
{
    println!();
    match choice {
        1 => match supply.play() {
            Ok(piece) => println!("[PLAY] {piece} left the front of the queue."),
            Err(err) => println!("ERROR: {err}."),
        },
        2 => match supply.insert_random() {
            Ok(piece) => println!("[INSERT] {piece} joined the back of the queue."),
            Err(err) => println!("ERROR: {err}."),
        },
        3 => {
            let Some(kind) = prompt_kind(input) else {
                return true;
            };
            match supply.insert_kind(kind) {
                Ok(piece) => println!("[INSERT] {piece} joined the back of the queue."),
                Err(err) => println!("ERROR: {err}."),
            }
        }
        4 => {
            let Some((pos1, pos2)) = prompt_position_pair(input, supply.queue_len()) else {
                return true;
            };
            match supply.swap(pos1, pos2) {
                Ok((a, b)) => println!("[SWAP] {a} and {b} traded places ({pos1} <-> {pos2})."),
                Err(err) => println!("ERROR: {err}."),
            }
        }
        5 => {
            let Some(pos) = prompt_position(input, supply.queue_len()) else {
                return true;
            };
            match supply.remove_at(pos) {
                Ok(piece) => println!("[REMOVE] {piece} removed from position {pos}."),
                Err(err) => println!("ERROR: {err}."),
            }
        }
        6 => match supply.reserve() {
            Ok(piece) => println!("[RESERVE] {piece} parked on the reservation stack."),
            Err(err) => println!("ERROR: {err}."),
        },
        7 => match supply.use_reserved() {
            Ok(piece) => println!("[USE] {piece} returned to the back of the queue."),
            Err(err) => println!("ERROR: {err}."),
        },
        8 => match supply.undo() {
            Ok(piece) => println!("[UNDO] {piece} is back at the front of the queue."),
            Err(err) => println!("ERROR: {err}."),
        },
        9 => match supply.invert() {
            Ok(outcome) if outcome.is_noop() => {
                println!("Nothing to invert: queue and reservation stack are both empty.");
            }
            Ok(outcome) => println!(
                "[INVERT] queue and reservation stack swapped contents \
                 (queue now holds {}, stack {}).",
                outcome.queue_len, outcome.stack_len
            ),
            Err(err) => println!("ERROR: {err}."),
        },
        0 => return true,
        _ => println!("Unknown option. Try again."),
    }
    false
}

fn render(supply: &Supply) {
    println!();
    println!(
        "--- UPCOMING PIECES ({}/{}) ---",
        supply.queue_len(),
        supply.queue_capacity()
    );
    if supply.queue_len() == 0 {
        println!("(queue empty)");
    } else {
        let line: Vec<String> = supply.queue_pieces().map(|p| p.to_string()).collect();
        println!("[FRONT] -> {} <- [BACK]", line.join(" -> "));
    }

    println!(
        "--- RESERVATION STACK ({}/{}, top first) ---",
        supply.reserved_len(),
        supply.reserved_capacity()
    );
    if supply.reserved_len() == 0 {
        println!("(no reservations)");
    } else {
        let line: Vec<String> = supply.reserved_pieces().map(|p| p.to_string()).collect();
        println!("{}", line.join(" "));
    }

    println!("--- PLAYED / REMOVED ({}) ---", supply.history().len());
    if supply.history().is_empty() {
        println!("(nothing played yet)");
    } else {
        let line: Vec<String> = supply.history().iter().map(|p| p.to_string()).collect();
        println!("{}", line.join(" -> "));
    }
}

fn print_menu() {
    println!();
    println!("Actions:");
    println!("  1. Play the front piece");
    println!("  2. Insert a random piece");
    println!("  3. Insert a piece of a chosen kind");
    println!("  4. Swap two queue positions");
    println!("  5. Remove a piece by position");
    println!("  6. Reserve the front piece");
    println!("  7. Use the reserved piece");
    println!("  8. Undo the last play");
    println!("  9. Invert queue and reservation stack");
    println!("  0. Quit");
    print!("Choose an action: ");
    let _ = io::stdout().flush();
}

/// Next input line, or `None` on end of input.
fn read_line<I>(input: &mut I) -> Option<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    match input.next() {
        Some(Ok(line)) => Some(line),
        _ => None,
    }
}

fn prompt<I>(input: &mut I, text: &str) -> Option<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{text}");
    let _ = io::stdout().flush();
    read_line(input)
}

/// Ask for a piece letter until one parses. `None` only on end of input.
fn prompt_kind<I>(input: &mut I) -> Option<PieceKind>
where
    I: Iterator<Item = io::Result<String>>,
{
    loop {
        let line = prompt(input, "Piece kind (I, O, T, L, J, S, Z): ")?;
        let mut chars = line.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                if let Some(kind) = PieceKind::from_char(c.to_ascii_uppercase()) {
                    return Some(kind);
                }
                println!("Unknown piece kind {c:?}.");
            }
            _ => println!("Enter a single letter."),
        }
    }
}

/// Ask for one 1-indexed position until a number parses. Range checking is
/// the core's job; only syntax is enforced here.
fn prompt_position<I>(input: &mut I, len: usize) -> Option<usize>
where
    I: Iterator<Item = io::Result<String>>,
{
    loop {
        let line = prompt(input, &format!("Position (1 to {len}): "))?;
        match line.trim().parse::<usize>() {
            Ok(pos) => return Some(pos),
            Err(_) => println!("Enter a number."),
        }
    }
}

/// Ask for two positions on one line until both parse.
fn prompt_position_pair<I>(input: &mut I, len: usize) -> Option<(usize, usize)>
where
    I: Iterator<Item = io::Result<String>>,
{
    loop {
        let line = prompt(input, &format!("Two positions to swap (1 to {len}): "))?;
        let mut parts = line.split_whitespace();
        let parsed = (
            parts.next().map(str::parse::<usize>),
            parts.next().map(str::parse::<usize>),
            parts.next(),
        );
        match parsed {
            (Some(Ok(a)), Some(Ok(b)), None) => return Some((a, b)),
            _ => println!("Enter two numbers separated by a space."),
        }
    }
}
