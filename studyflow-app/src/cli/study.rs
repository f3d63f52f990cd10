use anyhow::Result;
use chrono::Utc;
use std::io::{stdout, Write};
use std::sync::Arc;
use studyflow_core::{
    CoreError, Grade, HapticStyle, Haptics, Repository, SessionState, StudySession, TickOutcome,
    Totals,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::commands::resolve_deck;
use crate::cli::opts::StudyCmd;
use crate::config::Config;

/// Terminal stand-in for a vibration motor: rings the bell on strong pulses.
pub struct BellHaptics;

impl Haptics for BellHaptics {
    fn vibrate(&self, style: HapticStyle) -> Result<(), CoreError> {
        if matches!(style, HapticStyle::Heavy) {
            let mut out = stdout();
            out.write_all(b"\x07")
                .and_then(|_| out.flush())
                .map_err(|_| CoreError::InvalidState("terminal unavailable"))?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Input {
    Reveal,
    Grade(Grade),
    Next,
    Prev,
    Repeat,
    Mastered,
    Restart,
    ToggleFree,
    Help,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" | "s" | "show" => Input::Reveal,
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Prev,
        "r" | "repeat" => Input::Repeat,
        "m" | "mastered" => Input::Mastered,
        "R" | "restart" => Input::Restart,
        "f" | "free" => Input::ToggleFree,
        "?" | "help" => Input::Help,
        "q" | "quit" => Input::Quit,
        other => other.parse::<Grade>().map(Input::Grade).unwrap_or(Input::Unknown),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct View {
    index: usize,
    position: (usize, usize),
    state: SessionState,
    free: bool,
}

impl View {
    fn of(s: &StudySession) -> Self {
        Self {
            index: s.current_index(),
            position: s.position(),
            state: s.state(),
            free: s.is_free_review(),
        }
    }
}

pub async fn run(repo: Arc<dyn Repository>, cmd: StudyCmd, config: &Config) -> Result<()> {
    let deck = resolve_deck(&*repo, &cmd.deck).await?;
    let auto_flip = cmd.auto_flip.or(config.auto_flip_secs).unwrap_or(0);

    let mut session = StudySession::new(repo).with_haptics(Arc::new(BellHaptics));
    session.load_deck(deck, Utc::now());
    if session.is_empty_deck() {
        println!("deck is empty");
        return Ok(());
    }
    if cmd.free {
        session.enter_free_review();
    }

    print_help();
    let (tx, mut ticks) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_view = None;

    loop {
        if session.is_done() {
            println!("\nno more cards due");
            break;
        }
        let view = View::of(&session);
        if last_view != Some(view) {
            render(&session);
            last_view = Some(view);
        }
        session.ensure_auto_flip(auto_flip, tx.clone());

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_input(&mut session, parse_input(&line)).await {
                    break;
                }
            }
            Some(tick) = ticks.recv() => {
                if let TickOutcome::Counting(left) = session.on_tick(tick) {
                    tracing::trace!(left, "auto-flip countdown");
                }
            }
        }
    }

    print_summary(session.totals());
    Ok(())
}

/// Applies one command. Returns false when the user quits.
async fn handle_input(session: &mut StudySession, input: Input) -> bool {
    match input {
        Input::Reveal => {
            if let Err(e) = session.reveal() {
                println!("{e}");
            }
        }
        Input::Grade(g) => {
            if session.is_free_review() {
                println!("free review does not schedule cards; press enter to flip, n for next");
            } else if !session.is_revealed() {
                println!("reveal the answer first");
            } else {
                match session.grade_and_retire(g, Utc::now()).await {
                    Ok(card) => {
                        let days = card.state.map(|s| s.interval).unwrap_or(1);
                        println!("→ next due in {days} day(s)");
                    }
                    Err(e) => println!("could not save review: {e}"),
                }
            }
        }
        Input::Next => session.next(),
        Input::Prev => session.prev(),
        Input::Repeat => {
            session.mark_repeat();
            session.next();
        }
        Input::Mastered => session.remove_current(),
        Input::Restart => {
            if session.is_free_review() {
                session.restart();
            } else {
                println!("restart only applies to free review (f)");
            }
        }
        Input::ToggleFree => {
            if session.is_free_review() {
                session.exit_free_review();
                println!("back to scheduled review");
            } else {
                session.enter_free_review();
                println!("free review: all cards, no scheduling");
            }
        }
        Input::Help => print_help(),
        Input::Quit => return false,
        Input::Unknown => println!("unknown command, ? for help"),
    }
    true
}

fn render(session: &StudySession) {
    let Some(card) = session.current_card() else {
        if session.is_free_review() {
            println!("\n(queue empty, n to bring back repeats)");
        }
        return;
    };
    let (pos, len) = session.position();
    let mode = if session.is_free_review() { "free" } else { "due" };
    if session.is_revealed() {
        println!("A: {}", card.back);
        if !session.is_free_review() {
            println!("[1=again, 2=hard, 3=good, 4=easy]");
        }
    } else {
        println!("\n[{mode} {pos}/{len}] Q: {}", card.front);
    }
}

fn print_help() {
    println!("enter=show answer  1-4=grade  n/p=next/prev  r=repeat later  m=mastered");
    println!("f=toggle free review  R=restart free review  ?=help  q=quit");
}

fn print_summary(t: &Totals) {
    if t.total == 0 {
        return;
    }
    println!(
        "\nreviewed {} (again {}, hard {}, good {}, easy {}), recalled {:.0}%",
        t.total,
        t.again,
        t.hard,
        t.good,
        t.easy,
        t.accuracy() * 100.0
    );
}
