//! Decode Duel Server
//!
//! Demo driver: runs a scripted classic round, then a scripted online
//! match between two sessions joined through the room hub.

use anyhow::{anyhow, Context};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use decode_duel::{
    derive_session_seed,
    game::{
        session::{GameMode, GuessFeedback, Session},
        stats::MemoryStore,
    },
    network::{
        protocol::{Envelope, RoomEvent},
        room::RoomHub,
    },
    Difficulty, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Decode Duel Server v{}", VERSION);

    demo_classic_round()?;
    demo_online_match().await?;
    Ok(())
}

/// Run one classic round against a generated code.
fn demo_classic_round() -> anyhow::Result<()> {
    info!("=== Classic Round ===");

    let mut session = Session::new(
        GameMode::Classic,
        Difficulty::Easy,
        12345,
        Box::new(MemoryStore::new()),
    )?;
    session.start_round()?;

    for clue in session.clues() {
        info!("clue [{:?}]: {}", clue.kind, clue.hint);
    }

    let secret: Vec<u8> = session
        .secret_code()
        .ok_or_else(|| anyhow!("round did not start"))?
        .digits()
        .to_vec();

    // One deliberate miss, then the solution
    let miss: Vec<u8> = secret.iter().map(|d| (d + 1) % 10).collect();
    match session.submit_guess(&miss)? {
        GuessFeedback::Incorrect { attempts_left } => {
            info!("missed, {} attempts left", attempts_left);
        }
        other => info!("unexpected feedback: {:?}", other),
    }
    match session.submit_guess(&secret)? {
        GuessFeedback::Win(result) => info!("{}", result.message),
        other => info!("unexpected feedback: {:?}", other),
    }

    let stats = session.stats();
    info!(
        "stats: {} played, {} won, streak {}",
        stats.games_played, stats.total_wins, stats.win_streak
    );
    Ok(())
}

/// Run a scripted online match: host creates a code, guest guesses it.
async fn demo_online_match() -> anyhow::Result<()> {
    info!("=== Online Match ===");

    let hub = RoomHub::new(0xDEC0DE);
    let (host_id, mut host_rx) = hub.connect("host").await;
    let (guest_id, mut guest_rx) = hub.connect("guest").await;

    let code = hub.create_room(host_id).await?;
    info!("room {} opened by {}", code, host_id);
    hub.join_room(guest_id, &code).await?;
    expect_event(&mut host_rx, "join").await?;
    expect_event(&mut guest_rx, "join").await?;

    let difficulty = Difficulty::Medium;
    let mut host = Session::new(
        GameMode::OnlineMultiplayer,
        difficulty,
        derive_session_seed(host_id.as_bytes(), b"demo"),
        Box::new(MemoryStore::new()),
    )?;
    let mut guest = Session::new(
        GameMode::OnlineMultiplayer,
        difficulty,
        derive_session_seed(guest_id.as_bytes(), b"demo"),
        Box::new(MemoryStore::new()),
    )?;

    // Host announces the match and creates the first code
    hub.broadcast(
        host_id,
        RoomEvent::GameStarted {
            difficulty,
            settings: difficulty.profile(),
        },
    )
    .await?;
    host.start_online_round(true)?;
    guest.start_online_round(false)?;

    let clues = host.submit_created_code(&[7, 1, 2, 9])?;
    let secret = host
        .secret_code()
        .ok_or_else(|| anyhow!("host has no code"))?
        .clone();
    hub.broadcast(
        host_id,
        RoomEvent::CodeSubmitted {
            secret_code: secret,
            clues,
        },
    )
    .await?;

    // Guest receives the code and plays the round
    loop {
        let envelope = expect_event(&mut guest_rx, "code").await?;
        if let RoomEvent::CodeSubmitted { secret_code, clues } = envelope.event {
            guest.install_remote_round(secret_code, clues);
            break;
        }
    }
    for clue in guest.clues() {
        info!("guest clue [{:?}]: {}", clue.kind, clue.hint);
    }

    let feedback = guest.submit_guess(&[7, 1, 2, 9])?;
    let correct = matches!(feedback, GuessFeedback::Win(_));
    info!("guest guessed, correct = {}", correct);
    hub.broadcast(
        guest_id,
        RoomEvent::AnswerSubmitted {
            correct,
            attempts_left: Some(guest.attempts_left()),
            scores: None,
        },
    )
    .await?;

    loop {
        let envelope = expect_event(&mut host_rx, "answer").await?;
        if let RoomEvent::AnswerSubmitted { correct, .. } = envelope.event {
            host.apply_opponent_result(correct);
            break;
        }
    }
    info!(
        "scores: host {:?}, guest {:?}",
        host.scores(),
        guest.scores()
    );

    // Wrap up: publish the final standings, then retire the room
    let mut final_scores = std::collections::BTreeMap::new();
    final_scores.insert(host_id, host.scores().0);
    final_scores.insert(guest_id, guest.scores().0);
    hub.broadcast(
        host_id,
        RoomEvent::GameEnd {
            scores: final_scores,
        },
    )
    .await?;

    hub.close_room(host_id).await?;
    while let Ok(envelope) = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        expect_event(&mut guest_rx, "close"),
    )
    .await
    {
        let envelope = envelope?;
        if matches!(envelope.event, RoomEvent::RoomClosed { .. }) {
            info!("guest notified: {:?}", envelope.event);
            // Grace period before the forced return to the menu
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            guest.apply_room_closed();
            info!("guest back at menu: {:?}", guest.phase());
            break;
        }
    }

    hub.disconnect(guest_id).await;
    hub.disconnect(host_id).await;
    info!("online match complete");
    Ok(())
}

async fn expect_event(
    rx: &mut tokio::sync::mpsc::Receiver<Envelope>,
    what: &str,
) -> anyhow::Result<Envelope> {
    rx.recv()
        .await
        .ok_or_else(|| anyhow!("channel closed while waiting for {}", what))
}
