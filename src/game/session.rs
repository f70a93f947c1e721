//! Session State Machine
//!
//! One session per local player. The session owns the active round
//! (secret code, clues, attempts, timer) and the mode-specific turn
//! state, and persists cumulative statistics through the store on every
//! round resolution. All state lives in this explicit context object;
//! transitions are methods, there is no ambient global.
//!
//! Phases: `Menu -> CodeCreation | AwaitingCode -> InProgress ->
//! Resolved(Win|Loss)`, then `play_again` back into a round or
//! `return_to_menu` back to `Menu`. In online mode the counterpart
//! session is driven purely by inbound room events (`install_remote_round`,
//! `apply_role_switch`, `apply_opponent_result`), which are safe to call
//! whatever the local phase is.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::core::rng::DeterministicRng;
use crate::game::clue::{generate_clues, Clue};
use crate::game::code::{validate_entry, CodeError, SecretCode};
use crate::game::difficulty::{Difficulty, DifficultyProfile};
use crate::game::stats::{Stats, StatsError, StatsStore};
use crate::game::timer::RoundTimer;

/// Play mode for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Single player, unlimited time.
    Classic,
    /// Single player against the countdown.
    Timed,
    /// Two players sharing one device, alternating creator/guesser.
    LocalMultiplayer,
    /// Two players in separate sessions joined through a room.
    OnlineMultiplayer,
}

/// Outcome of a resolved round, from the local player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The guesser reproduced the code.
    Win,
    /// Attempts or time ran out, or the opponent won the round.
    Loss,
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mode and difficulty chosen, no round running.
    Menu,
    /// Waiting for the local player to enter a secret code.
    CodeCreation,
    /// Waiting for the remote creator's code (online guesser side).
    AwaitingCode,
    /// Round running, guesses accepted.
    InProgress,
    /// Round finished.
    Resolved(RoundOutcome),
}

/// Player seat in a two-player mode. In online mode `One` is always the
/// local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSlot {
    /// First seat / local player.
    One,
    /// Second seat / opponent.
    Two,
}

impl PlayerSlot {
    /// The opposite seat.
    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }
}

/// Summary of a resolved round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    /// Win or loss.
    pub outcome: RoundOutcome,
    /// User-facing message; always reveals the secret code.
    pub message: String,
    /// Elapsed seconds for timed-mode rounds.
    pub elapsed_secs: Option<u64>,
}

/// Result of one guess submission.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessFeedback {
    /// Guess matched; round won.
    Win(RoundResult),
    /// Guess missed with attempts remaining.
    Incorrect {
        /// Attempts left after this guess.
        attempts_left: u32,
    },
    /// Guess missed and exhausted the attempts; round lost.
    Loss(RoundResult),
}

/// Session operation failure. All variants are recoverable at the
/// session boundary; no state is mutated on the validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Operation requires a running round.
    #[error("no round in progress")]
    NotInProgress,

    /// Operation requires the code-creation phase.
    #[error("not in the code creation phase")]
    NotInCodeCreation,

    /// Operation requires a resolved round.
    #[error("round is not resolved")]
    NotResolved,

    /// Operation does not apply to the session's mode.
    #[error("operation not valid for this game mode")]
    WrongMode,

    /// Invalid code or guess entry.
    #[error(transparent)]
    Entry(#[from] CodeError),

    /// Statistics store failure.
    #[error(transparent)]
    Store(#[from] StatsError),
}

/// One player's game session.
pub struct Session {
    mode: GameMode,
    difficulty: Difficulty,
    profile: DifficultyProfile,
    phase: Phase,
    secret: Option<SecretCode>,
    clues: Vec<Clue>,
    attempts_left: u32,
    /// Which seat creates the code this round (local multiplayer).
    current_creator: PlayerSlot,
    /// Whether the local player creates this round (online).
    my_turn_to_create: bool,
    scores: [u32; 2],
    discarded: BTreeSet<u8>,
    timer: Option<RoundTimer>,
    stats: Stats,
    store: Box<dyn StatsStore>,
    rng: DeterministicRng,
}

impl Session {
    /// Create a session in the menu phase, loading saved statistics.
    pub fn new(
        mode: GameMode,
        difficulty: Difficulty,
        seed: u64,
        store: Box<dyn StatsStore>,
    ) -> Result<Self, SessionError> {
        let stats = store.load()?;
        Ok(Self {
            mode,
            difficulty,
            profile: difficulty.profile(),
            phase: Phase::Menu,
            secret: None,
            clues: Vec::new(),
            attempts_left: difficulty.profile().max_attempts,
            current_creator: PlayerSlot::One,
            my_turn_to_create: false,
            scores: [0, 0],
            discarded: BTreeSet::new(),
            timer: None,
            stats,
            store,
            rng: DeterministicRng::new(seed),
        })
    }

    /// Play mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Selected difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Clues for the running round.
    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    /// Guesses remaining.
    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// The active secret code, if a round is set up.
    pub fn secret_code(&self) -> Option<&SecretCode> {
        self.secret.as_ref()
    }

    /// Scores per seat: (player one, player two).
    pub fn scores(&self) -> (u32, u32) {
        (self.scores[0], self.scores[1])
    }

    /// Cumulative statistics.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Creator seat for the current local-multiplayer round.
    pub fn current_creator(&self) -> PlayerSlot {
        self.current_creator
    }

    /// Whether the local player creates the code this online round.
    pub fn is_creating(&self) -> bool {
        self.my_turn_to_create
    }

    /// Start the first round for the configured mode.
    pub fn start_round(&mut self) -> Result<(), SessionError> {
        match self.mode {
            GameMode::Classic | GameMode::Timed => self.begin_generated_round(),
            GameMode::LocalMultiplayer => {
                self.clear_round();
                self.phase = Phase::CodeCreation;
                info!(creator = ?self.current_creator, "code creation phase");
            }
            GameMode::OnlineMultiplayer => {
                // Role must be set through start_online_round.
                return Err(SessionError::WrongMode);
            }
        }
        Ok(())
    }

    /// Start an online round with an explicit creator role. The host
    /// creates first; later rounds alternate via role switches.
    pub fn start_online_round(&mut self, creating: bool) -> Result<(), SessionError> {
        if self.mode != GameMode::OnlineMultiplayer {
            return Err(SessionError::WrongMode);
        }
        self.my_turn_to_create = creating;
        self.clear_round();
        self.phase = if creating {
            Phase::CodeCreation
        } else {
            Phase::AwaitingCode
        };
        info!(creating, "online round started");
        Ok(())
    }

    /// Accept the creating player's secret code and derive its clues.
    ///
    /// Returns the clue set so the online caller can broadcast it with
    /// the code. Validation failures leave the session untouched.
    pub fn submit_created_code(&mut self, digits: &[u8]) -> Result<Vec<Clue>, SessionError> {
        if self.phase != Phase::CodeCreation {
            return Err(SessionError::NotInCodeCreation);
        }
        let code = SecretCode::from_player_input(digits, self.profile.code_length)?;
        let clues = generate_clues(&mut self.rng, &code, self.difficulty);

        self.install_round(code, clues.clone());
        info!("player-created code accepted");
        Ok(clues)
    }

    /// Install a code and clue set received from the remote creator.
    pub fn install_remote_round(&mut self, code: SecretCode, clues: Vec<Clue>) {
        self.clear_round();
        self.install_round(code, clues);
        info!("remote code installed, guessing begins");
    }

    /// Evaluate a guess against the active code.
    pub fn submit_guess(&mut self, guess: &[u8]) -> Result<GuessFeedback, SessionError> {
        if self.phase != Phase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        validate_entry(guess, self.profile.code_length)?;
        let correct = self
            .secret
            .as_ref()
            .ok_or(SessionError::NotInProgress)?
            .matches(guess);

        if correct {
            let result = self.resolve_win()?;
            Ok(GuessFeedback::Win(result))
        } else {
            self.attempts_left -= 1;
            debug!(attempts_left = self.attempts_left, "incorrect guess");

            if self.attempts_left == 0 {
                let result = self.resolve_loss("Out of attempts!")?;
                Ok(GuessFeedback::Loss(result))
            } else {
                Ok(GuessFeedback::Incorrect {
                    attempts_left: self.attempts_left,
                })
            }
        }
    }

    /// Poll the timed-mode countdown. Returns the loss result on the
    /// first poll at or past the deadline, `None` on every other poll.
    pub fn poll_timer(&mut self) -> Result<Option<RoundResult>, SessionError> {
        if self.phase != Phase::InProgress {
            return Ok(None);
        }
        let expired = match self.timer.as_mut() {
            Some(timer) => timer.fire_expiry(),
            None => false,
        };
        if !expired {
            return Ok(None);
        }
        let result = self.resolve_loss("Time is up!")?;
        Ok(Some(result))
    }

    /// Time left on the countdown, if one is running.
    pub fn timer_remaining(&self) -> Option<Duration> {
        self.timer.as_ref().map(|t| t.remaining())
    }

    /// Cancel the countdown. Idempotent; safe to call with no timer.
    pub fn stop_timer(&mut self) {
        self.timer = None;
    }

    /// Begin the next round after a resolution.
    ///
    /// Classic/timed regenerate a code; local multiplayer swaps the
    /// creator seat; online toggles the local creator role (the caller
    /// broadcasts the corresponding role switch).
    pub fn play_again(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Resolved(_)) {
            return Err(SessionError::NotResolved);
        }
        match self.mode {
            GameMode::Classic | GameMode::Timed => self.begin_generated_round(),
            GameMode::LocalMultiplayer => {
                self.current_creator = self.current_creator.other();
                self.clear_round();
                self.phase = Phase::CodeCreation;
                info!(creator = ?self.current_creator, "roles swapped for new round");
            }
            GameMode::OnlineMultiplayer => {
                let creating = !self.my_turn_to_create;
                self.start_online_round(creating)?;
            }
        }
        Ok(())
    }

    /// Apply a role switch announced by the opponent.
    pub fn apply_role_switch(&mut self, creating: bool) {
        if self.mode != GameMode::OnlineMultiplayer {
            return;
        }
        self.my_turn_to_create = creating;
        self.clear_round();
        self.phase = if creating {
            Phase::CodeCreation
        } else {
            Phase::AwaitingCode
        };
        info!(creating, "role switch applied");
    }

    /// Apply the opponent's guess outcome (online creator side). A
    /// correct opponent guess scores for the opponent and resolves the
    /// round; the local player's personal win statistics are untouched.
    pub fn apply_opponent_result(&mut self, correct: bool) {
        if self.mode != GameMode::OnlineMultiplayer {
            return;
        }
        if correct {
            self.scores[PlayerSlot::Two.index()] += 1;
            self.phase = Phase::Resolved(RoundOutcome::Loss);
            info!("opponent guessed the code");
        } else {
            debug!("opponent guess missed");
        }
    }

    /// Apply a room-closed notice from the host. The match is over:
    /// any running round is abandoned and the session drops back to the
    /// menu. Drivers hold the notice on screen briefly before calling
    /// this.
    pub fn apply_room_closed(&mut self) {
        if self.mode != GameMode::OnlineMultiplayer {
            return;
        }
        info!("room closed by host, abandoning the match");
        self.return_to_menu();
    }

    /// Abandon any running round and go back to the menu.
    pub fn return_to_menu(&mut self) {
        self.stop_timer();
        self.clear_round();
        self.phase = Phase::Menu;
        info!("returned to menu");
    }

    /// Toggle a digit in the guesser's discard scratchpad. Returns the
    /// new discarded state of the digit.
    pub fn toggle_discarded(&mut self, digit: u8) -> bool {
        if self.discarded.remove(&digit) {
            false
        } else {
            self.discarded.insert(digit);
            true
        }
    }

    /// Digits the guesser has marked as ruled out.
    pub fn discarded_digits(&self) -> &BTreeSet<u8> {
        &self.discarded
    }

    fn begin_generated_round(&mut self) {
        self.clear_round();
        let code = SecretCode::generate(&mut self.rng, self.profile.code_length);
        let clues = generate_clues(&mut self.rng, &code, self.difficulty);
        self.install_round(code, clues);
        if self.mode == GameMode::Timed {
            self.timer = Some(RoundTimer::start(self.difficulty.timer()));
        }
        info!(difficulty = ?self.difficulty, "new round generated");
    }

    fn install_round(&mut self, code: SecretCode, clues: Vec<Clue>) {
        self.secret = Some(code);
        self.clues = clues;
        self.attempts_left = self.profile.max_attempts;
        self.phase = Phase::InProgress;
    }

    fn clear_round(&mut self) {
        self.stop_timer();
        self.secret = None;
        self.clues.clear();
        self.discarded.clear();
        self.attempts_left = self.profile.max_attempts;
    }

    fn resolve_win(&mut self) -> Result<RoundResult, SessionError> {
        let elapsed = if self.mode == GameMode::Timed {
            self.timer.as_ref().map(|t| t.elapsed_secs())
        } else {
            None
        };
        self.stop_timer();

        self.stats.total_wins += 1;
        self.stats.win_streak += 1;
        self.stats.games_played += 1;
        if let Some(secs) = elapsed {
            let improved = self.stats.fastest_time.map_or(true, |best| secs < best);
            if improved {
                self.stats.fastest_time = Some(secs);
            }
        }

        match self.mode {
            GameMode::LocalMultiplayer => {
                let guesser = self.current_creator.other();
                self.scores[guesser.index()] += 1;
                self.stats.player1_score = self.scores[0];
                self.stats.player2_score = self.scores[1];
            }
            GameMode::OnlineMultiplayer => {
                self.scores[PlayerSlot::One.index()] += 1;
            }
            _ => {}
        }

        self.stats.last_played = Some(Utc::now());
        self.store.save(&self.stats)?;
        self.phase = Phase::Resolved(RoundOutcome::Win);

        let message = self.reveal_message("Excellent!", elapsed);
        info!(?elapsed, "round won");
        Ok(RoundResult {
            outcome: RoundOutcome::Win,
            message,
            elapsed_secs: elapsed,
        })
    }

    fn resolve_loss(&mut self, reason: &str) -> Result<RoundResult, SessionError> {
        self.stop_timer();
        self.stats.win_streak = 0;
        self.stats.games_played += 1;
        self.stats.last_played = Some(Utc::now());
        self.store.save(&self.stats)?;
        self.phase = Phase::Resolved(RoundOutcome::Loss);

        let message = self.reveal_message(reason, None);
        info!(reason, "round lost");
        Ok(RoundResult {
            outcome: RoundOutcome::Loss,
            message,
            elapsed_secs: None,
        })
    }

    fn reveal_message(&self, prefix: &str, elapsed: Option<u64>) -> String {
        let code = self
            .secret
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();
        match elapsed {
            Some(secs) => format!("{} The secret code was {} ({} seconds)", prefix, code, secs),
            None => format!("{} The secret code was {}", prefix, code),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats::MemoryStore;
    use tokio::time::advance;

    fn session(mode: GameMode, difficulty: Difficulty) -> Session {
        Session::new(mode, difficulty, 42, Box::new(MemoryStore::new())).unwrap()
    }

    fn secret_digits(session: &Session) -> Vec<u8> {
        session.secret_code().unwrap().digits().to_vec()
    }

    #[test]
    fn test_classic_win_flow() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        s.start_round().unwrap();
        assert_eq!(s.phase(), Phase::InProgress);
        assert_eq!(s.clues().len(), 6);
        assert_eq!(s.attempts_left(), 4);

        let code = secret_digits(&s);
        match s.submit_guess(&code).unwrap() {
            GuessFeedback::Win(result) => {
                assert_eq!(result.outcome, RoundOutcome::Win);
                assert!(result.message.contains(&s.secret_code().unwrap().to_string()));
            }
            other => panic!("expected win, got {:?}", other),
        }
        assert_eq!(s.phase(), Phase::Resolved(RoundOutcome::Win));
        assert_eq!(s.stats().total_wins, 1);
        assert_eq!(s.stats().win_streak, 1);
        assert_eq!(s.stats().games_played, 1);
    }

    #[test]
    fn test_classic_loss_resets_streak() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        s.start_round().unwrap();

        // Win once to build a streak
        let code = secret_digits(&s);
        s.submit_guess(&code).unwrap();
        s.play_again().unwrap();

        // A guess that cannot match: flip every digit
        let wrong: Vec<u8> = secret_digits(&s).iter().map(|d| (d + 1) % 10).collect();
        let mut last = None;
        for _ in 0..4 {
            last = Some(s.submit_guess(&wrong).unwrap());
        }
        match last.unwrap() {
            GuessFeedback::Loss(result) => {
                assert!(result.message.contains("Out of attempts"));
            }
            other => panic!("expected loss, got {:?}", other),
        }
        assert_eq!(s.stats().win_streak, 0);
        assert_eq!(s.stats().total_wins, 1);
        assert_eq!(s.stats().games_played, 2);
    }

    #[test]
    fn test_invalid_guess_mutates_nothing() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        s.start_round().unwrap();

        let err = s.submit_guess(&[1, 2]).unwrap_err();
        assert!(matches!(err, SessionError::Entry(CodeError::WrongLength { .. })));
        assert_eq!(s.attempts_left(), 4);
        assert_eq!(s.phase(), Phase::InProgress);

        let err = s.submit_guess(&[1, 2, 11]).unwrap_err();
        assert!(matches!(err, SessionError::Entry(CodeError::DigitOutOfRange(11))));
        assert_eq!(s.attempts_left(), 4);
    }

    #[test]
    fn test_guess_outside_round_rejected() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        let err = s.submit_guess(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, SessionError::NotInProgress));
    }

    #[test]
    fn test_local_multiplayer_round_cycle() {
        let mut s = session(GameMode::LocalMultiplayer, Difficulty::Easy);
        s.start_round().unwrap();
        assert_eq!(s.phase(), Phase::CodeCreation);
        assert_eq!(s.current_creator(), PlayerSlot::One);

        // All-identical code rejected without leaving the phase
        let err = s.submit_created_code(&[5, 5, 5]).unwrap_err();
        assert!(matches!(err, SessionError::Entry(CodeError::AllDigitsIdentical)));
        assert_eq!(s.phase(), Phase::CodeCreation);
        assert!(s.clues().is_empty());

        let clues = s.submit_created_code(&[1, 2, 3]).unwrap();
        assert_eq!(clues.len(), 6);
        assert_eq!(s.phase(), Phase::InProgress);

        // Player two guesses correctly and scores
        s.submit_guess(&[1, 2, 3]).unwrap();
        assert_eq!(s.scores(), (0, 1));
        assert_eq!(s.stats().player2_score, 1);

        // New round swaps the creator seat
        s.play_again().unwrap();
        assert_eq!(s.current_creator(), PlayerSlot::Two);
        assert_eq!(s.phase(), Phase::CodeCreation);
    }

    #[test]
    fn test_local_multiplayer_loss_keeps_scores() {
        let mut s = session(GameMode::LocalMultiplayer, Difficulty::Easy);
        s.start_round().unwrap();
        s.submit_created_code(&[4, 0, 9]).unwrap();

        for _ in 0..4 {
            let _ = s.submit_guess(&[1, 1, 2]).unwrap();
        }
        assert_eq!(s.phase(), Phase::Resolved(RoundOutcome::Loss));
        assert_eq!(s.scores(), (0, 0));
    }

    #[test]
    fn test_online_round_roles() {
        let mut host = session(GameMode::OnlineMultiplayer, Difficulty::Medium);
        let mut guest = session(GameMode::OnlineMultiplayer, Difficulty::Medium);

        // Host creates first
        host.start_online_round(true).unwrap();
        guest.start_online_round(false).unwrap();
        assert_eq!(host.phase(), Phase::CodeCreation);
        assert_eq!(guest.phase(), Phase::AwaitingCode);

        let clues = host.submit_created_code(&[7, 1, 2, 9]).unwrap();
        let code = host.secret_code().unwrap().clone();
        guest.install_remote_round(code, clues);
        assert_eq!(guest.phase(), Phase::InProgress);

        // Guest wins; host records the opponent's point
        match guest.submit_guess(&[7, 1, 2, 9]).unwrap() {
            GuessFeedback::Win(_) => {}
            other => panic!("expected win, got {:?}", other),
        }
        assert_eq!(guest.scores(), (1, 0));
        host.apply_opponent_result(true);
        assert_eq!(host.scores(), (0, 1));
        assert_eq!(host.phase(), Phase::Resolved(RoundOutcome::Loss));

        // Next round alternates the creator
        guest.play_again().unwrap();
        assert!(guest.is_creating());
        assert_eq!(guest.phase(), Phase::CodeCreation);
        host.apply_role_switch(false);
        assert_eq!(host.phase(), Phase::AwaitingCode);
    }

    #[test]
    fn test_room_closed_forces_guest_to_menu() {
        let mut guest = session(GameMode::OnlineMultiplayer, Difficulty::Medium);
        guest.start_online_round(false).unwrap();

        let mut rng = DeterministicRng::new(7);
        let code = SecretCode::generate(&mut rng, 4);
        let clues = generate_clues(&mut rng, &code, Difficulty::Medium);
        guest.install_remote_round(code, clues);
        assert_eq!(guest.phase(), Phase::InProgress);

        // Host closes the room mid-round
        guest.apply_room_closed();
        assert_eq!(guest.phase(), Phase::Menu);
        assert!(guest.secret_code().is_none());
        assert!(guest.clues().is_empty());
    }

    #[test]
    fn test_room_closed_ignored_outside_online_mode() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        s.start_round().unwrap();
        s.apply_room_closed();
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn test_online_start_requires_role() {
        let mut s = session(GameMode::OnlineMultiplayer, Difficulty::Easy);
        assert!(matches!(s.start_round(), Err(SessionError::WrongMode)));
    }

    #[test]
    fn test_return_to_menu_resets() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        s.start_round().unwrap();
        s.toggle_discarded(7);
        s.return_to_menu();

        assert_eq!(s.phase(), Phase::Menu);
        assert!(s.secret_code().is_none());
        assert!(s.clues().is_empty());
        assert!(s.discarded_digits().is_empty());
    }

    #[test]
    fn test_toggle_discarded() {
        let mut s = session(GameMode::Classic, Difficulty::Easy);
        assert!(s.toggle_discarded(3));
        assert!(s.discarded_digits().contains(&3));
        assert!(!s.toggle_discarded(3));
        assert!(s.discarded_digits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_loss_fires_exactly_once() {
        let mut s = session(GameMode::Timed, Difficulty::Hard);
        s.start_round().unwrap();
        assert!(s.timer_remaining().is_some());

        advance(Duration::from_secs(59)).await;
        assert!(s.poll_timer().unwrap().is_none());

        advance(Duration::from_secs(2)).await;
        let result = s.poll_timer().unwrap().expect("loss on expiry");
        assert_eq!(result.outcome, RoundOutcome::Loss);
        assert!(result.message.contains("Time is up"));
        assert_eq!(s.phase(), Phase::Resolved(RoundOutcome::Loss));
        assert_eq!(s.stats().games_played, 1);

        // Jittery follow-up polls observe nothing
        for _ in 0..5 {
            advance(Duration::from_millis(100)).await;
            assert!(s.poll_timer().unwrap().is_none());
        }
        assert_eq!(s.stats().games_played, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_win_records_fastest_time() {
        let mut s = session(GameMode::Timed, Difficulty::Easy);
        s.start_round().unwrap();

        advance(Duration::from_secs(23)).await;
        let code = secret_digits(&s);
        match s.submit_guess(&code).unwrap() {
            GuessFeedback::Win(result) => assert_eq!(result.elapsed_secs, Some(23)),
            other => panic!("expected win, got {:?}", other),
        }
        assert_eq!(s.stats().fastest_time, Some(23));

        // A slower win does not overwrite the watermark
        s.play_again().unwrap();
        advance(Duration::from_secs(50)).await;
        let code = secret_digits(&s);
        s.submit_guess(&code).unwrap();
        assert_eq!(s.stats().fastest_time, Some(23));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_timer_idempotent() {
        let mut s = session(GameMode::Timed, Difficulty::Hard);
        s.start_round().unwrap();

        s.stop_timer();
        s.stop_timer();
        assert!(s.timer_remaining().is_none());

        // A stopped timer never produces a loss
        advance(Duration::from_secs(120)).await;
        assert!(s.poll_timer().unwrap().is_none());
        assert_eq!(s.phase(), Phase::InProgress);
    }
}
