//! A compact dealt-hand card game implementing the engine contract.
//!
//! The demo game exists so the scheduler can be exercised end-to-end
//! without an external engine: deals are genuine chance decisions (one
//! transition per card, as a card-game engine reveals unresolved
//! information), turns are participant decisions with a real legal-move
//! set, and play reaches a terminal state on every run.
//!
//! # Rules
//!
//! A standard 52-card deck is shuffled and five cards are dealt to each
//! seat, one card per chance transition. One card is then flipped to
//! start the discard pile. On a turn, a seat may play any hand card
//! matching the top discard's rank or suit, or draw from the deck
//! (resolved as a chance deal to that seat); with no match and an empty
//! deck the seat passes. The game ends when a seat empties its hand or
//! when every seat passes in a row.

use cardflow_types::{ActionRecord, DecisionPoint, GameSnapshot, PlayerSeat};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::{EngineFactory, EngineMove, GameEngine, GameSetup};
use crate::error::EngineError;

/// Cards dealt to each seat before play begins.
const HAND_SIZE: usize = 5;

/// Minimum supported participant count.
const MIN_PARTICIPANTS: u8 = 2;

/// Maximum supported participant count.
const MAX_PARTICIPANTS: u8 = 5;

/// A playing card: rank 1..=13, suit 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Card {
    rank: u8,
    suit: u8,
}

impl Card {
    fn matches(self, other: Self) -> bool {
        self.rank == other.rank || self.suit == other.suit
    }
}

impl core::fmt::Display for Card {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let rank = match self.rank {
            1 => String::from("A"),
            11 => String::from("J"),
            12 => String::from("Q"),
            13 => String::from("K"),
            n => n.to_string(),
        };
        let suit = match self.suit {
            0 => '\u{2663}',
            1 => '\u{2666}',
            2 => '\u{2665}',
            _ => '\u{2660}',
        };
        write!(f, "{rank}{suit}")
    }
}

/// Engine-internal move encoding carried in [`EngineMove::payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DemoMove {
    Play { rank: u8, suit: u8 },
    Draw,
    Pass,
}

/// Which stage of the game the engine is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Dealing opening hands, one chance transition per card.
    Dealing,
    /// Flipping the first discard (one chance transition).
    Flipping,
    /// Normal turn-by-turn play.
    Playing,
    /// Terminal.
    Finished,
}

/// The demo game engine. One live state, mutated in place.
pub struct DemoEngine {
    participants: u8,
    deck: Vec<Card>,
    hands: Vec<Vec<Card>>,
    discard: Vec<Card>,
    turn: u8,
    pending_draw: Option<PlayerSeat>,
    deal_cursor: u8,
    pass_streak: u8,
    phase: Phase,
    winner: Option<PlayerSeat>,
    transition: u64,
    last_action: ActionRecord,
}

impl DemoEngine {
    fn new(setup: &GameSetup) -> Result<Self, EngineError> {
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&setup.participants) {
            return Err(EngineError::UnsupportedParticipants {
                requested: setup.participants,
                min: MIN_PARTICIPANTS,
                max: MAX_PARTICIPANTS,
            });
        }

        let mut rng = setup
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let mut deck: Vec<Card> = (0u8..4)
            .flat_map(|suit| (1u8..=13).map(move |rank| Card { rank, suit }))
            .collect();
        deck.shuffle(&mut rng);

        let turn = if setup.randomized_start {
            rng.random_range(0..setup.participants)
        } else {
            0
        };

        Ok(Self {
            participants: setup.participants,
            deck,
            hands: vec![Vec::new(); usize::from(setup.participants)],
            discard: Vec::new(),
            turn,
            pending_draw: None,
            deal_cursor: 0,
            pass_streak: 0,
            phase: Phase::Dealing,
            winner: None,
            transition: 0,
            last_action: ActionRecord::Chance {
                description: String::from("table prepared"),
            },
        })
    }

    fn top_discard(&self) -> Option<Card> {
        self.discard.last().copied()
    }

    fn next_seat(&self, seat: u8) -> u8 {
        seat.saturating_add(1)
            .checked_rem(self.participants)
            .unwrap_or(0)
    }

    fn hand(&self, seat: PlayerSeat) -> &[Card] {
        self.hands
            .get(usize::from(seat.index()))
            .map_or(&[], Vec::as_slice)
    }

    /// Deal the top deck card to `seat`, recording the transition.
    fn deal_to(&mut self, seat: PlayerSeat) -> Result<Card, EngineError> {
        let card = self.deck.pop().ok_or_else(|| EngineError::Internal {
            message: String::from("deal from empty deck"),
        })?;
        if let Some(hand) = self.hands.get_mut(usize::from(seat.index())) {
            hand.push(card);
        }
        self.last_action = ActionRecord::Chance {
            description: format!("dealt {card} to {seat}"),
        };
        Ok(card)
    }

    fn encode_move(mv: DemoMove, label: String) -> EngineMove {
        // DemoMove serializes to a flat map; this cannot fail.
        let payload = serde_json::to_value(mv).unwrap_or(serde_json::Value::Null);
        EngineMove { label, payload }
    }

    fn finish_transition(&mut self) {
        self.transition = self.transition.saturating_add(1);
    }
}

impl GameEngine for DemoEngine {
    fn decision_point(&self) -> DecisionPoint {
        match self.phase {
            Phase::Dealing | Phase::Flipping => DecisionPoint::Chance,
            Phase::Playing => self.pending_draw.map_or(
                DecisionPoint::Participant {
                    seat: PlayerSeat(self.turn),
                },
                |_| DecisionPoint::Chance,
            ),
            Phase::Finished => DecisionPoint::Chance,
        }
    }

    fn legal_moves(&self, seat: PlayerSeat) -> Vec<EngineMove> {
        if self.phase != Phase::Playing
            || self.pending_draw.is_some()
            || seat.index() != self.turn
        {
            return Vec::new();
        }
        let Some(top) = self.top_discard() else {
            return Vec::new();
        };

        let mut moves: Vec<EngineMove> = self
            .hand(seat)
            .iter()
            .filter(|card| card.matches(top))
            .map(|card| {
                Self::encode_move(
                    DemoMove::Play {
                        rank: card.rank,
                        suit: card.suit,
                    },
                    format!("play {card}"),
                )
            })
            .collect();

        if self.deck.is_empty() {
            if moves.is_empty() {
                moves.push(Self::encode_move(DemoMove::Pass, String::from("pass")));
            }
        } else {
            moves.push(Self::encode_move(DemoMove::Draw, String::from("draw")));
        }
        moves
    }

    fn apply_move(&mut self, mv: &EngineMove) -> Result<(), EngineError> {
        if self.phase != Phase::Playing || self.pending_draw.is_some() {
            return Err(EngineError::IllegalMove {
                label: mv.label.clone(),
            });
        }
        let decoded: DemoMove =
            serde_json::from_value(mv.payload.clone()).map_err(|_| EngineError::IllegalMove {
                label: mv.label.clone(),
            })?;
        let seat = PlayerSeat(self.turn);

        match decoded {
            DemoMove::Play { rank, suit } => {
                let card = Card { rank, suit };
                let top = self.top_discard().ok_or_else(|| EngineError::IllegalMove {
                    label: mv.label.clone(),
                })?;
                let position = self
                    .hand(seat)
                    .iter()
                    .position(|c| *c == card)
                    .ok_or_else(|| EngineError::IllegalMove {
                        label: mv.label.clone(),
                    })?;
                if !card.matches(top) {
                    return Err(EngineError::IllegalMove {
                        label: mv.label.clone(),
                    });
                }
                if let Some(hand) = self.hands.get_mut(usize::from(seat.index())) {
                    hand.remove(position);
                }
                self.discard.push(card);
                self.pass_streak = 0;
                self.last_action = ActionRecord::Move {
                    seat,
                    description: format!("played {card}"),
                };
                if self.hand(seat).is_empty() {
                    self.winner = Some(seat);
                    self.phase = Phase::Finished;
                } else {
                    self.turn = self.next_seat(self.turn);
                }
            }
            DemoMove::Draw => {
                if self.deck.is_empty() {
                    return Err(EngineError::IllegalMove {
                        label: mv.label.clone(),
                    });
                }
                self.pending_draw = Some(seat);
                self.pass_streak = 0;
                self.last_action = ActionRecord::Move {
                    seat,
                    description: String::from("drew from the deck"),
                };
                self.turn = self.next_seat(self.turn);
            }
            DemoMove::Pass => {
                let top = self.top_discard().ok_or_else(|| EngineError::IllegalMove {
                    label: mv.label.clone(),
                })?;
                let has_play = self.hand(seat).iter().any(|card| card.matches(top));
                if has_play || !self.deck.is_empty() {
                    return Err(EngineError::IllegalMove {
                        label: mv.label.clone(),
                    });
                }
                self.pass_streak = self.pass_streak.saturating_add(1);
                self.last_action = ActionRecord::Move {
                    seat,
                    description: String::from("passed"),
                };
                if self.pass_streak >= self.participants {
                    self.phase = Phase::Finished;
                } else {
                    self.turn = self.next_seat(self.turn);
                }
            }
        }

        self.finish_transition();
        Ok(())
    }

    fn resolve_chance(&mut self) -> Result<(), EngineError> {
        match self.phase {
            Phase::Dealing => {
                let seat = PlayerSeat(self.deal_cursor);
                self.deal_to(seat)?;
                self.deal_cursor = self.next_seat(self.deal_cursor);
                let dealt_out = self
                    .hands
                    .iter()
                    .all(|hand| hand.len() >= HAND_SIZE);
                if dealt_out {
                    self.phase = Phase::Flipping;
                }
            }
            Phase::Flipping => {
                let card = self.deck.pop().ok_or_else(|| EngineError::Internal {
                    message: String::from("flip from empty deck"),
                })?;
                self.discard.push(card);
                self.last_action = ActionRecord::Chance {
                    description: format!("flipped {card} to start the discard"),
                };
                self.phase = Phase::Playing;
            }
            Phase::Playing => {
                let seat = self.pending_draw.take().ok_or(EngineError::NoChancePending)?;
                self.deal_to(seat)?;
            }
            Phase::Finished => return Err(EngineError::NoChancePending),
        }

        self.finish_transition();
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn snapshot(&self) -> GameSnapshot {
        let hands: Vec<Vec<String>> = self
            .hands
            .iter()
            .map(|hand| hand.iter().map(ToString::to_string).collect())
            .collect();
        let board = serde_json::json!({
            "deck_size": self.deck.len(),
            "top_discard": self.top_discard().map(|c| c.to_string()),
            "turn": self.turn,
            "hands": hands,
            "pass_streak": self.pass_streak,
            "winner": self.winner.map(PlayerSeat::index),
        });

        GameSnapshot {
            transition: self.transition,
            to_act: self.decision_point(),
            terminal: self.is_terminal(),
            action: self.last_action.clone(),
            board,
            captured_at: Utc::now(),
        }
    }
}

/// Factory producing [`DemoEngine`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoEngineFactory;

impl DemoEngineFactory {
    /// Create a new demo engine factory.
    pub const fn new() -> Self {
        Self
    }
}

impl EngineFactory for DemoEngineFactory {
    fn create(&self, setup: &GameSetup) -> Result<Box<dyn GameEngine>, EngineError> {
        Ok(Box::new(DemoEngine::new(setup)?))
    }
}
