//! SFEN codec for `Position`.

use std::fmt;

use super::Position;
use crate::types::{Color, Piece, PieceType, Square};

/// SFEN string of the default starting position.
pub const STARTPOS: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// Error type for SFEN parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfenError {
    /// Not 3 or 4 space-separated fields
    WrongFieldCount(usize),
    /// Board field starts with '/'
    LeadingSlash,
    /// Unknown piece character in the board or hands field
    UnknownPiece(char),
    /// Board field ends before all 81 squares are covered
    TruncatedBoard,
    /// Side field is neither 'b' nor 'w'
    InvalidSide(String),
    /// Ply field is not a positive integer
    InvalidPly(String),
}

impl fmt::Display for SfenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SfenError::WrongFieldCount(n) => {
                write!(f, "SFEN must have 3 or 4 fields, got {n}")
            }
            SfenError::LeadingSlash => write!(f, "SFEN board can't begin with a '/'"),
            SfenError::UnknownPiece(c) => write!(f, "SFEN invalid piece character: {c}"),
            SfenError::TruncatedBoard => write!(f, "SFEN board covers fewer than 81 squares"),
            SfenError::InvalidSide(s) => {
                write!(f, "SFEN side must be 'b' or 'w', got '{s}'")
            }
            SfenError::InvalidPly(s) => {
                write!(f, "SFEN ply must be a positive integer, got '{s}'")
            }
        }
    }
}

impl std::error::Error for SfenError {}

impl Position {
    /// Creates a `Position` from a SFEN string.
    pub fn from_sfen(sfen: &str) -> Result<Position, SfenError> {
        let fields: Vec<&str> = sfen.split_whitespace().collect();
        if !(3..=4).contains(&fields.len()) {
            return Err(SfenError::WrongFieldCount(fields.len()));
        }

        let mut pos = Position::new();
        pos.parse_board(fields[0])?;

        match fields[1] {
            "b" => {}
            "w" => pos.side = Color::White,
            other => return Err(SfenError::InvalidSide(other.to_string())),
        }

        if fields[2] != "-" {
            pos.parse_hands(fields[2])?;
        }

        pos.ply = match fields.get(3) {
            Some(s) => match s.parse::<i32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(SfenError::InvalidPly(s.to_string())),
            },
            None => 1,
        };

        Ok(pos)
    }

    /// Creates the default starting position.
    pub fn startpos() -> Position {
        Position::from_sfen(STARTPOS).expect("startpos SFEN is valid")
    }

    /// Returns the SFEN string representation of the position.
    pub fn to_sfen(&self) -> String {
        let mut out = String::new();

        // board
        let mut empty_run = 0;
        for sq in Square::all() {
            if sq.index() % 9 == 0 && sq.index() > 0 {
                if empty_run > 0 {
                    out.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                out.push('/');
            }
            let piece = self.board[sq.index()];
            if piece.is_none() {
                empty_run += 1;
            } else {
                if empty_run > 0 {
                    out.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                out.push_str(&piece.to_sfen());
            }
        }
        if empty_run > 0 {
            out.push_str(&empty_run.to_string());
        }

        // side to move
        out.push_str(match self.side {
            Color::Black => " b ",
            Color::White => " w ",
        });

        // hands
        if self.hands.iter().all(|h| h.is_empty()) {
            out.push('-');
        } else {
            for color in [Color::Black, Color::White] {
                self.write_hand_sfen(color, &mut out);
            }
        }

        // move count
        out.push(' ');
        out.push_str(&self.ply.to_string());

        out
    }

    fn parse_board(&mut self, field: &str) -> Result<(), SfenError> {
        let mut chars = field.chars();
        let mut sq = 0usize;
        while sq < Square::NUM {
            let ch = chars.next().ok_or(SfenError::TruncatedBoard)?;
            match ch {
                '/' if sq == 0 => return Err(SfenError::LeadingSlash),
                '/' => {
                    // realign to the next row when a row was short
                    if sq % 9 != 0 {
                        sq = (sq / 9 + 1) * 9;
                    }
                }
                '1'..='9' => sq += ch as usize - '0' as usize,
                '+' => {
                    let next = chars.next().ok_or(SfenError::TruncatedBoard)?;
                    let piece = Piece::from_sfen(&format!("+{next}"))
                        .ok_or(SfenError::UnknownPiece(next))?;
                    self.set_piece(piece, Square::from_u8_unchecked(sq as u8));
                    sq += 1;
                }
                _ => {
                    let piece = Piece::from_sfen(&ch.to_string())
                        .ok_or(SfenError::UnknownPiece(ch))?;
                    self.set_piece(piece, Square::from_u8_unchecked(sq as u8));
                    sq += 1;
                }
            }
        }
        Ok(())
    }

    fn parse_hands(&mut self, field: &str) -> Result<(), SfenError> {
        let mut count = 0u32;
        for ch in field.chars() {
            if let Some(d) = ch.to_digit(10) {
                count = count * 10 + d;
            } else {
                let piece = Piece::from_sfen(&ch.to_string())
                    .ok_or(SfenError::UnknownPiece(ch))?;
                let n = if count == 0 { 1 } else { count };
                self.hands[piece.color().index()] =
                    self.hands[piece.color().index()].set(piece.piece_type(), n);
                count = 0;
            }
        }
        Ok(())
    }

    fn write_hand_sfen(&self, color: Color, out: &mut String) {
        let hand = self.hands[color.index()];
        for pt in PieceType::HAND_ORDER {
            let n = hand.count(pt);
            if n == 0 {
                continue;
            }
            if n > 1 {
                out.push_str(&n.to_string());
            }
            out.push_str(&Piece::new(color, pt).to_sfen());
        }
    }
}
