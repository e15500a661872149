//! Purpose: Single-pass grammar validator for the typed CSV dialect.
//! Exports: `validate`, `scan`, `Scan`.
//! Role: Accept/reject a whole document before (or instead of) building a table.
//! Invariants: One left-to-right pass over the bytes; no backtracking, no second pass per field.
//! Invariants: Column kinds are fixed by the first data row and enforced on every later row.
//! Invariants: CR bytes are ignored wherever they occur; rejection carries no reason.
//! Notes: The schema tape is a `Vec<Symbol>` addressed by index; index 0 is the start marker.
use tracing::trace;

use crate::core::number::MAX_DIGITS;
use crate::core::schema::FieldKind;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Symbol {
    String,
    Number,
    Blank,
    StartBeforeFirstRow,
    StartAfterFirstRow,
    Stop,
    StringStop,
    NumberStop,
}

impl Symbol {
    fn is_stop(self) -> bool {
        matches!(self, Symbol::Stop | Symbol::StringStop | Symbol::NumberStop)
    }

    fn is_typed_stop(self) -> bool {
        matches!(self, Symbol::StringStop | Symbol::NumberStop)
    }

    fn kind(self) -> Option<FieldKind> {
        match self {
            Symbol::Number | Symbol::NumberStop => Some(FieldKind::Number),
            Symbol::String | Symbol::StringStop => Some(FieldKind::String),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Master,
    Final,
    Trap,
    EndHeader,
    NumberMinus,
    NumberBefore,
    NumberPoint,
    NumberAfter,
    StringText,
    StringFinal,
}

impl State {
    fn is_field_end(self) -> bool {
        matches!(
            self,
            State::NumberBefore | State::NumberAfter | State::StringFinal
        )
    }
}

/// Outcome of a validation pass: the verdict plus the shape observed on acceptance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scan {
    pub accepted: bool,
    pub records: usize,
    pub kinds: Vec<FieldKind>,
}

pub fn validate(bytes: &[u8], has_header: bool) -> bool {
    scan(bytes, has_header).accepted
}

pub fn scan(bytes: &[u8], has_header: bool) -> Scan {
    let mut machine = Machine::new(has_header);
    for &byte in bytes {
        machine.step(byte);
    }
    machine.finish()
}

struct Machine {
    state: State,
    tape: Vec<Symbol>,
    head: usize,
    has_header: bool,
    records: usize,
    digits: usize,
}

impl Machine {
    fn new(has_header: bool) -> Self {
        Self {
            state: State::Master,
            tape: vec![Symbol::StartBeforeFirstRow],
            head: 0,
            has_header,
            records: 0,
            digits: 0,
        }
    }

    fn read(&self) -> Symbol {
        self.tape[self.head]
    }

    fn write(&mut self, symbol: Symbol) {
        self.tape[self.head] = symbol;
    }

    fn append(&mut self, symbol: Symbol) {
        self.tape.push(symbol);
        self.head = self.tape.len() - 1;
    }

    // True while the tape is still growing: the header, or the first row of a header-less file.
    fn writing_first_row(&self) -> bool {
        self.head + 1 == self.tape.len() && !self.read().is_stop()
    }

    fn step(&mut self, byte: u8) {
        if self.state == State::Trap || byte == b'\r' {
            return;
        }
        let mut next = if self.writing_first_row() {
            if self.has_header {
                self.header_step(byte)
            } else {
                self.first_row_step(byte)
            }
        } else if self.state == State::EndHeader {
            self.head = 0;
            self.write(Symbol::StartAfterFirstRow);
            self.head = 1;
            self.type_field(byte)
        } else if self.state == State::Master && matches!(self.read(), Symbol::Blank | Symbol::Stop)
        {
            self.type_field(byte)
        } else {
            self.check_step(byte)
        };
        // Every entry into NumberBefore/NumberAfter consumes exactly one digit.
        match next {
            State::NumberBefore | State::NumberAfter => {
                self.digits += 1;
                if self.digits > MAX_DIGITS {
                    next = State::Trap;
                }
            }
            State::NumberPoint => {}
            _ => self.digits = 0,
        }
        trace!(
            byte = %byte.escape_ascii(),
            from = ?self.state,
            to = ?next,
            column = self.head,
            symbol = ?self.read(),
            "grammar transition"
        );
        if next == State::Final {
            self.records += 1;
        }
        self.state = next;
    }

    fn header_step(&mut self, byte: u8) -> State {
        match (self.state, byte) {
            (State::Master, b'"') => {
                self.append(Symbol::Blank);
                State::StringText
            }
            (State::StringText, b'"') => State::StringFinal,
            (State::StringText, b'\n') => State::Trap,
            (State::StringText, _) => State::StringText,
            (State::StringFinal, b',') => State::Master,
            (State::StringFinal, b'\n') => {
                self.write(Symbol::Stop);
                State::EndHeader
            }
            _ => State::Trap,
        }
    }

    fn first_row_step(&mut self, byte: u8) -> State {
        if self.read() == Symbol::StartBeforeFirstRow {
            self.write(Symbol::StartAfterFirstRow);
        }
        match self.state {
            State::Master => match byte {
                b'0'..=b'9' => {
                    self.append(Symbol::Number);
                    State::NumberBefore
                }
                b'-' => {
                    self.append(Symbol::Number);
                    State::NumberMinus
                }
                b'"' => {
                    self.append(Symbol::String);
                    State::StringText
                }
                _ => State::Trap,
            },
            state if state.is_field_end() && byte == b'\n' => {
                self.mark_last_column();
                State::Final
            }
            state if state.is_field_end() && byte == b',' => State::Master,
            state => within_field(state, byte),
        }
    }

    fn mark_last_column(&mut self) {
        match self.read() {
            Symbol::Number => self.write(Symbol::NumberStop),
            Symbol::String => self.write(Symbol::StringStop),
            _ => {}
        }
    }

    // First byte of a field in the first data row after a header: fixes the column kind.
    fn type_field(&mut self, byte: u8) -> State {
        let last = self.read() == Symbol::Stop;
        match byte {
            b'0'..=b'9' | b'-' => {
                self.write(if last { Symbol::NumberStop } else { Symbol::Number });
                if byte == b'-' {
                    State::NumberMinus
                } else {
                    State::NumberBefore
                }
            }
            b'"' => {
                self.write(if last { Symbol::StringStop } else { Symbol::String });
                State::StringText
            }
            _ => State::Trap,
        }
    }

    fn check_step(&mut self, byte: u8) -> State {
        match self.state {
            state if state.is_field_end() && byte == b',' => {
                if self.read().is_stop() {
                    // more fields than the tape
                    return State::Trap;
                }
                self.head += 1;
                State::Master
            }
            state if state.is_field_end() && byte == b'\n' => {
                if self.read().is_typed_stop() {
                    State::Final
                } else {
                    State::Trap
                }
            }
            State::Master => self.expect_kind(byte),
            State::Final => {
                self.head = 1;
                self.expect_kind(byte)
            }
            state => within_field(state, byte),
        }
    }

    fn expect_kind(&self, byte: u8) -> State {
        match (self.read().kind(), byte) {
            (Some(FieldKind::Number), b'0'..=b'9') => State::NumberBefore,
            (Some(FieldKind::Number), b'-') => State::NumberMinus,
            (Some(FieldKind::String), b'"') => State::StringText,
            _ => State::Trap,
        }
    }

    fn finish(mut self) -> Scan {
        if self.state.is_field_end() {
            if self.read().is_typed_stop() {
                self.state = State::Final;
                self.records += 1;
            } else if !self.has_header && self.records == 0 && self.writing_first_row() {
                // single header-less row without a trailing newline
                self.mark_last_column();
                self.state = State::Final;
                self.records += 1;
            }
        }
        let accepted = self.state == State::Final;
        trace!(accepted, records = self.records, "grammar pass finished");
        let kinds = if accepted {
            self.tape.iter().filter_map(|symbol| symbol.kind()).collect()
        } else {
            Vec::new()
        };
        Scan {
            accepted,
            records: if accepted { self.records } else { 0 },
            kinds,
        }
    }
}

// Transitions inside a number or string field (no field boundary involved).
fn within_field(state: State, byte: u8) -> State {
    match (state, byte) {
        (State::NumberMinus, b'0'..=b'9') => State::NumberBefore,
        (State::NumberBefore, b'0'..=b'9') => State::NumberBefore,
        (State::NumberBefore, b'.') => State::NumberPoint,
        (State::NumberPoint, b'0'..=b'9') => State::NumberAfter,
        (State::NumberAfter, b'0'..=b'9') => State::NumberAfter,
        (State::StringText, b'"') => State::StringFinal,
        (State::StringText, b'\n') => State::Trap,
        (State::StringText, _) => State::StringText,
        _ => State::Trap,
    }
}
