//! FSA Text Codec
//! Reads and writes the line-oriented automaton format

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::config::AutomatonConfig;
use crate::fsm::{Automaton, StateId};


#[derive(Parser)]
#[grammar = "parser/fsa.pest"]
pub struct FsaParser;

/// Record keywords, in the order records are written
pub const KEYWORDS: [&str; 4] = ["state", "transition", "initial", "final"];

/// Event token standing for an epsilon transition
pub const EPSILON_TOKEN: &str = "?";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("I/O error: {0}")]
    Resource(#[from] io::Error),
}

impl CodecError {
    fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// 1-based line of a format error
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } => Some(*line),
            Self::Resource(_) => None,
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

// ============================================================================
// READING
// ============================================================================

/// Read records from `reader` into `automaton`.
///
/// Stops at the first bad line. Records accepted before it stay applied, so
/// callers wanting all-or-nothing should read into a fresh automaton.
pub fn read_fsa<R: BufRead>(reader: R, automaton: &mut Automaton) -> CodecResult<()> {
    let mut records = RecordReader::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if let Err(err) = records.apply(index + 1, &line, automaton) {
            warn!("Aborting read: {}", err);
            return Err(err);
        }
    }

    debug!(
        "Read {} state(s) and {} transition(s)",
        automaton.state_count(),
        automaton.transition_count()
    );
    Ok(())
}

pub fn read_str(source: &str, automaton: &mut Automaton) -> CodecResult<()> {
    read_fsa(source.as_bytes(), automaton)
}

pub fn read_file(path: impl AsRef<Path>, automaton: &mut Automaton) -> CodecResult<()> {
    let file = File::open(path)?;
    read_fsa(BufReader::new(file), automaton)
}

/// Parse text into a new automaton
pub fn parse_fsa(source: &str) -> CodecResult<Automaton> {
    parse_fsa_with(source, AutomatonConfig::default())
}

pub fn parse_fsa_with(source: &str, config: AutomatonConfig) -> CodecResult<Automaton> {
    let mut automaton = Automaton::with_config(config);
    read_str(source, &mut automaton)?;
    Ok(automaton)
}

/// Applies records to an automaton, tracking which names this read declared
#[derive(Debug, Default)]
struct RecordReader {
    declared: HashSet<String>,
}

impl RecordReader {
    fn apply(&mut self, line_no: usize, text: &str, automaton: &mut Automaton) -> CodecResult<()> {
        let mut pairs = FsaParser::parse(Rule::line, text)
            .map_err(|e| CodecError::format(line_no, describe_syntax_error(text, e)))?;

        let Some(record) = pairs.next().and_then(|line| line.into_inner().next()) else {
            return Ok(());
        };

        match record.as_rule() {
            Rule::state_record => self.read_state(line_no, record, automaton),
            Rule::transition_record => self.read_transition(line_no, record, automaton),
            Rule::initial_record => {
                let id = self.declared_state(line_no, record, automaton)?;
                automaton
                    .set_initial(id, true)
                    .map_err(|e| CodecError::format(line_no, e.to_string()))
            }
            Rule::final_record => {
                let id = self.declared_state(line_no, record, automaton)?;
                automaton
                    .set_final(id, true)
                    .map_err(|e| CodecError::format(line_no, e.to_string()))
            }
            // Comments and blank lines
            _ => Ok(()),
        }
    }

    fn read_state(
        &mut self,
        line_no: usize,
        record: Pair<Rule>,
        automaton: &mut Automaton,
    ) -> CodecResult<()> {
        let mut fields = record.into_inner();
        let name = next_field(&mut fields, line_no)?;
        let x = parse_coordinate(next_field(&mut fields, line_no)?, line_no)?;
        let y = parse_coordinate(next_field(&mut fields, line_no)?, line_no)?;

        automaton
            .new_state(name, x, y)
            .map_err(|e| CodecError::format(line_no, e.to_string()))?;
        self.declared.insert(name.to_string());
        Ok(())
    }

    fn read_transition(
        &mut self,
        line_no: usize,
        record: Pair<Rule>,
        automaton: &mut Automaton,
    ) -> CodecResult<()> {
        let mut fields = record.into_inner();
        let from = self.lookup(next_field(&mut fields, line_no)?, line_no, automaton)?;
        let event = next_field(&mut fields, line_no)?;
        let to = self.lookup(next_field(&mut fields, line_no)?, line_no, automaton)?;

        let event = (event != EPSILON_TOKEN).then_some(event);
        automaton
            .new_transition(from, to, event)
            .map_err(|e| CodecError::format(line_no, e.to_string()))?;
        Ok(())
    }

    fn declared_state(
        &self,
        line_no: usize,
        record: Pair<Rule>,
        automaton: &Automaton,
    ) -> CodecResult<StateId> {
        let mut fields = record.into_inner();
        let name = next_field(&mut fields, line_no)?;
        self.lookup(name, line_no, automaton)
    }

    /// Resolve a name declared by an earlier `state` record of this read
    fn lookup(&self, name: &str, line_no: usize, automaton: &Automaton) -> CodecResult<StateId> {
        if !self.declared.contains(name) {
            return Err(CodecError::format(
                line_no,
                format!("state '{}' has not been declared", name),
            ));
        }
        automaton
            .find_state(name)
            .map(|state| state.id())
            .ok_or_else(|| CodecError::format(line_no, format!("state '{}' no longer exists", name)))
    }
}

fn next_field<'i>(fields: &mut Pairs<'i, Rule>, line_no: usize) -> CodecResult<&'i str> {
    fields
        .next()
        .map(|pair| pair.as_str())
        .ok_or_else(|| CodecError::format(line_no, "missing field"))
}

fn parse_coordinate(token: &str, line_no: usize) -> CodecResult<i32> {
    token
        .parse()
        .map_err(|_| CodecError::format(line_no, format!("coordinate '{}' is out of range", token)))
}

fn describe_syntax_error(text: &str, error: pest::error::Error<Rule>) -> String {
    let keyword = text.split_whitespace().next().unwrap_or_default();
    if !KEYWORDS.contains(&keyword) {
        return format!("unknown record type '{}'", keyword);
    }

    let error = error.renamed_rules(|rule| match rule {
        Rule::field => "name".to_string(),
        Rule::integer => "integer".to_string(),
        Rule::event | Rule::epsilon => "event name or '?'".to_string(),
        Rule::EOI => "end of line".to_string(),
        Rule::line => "fields".to_string(),
        other => format!("{:?}", other),
    });
    format!("malformed {} record: {}", keyword, error.variant.message())
}

// ============================================================================
// WRITING
// ============================================================================

/// Write `automaton` as state, transition, initial and final records
pub fn write_fsa<W: Write>(mut writer: W, automaton: &Automaton) -> CodecResult<()> {
    for record in records(automaton) {
        writer.write_all(record.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_file(path: impl AsRef<Path>, automaton: &Automaton) -> CodecResult<()> {
    let file = File::create(path)?;
    write_fsa(BufWriter::new(file), automaton)
}

/// Render `automaton` in the text format
pub fn to_text(automaton: &Automaton) -> String {
    records(automaton)
        .map(|record| record + "\n")
        .collect()
}

fn records(automaton: &Automaton) -> impl Iterator<Item = String> + '_ {
    let states = automaton
        .states()
        .map(|s| format!("state {} {} {}", s.name(), s.x(), s.y()));

    let transitions = automaton.transitions().filter_map(move |t| {
        let from = automaton.state(t.from())?;
        let to = automaton.state(t.to())?;
        let event = if t.is_epsilon() { EPSILON_TOKEN } else { t.event() };
        Some(format!("transition {} {} {}", from.name(), event, to.name()))
    });

    let initials = automaton
        .initial_states()
        .map(|s| format!("initial {}", s.name()));
    let finals = automaton
        .final_states()
        .map(|s| format!("final {}", s.name()));

    states.chain(transitions).chain(initials).chain(finals)
}
