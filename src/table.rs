//! Machines are exchanged as `;`-separated tables in which every column belongs to a state and
//! every row to an input symbol. The first cell of each row is a label, which is empty for the
//! header rows.
//!
//! A Moore machine starts with a row of outputs, followed by a row of state names:
//! ```text
//! ;y1;y2;y1
//! ;q0;q1;q2
//! a;q1;q2;
//! b;q0;q0;q2
//! ```
//! A Mealy machine has only the row of state names, its cells hold the successor together with
//! the emitted output:
//! ```text
//! ;q0;q1
//! a;q1/y1;q0/y2
//! b;;q1/y1
//! ```
//! In both cases the first state is the initial one and an empty cell is an undefined
//! transition. An empty output cell in a Moore table means that the state has no output.
//!
//! Cells are taken literally, there is no quoting. A `"` is part of the name or output it
//! appears in, and names cannot contain `;`.

use std::{
    fmt::Display,
    io::{Read, Write},
};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{error::AutomatonError, transition_system::Target, Color, MealyMachine, MooreMachine};

/// Errors that can occur when reading or writing a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Reading or writing failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The input is not valid `;`-separated data.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// One of the header rows is missing.
    #[error("table is missing the {0} row")]
    MissingRow(&'static str),
    /// A row has more or fewer cells than there are states.
    #[error("line {line} has {found} cells but {expected} states are declared")]
    RowLength {
        /// Line on which the row starts.
        line: u64,
        /// Number of cells after the label.
        found: usize,
        /// Number of declared states.
        expected: usize,
    },
    /// A cell of a Mealy table is neither empty nor of the form `state/output`.
    #[error("cell `{cell}` on line {line} is not of the form `state/output`")]
    MalformedCell {
        /// Line on which the cell occurs.
        line: u64,
        /// Content of the cell.
        cell: String,
    },
    /// The table describes an invalid machine.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

fn read_records<R: Read>(reader: R) -> Result<Vec<csv::StringRecord>, TableError> {
    let records = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_records()
        .collect::<Result<Vec<_>, _>>()?;
    trace!("read {} records", records.len());
    Ok(records)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(csv::Position::line).unwrap_or_default()
}

fn non_empty(cell: &str) -> Option<&str> {
    (!cell.is_empty()).then_some(cell)
}

/// Splits a transition row into its label and its cells, checking that there is one cell
/// per state.
fn transition_row(
    record: &csv::StringRecord,
    expected: usize,
) -> Result<(&str, Vec<&str>), TableError> {
    let mut fields = record.iter();
    let label = fields.next().unwrap_or_default();
    let cells: Vec<&str> = fields.collect();
    if cells.len() != expected {
        return Err(TableError::RowLength {
            line: line_of(record),
            found: cells.len(),
            expected,
        });
    }
    Ok((label, cells))
}

/// The table stores one row per input symbol, machines are built from one row per state.
fn transpose<T: Copy>(columns: &[Vec<T>], states: usize) -> Vec<Vec<T>> {
    (0..states)
        .map(|q| columns.iter().map(|column| column[q]).collect())
        .collect()
}

/// Reads a Moore machine from a table with a row of outputs, a row of states and one row
/// per input symbol.
pub fn read_moore<R: Read>(reader: R) -> Result<MooreMachine, TableError> {
    let records = read_records(reader)?;
    let mut records = records.iter();
    let output_row = records.next().ok_or(TableError::MissingRow("output"))?;
    let state_row = records.next().ok_or(TableError::MissingRow("state"))?;

    let states: Vec<&str> = state_row.iter().skip(1).collect();
    let outputs: Vec<Option<&str>> = output_row.iter().skip(1).map(non_empty).collect();
    if outputs.len() != states.len() {
        return Err(TableError::RowLength {
            line: line_of(output_row),
            found: outputs.len(),
            expected: states.len(),
        });
    }

    let mut inputs = vec![];
    let mut columns = vec![];
    for record in records {
        let (input, cells) = transition_row(record, states.len())?;
        inputs.push(input);
        columns.push(cells.into_iter().map(non_empty).collect::<Vec<_>>());
    }
    debug!(
        "read Moore table with {} states and {} input symbols",
        states.len(),
        inputs.len()
    );

    let rows = transpose(&columns, states.len());
    Ok(MooreMachine::new(states, inputs, outputs, rows)?)
}

fn mealy_cell<'a>(
    record: &csv::StringRecord,
    cell: &'a str,
) -> Result<Option<(&'a str, &'a str)>, TableError> {
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.split_once('/') {
        Some((target, output)) if !target.trim().is_empty() && !output.trim().is_empty() => {
            Ok(Some((target.trim(), output.trim())))
        }
        _ => Err(TableError::MalformedCell {
            line: line_of(record),
            cell: cell.to_string(),
        }),
    }
}

/// Reads a Mealy machine from a table with a row of states and one row per input symbol,
/// whose cells are of the form `state/output`.
pub fn read_mealy<R: Read>(reader: R) -> Result<MealyMachine, TableError> {
    let records = read_records(reader)?;
    let mut records = records.iter();
    let state_row = records.next().ok_or(TableError::MissingRow("state"))?;
    let states: Vec<&str> = state_row.iter().skip(1).collect();

    let mut inputs = vec![];
    let mut columns = vec![];
    for record in records {
        let (input, cells) = transition_row(record, states.len())?;
        inputs.push(input);
        columns.push(
            cells
                .into_iter()
                .map(|cell| mealy_cell(record, cell))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    debug!(
        "read Mealy table with {} states and {} input symbols",
        states.len(),
        inputs.len()
    );

    let rows = transpose(&columns, states.len());
    Ok(MealyMachine::new(states, inputs, rows)?)
}

fn table_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer)
}

/// Writes `moore` in the same layout that [`read_moore`] accepts.
pub fn write_moore<O, W>(moore: &MooreMachine<O>, writer: W) -> Result<(), TableError>
where
    O: Color + Display,
    W: Write,
{
    let mut table = table_writer(writer);
    table.write_record(
        std::iter::once(String::new()).chain(moore.state_indices().map(|q| {
            moore
                .state_color(q)
                .and_then(Option::as_ref)
                .map(ToString::to_string)
                .unwrap_or_default()
        })),
    )?;
    table.write_record(std::iter::once("").chain(moore.states().iter().map(String::as_str)))?;
    for (a, input) in moore.inputs().iter().enumerate() {
        table.write_record(
            std::iter::once(input.as_str()).chain(
                moore
                    .state_indices()
                    .map(|q| match moore.successor(q, a) {
                        Target::State(p) => moore.states()[p].as_str(),
                        Target::Undefined => "",
                    }),
            ),
        )?;
    }
    table.flush()?;
    Ok(())
}

/// Writes `mealy` in the same layout that [`read_mealy`] accepts.
pub fn write_mealy<O, W>(mealy: &MealyMachine<O>, writer: W) -> Result<(), TableError>
where
    O: Color + Display,
    W: Write,
{
    let mut table = table_writer(writer);
    table.write_record(std::iter::once("").chain(mealy.states().iter().map(String::as_str)))?;
    for (a, input) in mealy.inputs().iter().enumerate() {
        table.write_record(std::iter::once(input.clone()).chain(mealy.state_indices().map(
            |q| match mealy.edge(q, a).map(|e| (e.target(), e.color())) {
                Some((Target::State(p), Some(output))) => {
                    format!("{}/{output}", mealy.states()[p])
                }
                _ => String::new(),
            },
        )))?;
    }
    table.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    const MOORE: &str = "\
;0;0;1
;q0;q1;q2
a;q1;q1;q1
b;q2;q2;q2
";

    const MEALY: &str = "\
;s0;s1;s2;s3;s4
x;s1/0;s3/1;s3/1;s1/1;s0/0
y;s2/1;s0/0;;s0/0;s4/0
";

    fn written<F: FnOnce(&mut Vec<u8>) -> Result<(), TableError>>(f: F) -> String {
        let mut buf = vec![];
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn read_moore_table() {
        let moore = table::read_moore(MOORE.as_bytes()).unwrap();
        assert_eq!(moore, crate::tests::merging_moore());
    }

    #[test]
    fn read_mealy_table() {
        let mealy = table::read_mealy(MEALY.as_bytes()).unwrap();
        assert_eq!(mealy, crate::tests::partial_mealy());
    }

    #[test_log::test]
    fn minimize_moore_table() {
        let moore = table::read_moore(MOORE.as_bytes()).unwrap();
        let minimal = moore.minimize().unwrap();
        let out = written(|buf| table::write_moore(&minimal, buf));
        assert_eq!(out, ";0;1\n;X1;X2\na;X1;X1\nb;X2;X2\n");
    }

    #[test_log::test]
    fn minimize_mealy_table() {
        let mealy = table::read_mealy(MEALY.as_bytes()).unwrap();
        let minimal = mealy.minimize().unwrap();
        let out = written(|buf| table::write_mealy(&minimal, buf));
        assert_eq!(out, ";X1;X2;X3\nx;X2/0;X2/1;X2/1\ny;X3/1;X1/0;\n");
        assert_eq!(table::read_mealy(out.as_bytes()).unwrap(), minimal);
    }

    #[test]
    fn empty_cells() {
        let moore = table::read_moore(" ; ;1\n;p;q\na;;p\n".as_bytes()).unwrap();
        assert_eq!(moore.output_of("p"), None);
        assert_eq!(moore.output_of("q"), Some(&"1".to_string()));
        assert_eq!(moore.next("p", "a"), Some(Target::Undefined));
        let out = written(|buf| table::write_moore(&moore, buf));
        assert_eq!(out, ";;1\n;p;q\na;;p\n");
    }

    #[test]
    fn quotes_are_part_of_names() {
        let input = ";\"hi\";1\n;q\"0;q1\nx;q1;q\"0\n";
        let moore = table::read_moore(input.as_bytes()).unwrap();
        assert_eq!(moore.states(), ["q\"0", "q1"]);
        assert_eq!(moore.output_of("q\"0"), Some(&"\"hi\"".to_string()));
        assert_eq!(moore.next("q1", "x"), Some(Target::State("q\"0")));
        let out = written(|buf| table::write_moore(&moore, buf));
        assert_eq!(out, input);

        let mealy = table::read_mealy(";\"s\nx;\"s/\"o\n".as_bytes()).unwrap();
        assert_eq!(mealy.output("\"s", "x"), Some(&"\"o".to_string()));
        let out = written(|buf| table::write_mealy(&mealy, buf));
        assert_eq!(out, ";\"s\nx;\"s/\"o\n");
    }

    #[test]
    fn malformed_tables() {
        assert!(matches!(
            table::read_moore("".as_bytes()),
            Err(TableError::MissingRow("output"))
        ));
        assert!(matches!(
            table::read_moore(";0;1\n".as_bytes()),
            Err(TableError::MissingRow("state"))
        ));
        assert!(matches!(
            table::read_moore(";0;1\n;q0;q1\na;q1\n".as_bytes()),
            Err(TableError::RowLength {
                line: 3,
                found: 1,
                expected: 2
            })
        ));
        assert!(matches!(
            table::read_moore(";0\n;q0;q1\na;q1;q0\n".as_bytes()),
            Err(TableError::RowLength { line: 1, .. })
        ));
        assert!(matches!(
            table::read_moore(";0;1\n;q0;q1\na;q1;q9\n".as_bytes()),
            Err(TableError::Automaton(
                AutomatonError::UnknownStateReference { .. }
            ))
        ));
        assert!(matches!(
            table::read_mealy(";q0\na;q0\n".as_bytes()),
            Err(TableError::MalformedCell { line: 2, .. })
        ));
        assert!(matches!(
            table::read_mealy(";q0\na;q0/\n".as_bytes()),
            Err(TableError::MalformedCell { .. })
        ));
        assert!(matches!(
            table::read_mealy(";\na;\n".as_bytes()),
            Err(TableError::Automaton(AutomatonError::MalformedAutomaton(_)))
        ));
    }
}
