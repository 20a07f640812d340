//! Step-by-step execution tracing.
//!
//! A [`Tracer`] plugs into [`Machine::set_step_observer`] and prints one
//! table row per dispatch to stderr, leaving program output on stdout
//! untouched. Tracing never suppresses or simulates I/O; a traced run
//! produces byte-identical program output.
//!
//! [`Machine::set_step_observer`]: crate::machine::Machine::set_step_observer

use std::cell::Cell;

use crate::machine::StepView;

/// Tapes up to this many cells are dumped in full under each row.
const SMALL_TAPE_CELLS: usize = 50;

/// Prints a STEP/IP/PTR/CELL/INSTR/LOOPS table to stderr.
#[derive(Default)]
pub struct Tracer {
    step: Cell<usize>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer callback: one row per dispatch, header before the first.
    pub fn observe(&self, view: StepView<'_>) {
        let step = self.step.get();
        if step == 0 {
            eprintln!("STEP | IP  | PTR | CELL | INSTR | LOOPS");
            eprintln!("-----+-----+-----+------+-------+---------------------------------------");
        }

        eprintln!(
            "{:<4} | {:<3} | {:<3} | {:<4} |   {}   | {:?}",
            step,
            view.ip,
            view.ptr,
            view.tape[view.ptr],
            view.op,
            view.loop_origins,
        );

        if view.tape.len() <= SMALL_TAPE_CELLS {
            eprintln!("     | tape {:?}", view.tape);
        }

        self.step.set(step + 1);
    }
}
