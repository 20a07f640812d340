//! The execution engine: tape, pointer, and per-step dispatch.
//!
//! The machine maintains:
//! - the validated instruction stream (a [`Program`]),
//! - a zero-initialized memory tape sized by [`RunConfig`],
//! - a data pointer indexing into that tape,
//! - a stack of loop-origin indices for bracket jumps.
//!
//! Bracket targets are resolved on demand: a false `[` skips forward with a
//! depth counter, a true `]` jumps back to the origin on top of the stack.
//! Validation has already guaranteed both scans stay inside the stream.

use std::thread;
use std::time::Duration;

use crate::config::RunConfig;
use crate::error::RunError;
use crate::io::{unit_to_byte, InputSource, OutputSink};
use crate::program::Program;

/// Machine state lent to a step observer before each dispatch.
pub struct StepView<'a> {
    pub ip: usize,
    pub op: char,
    pub ptr: usize,
    pub tape: &'a [u8],
    pub loop_origins: &'a [usize],
}

/// One in-flight run: exclusive owner of its tape, pointer, and loop stack.
pub struct Machine {
    program: Program,
    tape: Vec<u8>,
    ptr: usize,
    ip: usize,
    loop_origins: Vec<usize>,
    step_delay: Option<Duration>,
    observer: Option<Box<dyn Fn(StepView<'_>)>>,
}

impl Machine {
    /// Build a machine for `program` with a fresh zeroed tape.
    ///
    /// Fails with [`RunError::InvalidTapeLength`] if the configured tape
    /// holds no cells.
    pub fn new(program: Program, config: &RunConfig) -> Result<Self, RunError> {
        if config.tape_length == 0 {
            return Err(RunError::InvalidTapeLength { given: 0 });
        }
        Ok(Self {
            program,
            tape: vec![0; config.tape_length],
            ptr: 0,
            ip: 0,
            loop_origins: Vec::new(),
            step_delay: config.step_delay,
            observer: None,
        })
    }

    /// Install a hook invoked before each dispatch with a borrowed view of
    /// the machine state. Purely observational: it cannot alter control
    /// flow or program output.
    pub fn set_step_observer<F>(&mut self, observer: F)
    where
        F: Fn(StepView<'_>) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Execute the program to completion.
    ///
    /// The run ends when the instruction pointer walks off the end of the
    /// stream; every error is fatal and leaves the machine where it stopped.
    pub fn run(
        &mut self,
        input: &mut dyn InputSource,
        output: &mut dyn OutputSink,
    ) -> Result<(), RunError> {
        while self.ip < self.program.len() {
            let op = self.program.ops()[self.ip];

            if let Some(observer) = self.observer.as_ref() {
                observer(StepView {
                    ip: self.ip,
                    op,
                    ptr: self.ptr,
                    tape: &self.tape,
                    loop_origins: &self.loop_origins,
                });
            }

            match op {
                '>' => {
                    if self.ptr + 1 == self.tape.len() {
                        return Err(RunError::PointerOutOfBounds {
                            ip: self.ip,
                            ptr: self.ptr,
                            op,
                        });
                    }
                    self.ptr += 1;
                }
                '<' => {
                    if self.ptr == 0 {
                        return Err(RunError::PointerOutOfBounds {
                            ip: self.ip,
                            ptr: self.ptr,
                            op,
                        });
                    }
                    self.ptr -= 1;
                }
                '+' => {
                    // Wrapping is a semantic of the cell, not an overflow: 255+1=0.
                    self.tape[self.ptr] = self.tape[self.ptr].wrapping_add(1);
                }
                '-' => {
                    self.tape[self.ptr] = self.tape[self.ptr].wrapping_sub(1);
                }
                '.' => {
                    output
                        .emit(self.tape[self.ptr])
                        .map_err(|source| RunError::Io { ip: self.ip, source })?;
                }
                ',' => {
                    let unit = input
                        .read_unit()
                        .map_err(|source| RunError::Io { ip: self.ip, source })?;
                    self.tape[self.ptr] = unit_to_byte(unit.as_deref());
                }
                '[' => {
                    if self.tape[self.ptr] != 0 {
                        self.loop_origins.push(self.ip);
                    } else {
                        // Land on the matching ']'; the shared advance below
                        // resumes at the instruction after it.
                        self.ip = self.matching_close(self.ip);
                    }
                }
                ']' => {
                    if self.tape[self.ptr] == 0 {
                        self.loop_origins.pop();
                    } else {
                        // Peek, don't pop: the next ']' re-checks this level.
                        // Resuming at origin + 1 keeps the '[' from pushing twice.
                        self.ip = *self
                            .loop_origins
                            .last()
                            .expect("validated brackets leave the loop origin on the stack");
                    }
                }
                _ => {} // pass-through character
            }

            self.ip += 1;

            if let Some(delay) = self.step_delay {
                thread::sleep(delay);
            }
        }

        Ok(())
    }

    /// Index of the `]` matching the `[` at `open`, via an iterative
    /// depth-tracked scan.
    fn matching_close(&self, open: usize) -> usize {
        let ops = self.program.ops();
        let mut depth = 1usize;
        let mut i = open;
        while depth > 0 {
            i += 1;
            match ops[i] {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
        }
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{CaptureSink, QueuedInput};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn machine(code: &str, tape_length: usize) -> Machine {
        let program = Program::parse(code).expect("test program should validate");
        let config = RunConfig::default().with_tape_length(tape_length);
        Machine::new(program, &config).expect("test machine should build")
    }

    fn run_capturing(code: &str, tape_length: usize) -> (Machine, Vec<u8>) {
        let mut m = machine(code, tape_length);
        let mut input = QueuedInput::default();
        let mut output = CaptureSink::new();
        m.run(&mut input, &mut output).expect("program should run");
        let bytes = output.bytes().to_vec();
        (m, bytes)
    }

    #[test]
    fn zero_length_tape_is_rejected() {
        let program = Program::parse("+").unwrap();
        let config = RunConfig::default().with_tape_length(0);
        let result = Machine::new(program, &config);
        assert!(matches!(result, Err(RunError::InvalidTapeLength { given: 0 })));
    }

    #[test]
    fn wrapping_addition() {
        let code = "+".repeat(256); // 256 increments wrap back to 0
        let (m, _) = run_capturing(&code, 1);
        assert_eq!(m.tape[0], 0);
    }

    #[test]
    fn wrapping_subtraction() {
        let (m, _) = run_capturing("-", 1);
        assert_eq!(m.tape[0], 255);
    }

    #[test]
    fn left_pointer_out_of_bounds_errors() {
        let mut m = machine("<", 10);
        let result = m.run(&mut QueuedInput::default(), &mut CaptureSink::new());
        assert!(matches!(
            result,
            Err(RunError::PointerOutOfBounds { ip: 0, ptr: 0, op: '<' })
        ));
    }

    #[test]
    fn right_pointer_out_of_bounds_errors() {
        // With 3 cells (0..=2), the 3rd '>' attempts to move beyond index 2.
        let mut m = machine(">>>", 3);
        let result = m.run(&mut QueuedInput::default(), &mut CaptureSink::new());
        assert!(matches!(
            result,
            Err(RunError::PointerOutOfBounds { ip: 2, ptr: 2, op: '>' })
        ));
    }

    #[test]
    fn pointer_never_wraps_on_a_single_cell_tape() {
        let mut m = machine(">", 1);
        let result = m.run(&mut QueuedInput::default(), &mut CaptureSink::new());
        assert!(matches!(result, Err(RunError::PointerOutOfBounds { .. })));
    }

    #[test]
    fn false_loop_skips_arbitrarily_nested_body() {
        // Cell is 0, so control resumes after the matching ']' and the
        // trailing '+' still executes.
        let (m, bytes) = run_capturing("[[[.]].]+", 4);
        assert!(bytes.is_empty());
        assert_eq!(m.tape[0], 1);
    }

    #[test]
    fn loop_drains_cell_to_zero() {
        let (m, _) = run_capturing("+++[-]", 4);
        assert_eq!(m.tape[0], 0);
        assert!(m.loop_origins.is_empty());
    }

    #[test]
    fn empty_loop_on_zero_cell_is_ok() {
        let (m, _) = run_capturing("[]", 4);
        assert_eq!(m.tape[0], 0);
    }

    #[test]
    fn nested_loop_multiplication_runs() {
        // 8 * 8 = 64 ('@') via the classic doubling loop.
        let (_, bytes) = run_capturing("++++++++[>++++++++<-]>.", 30_000);
        assert_eq!(bytes, vec![64]);
    }

    #[test]
    fn output_emits_current_cell() {
        let (_, bytes) = run_capturing("+++.", 4);
        assert_eq!(bytes, vec![3]);
    }

    #[test]
    fn input_stores_first_byte_of_unit() {
        let mut m = machine(",.", 4);
        let mut input = QueuedInput::new(["A"]);
        let mut output = CaptureSink::new();
        m.run(&mut input, &mut output).unwrap();
        assert_eq!(output.bytes(), b"A");
    }

    #[test]
    fn each_comma_consumes_one_unit() {
        let mut m = machine(",>,<..>.", 4);
        let mut input = QueuedInput::new(["xyz", "q"]);
        let mut output = CaptureSink::new();
        m.run(&mut input, &mut output).unwrap();
        assert_eq!(output.bytes(), b"xxq");
    }

    #[test]
    fn exhausted_input_stores_zero() {
        let mut m = machine("+,", 4);
        let mut input = QueuedInput::default();
        m.run(&mut input, &mut CaptureSink::new()).unwrap();
        assert_eq!(m.tape[0], 0);
    }

    #[test]
    fn non_instruction_characters_are_no_ops() {
        let (m, bytes) = run_capturing("+a+b+", 4);
        assert_eq!(m.tape[0], 3);
        assert!(bytes.is_empty());
        assert_eq!(m.ptr, 0);
    }

    #[test]
    fn observer_sees_state_before_each_dispatch() {
        let seen: Rc<RefCell<Vec<(usize, char, u8)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut m = machine("+-", 4);
        m.set_step_observer(move |view| {
            sink.borrow_mut().push((view.ip, view.op, view.tape[view.ptr]));
        });
        m.run(&mut QueuedInput::default(), &mut CaptureSink::new()).unwrap();

        // The '-' step observes the cell before its own effect is applied.
        assert_eq!(&*seen.borrow(), &[(0, '+', 0), (1, '-', 1)]);
    }

    #[test]
    fn observer_sees_loop_origins() {
        let depths: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&depths);

        let mut m = machine("+[-]", 4);
        m.set_step_observer(move |view| {
            sink.borrow_mut().push(view.loop_origins.len());
        });
        m.run(&mut QueuedInput::default(), &mut CaptureSink::new()).unwrap();

        // '+' and '[' dispatch outside the loop; '-' and ']' inside it.
        assert_eq!(&*depths.borrow(), &[0, 0, 1, 1]);
    }

    #[test]
    fn observer_does_not_change_output() {
        let (_, plain) = run_capturing("++.>+.", 4);

        let mut m = machine("++.>+.", 4);
        m.set_step_observer(|_| {});
        let mut output = CaptureSink::new();
        m.run(&mut QueuedInput::default(), &mut output).unwrap();

        assert_eq!(output.bytes(), plain.as_slice());
    }

    #[test]
    fn repeated_runs_from_fresh_machines_are_identical() {
        let code = "++++[>++++<-]>.";
        let (_, first) = run_capturing(code, 16);
        let (_, second) = run_capturing(code, 16);
        assert_eq!(first, second);
    }
}
