//! # Step Emitter
//!
//! Walks the chain hanging off the Start block and emits animation steps.

use super::block_handlers::{self, DEFAULT_TIMES};
use crate::config::{CompileOptions, IdPolicy};
use crate::error::CompileWarning;
use crate::graph::{Block, BlockGraph, BlockId, BlockKind, SLOT_TIMES};
use crate::program::{AnimationStep, Program};
use crate::resolver::ValueResolver;
use std::collections::HashSet;

/// Result of one compilation: the program plus every recovered problem.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub program: Program,
    pub warnings: Vec<CompileWarning>,
}

/// Chain walker producing a [`Program`] from a [`BlockGraph`].
pub struct StepEmitter<'a> {
    graph: &'a BlockGraph,
    resolver: ValueResolver<'a>,
    options: &'a CompileOptions,
    visited: HashSet<BlockId>,
    warnings: Vec<CompileWarning>,
    /// Steps emitted so far, counted against `max_steps`.
    emitted: usize,
}

impl<'a> StepEmitter<'a> {
    pub fn new(graph: &'a BlockGraph, options: &'a CompileOptions) -> Self {
        Self {
            graph,
            resolver: ValueResolver::new(graph),
            options,
            visited: HashSet::new(),
            warnings: Vec::new(),
            emitted: 0,
        }
    }

    /// Compile the whole graph. A graph without a Start block yields an empty program.
    pub fn generate_program(mut self) -> Compilation {
        let Some(start) = self.find_start() else {
            tracing::debug!("[EMIT] No start block, program is empty");
            return Compilation {
                program: Program::new(),
                warnings: self.warnings,
            };
        };

        self.visited.insert(start.id().clone());
        let steps = self.emit_chain(start.next(), 0);

        let steps = match self.options.id_policy {
            IdPolicy::Fresh => steps,
            IdPolicy::Structural => steps
                .iter()
                .enumerate()
                .map(|(index, step)| step.with_id(format!("{}:{}", index, step.kind())))
                .collect(),
        };

        Compilation {
            program: Program::from_steps(steps),
            warnings: self.warnings,
        }
    }

    fn find_start(&mut self) -> Option<&'a Block> {
        let graph = self.graph;
        let starts: Vec<&'a Block> = graph
            .top_blocks()
            .into_iter()
            .filter(|block| *block.kind() == BlockKind::Start)
            .collect();

        let first = *starts.first()?;
        if starts.len() > 1 {
            self.warn(CompileWarning::MultipleStarts {
                count: starts.len(),
                used: first.id().clone(),
            });
        }
        Some(first)
    }

    /// Emit steps for the chain beginning at `head`.
    ///
    /// Iterates over `next`; only Repeat bodies recurse.
    fn emit_chain(&mut self, head: Option<&'a BlockId>, depth: usize) -> Vec<AnimationStep> {
        let graph = self.graph;
        let mut steps = Vec::new();
        let mut cursor = head;

        while let Some(id) = cursor {
            let Some(block) = graph.block(id) else {
                break;
            };
            if !self.visited.insert(block.id().clone()) {
                self.warn(CompileWarning::CycleDetected {
                    block: block.id().clone(),
                });
                break;
            }

            tracing::debug!("[EMIT] {} ({}) at depth {}", block.id(), block.kind(), depth);

            match block.kind() {
                BlockKind::Move | BlockKind::Rotate | BlockKind::Scale | BlockKind::Pause => {
                    if let Some(step) =
                        block_handlers::emit_step(block, &self.resolver, &mut self.warnings)
                    {
                        self.emitted += 1;
                        steps.push(step);
                    }
                }
                BlockKind::Repeat => {
                    let unrolled = self.emit_repeat(block, depth);
                    steps.extend(unrolled);
                }
                BlockKind::Start => {
                    self.warn(CompileWarning::UnexpectedStart {
                        block: block.id().clone(),
                    });
                }
                BlockKind::NumberLiteral => {
                    self.warn(CompileWarning::UnexpectedBlock {
                        block: block.id().clone(),
                        kind: block.kind().to_string(),
                    });
                }
                BlockKind::Custom(name) => {
                    self.warn(CompileWarning::UnknownBlockKind {
                        block: block.id().clone(),
                        kind: name.clone(),
                    });
                }
            }

            cursor = block.next();
        }

        steps
    }

    /// Compile the body once, then append `n` freshly-id'd copies of it.
    ///
    /// `n` is bounded by `max_repeat` and by what is left of `max_steps`.
    fn emit_repeat(&mut self, block: &'a Block, depth: usize) -> Vec<AnimationStep> {
        let times = block_handlers::param(
            &self.resolver,
            &mut self.warnings,
            block,
            SLOT_TIMES,
            DEFAULT_TIMES,
        );
        let requested = times.max(0.0).floor();
        let mut count = if requested > self.options.max_repeat as f64 {
            self.options.max_repeat
        } else {
            requested as usize
        };

        let body = self.emit_chain(block.statement_slot(), depth + 1);
        // the body is only counted through its copies
        self.emitted -= body.len();
        if !body.is_empty() {
            let remaining = self.options.max_steps.saturating_sub(self.emitted);
            count = count.min(remaining / body.len());
        }
        if (count as f64) < requested {
            self.warn(CompileWarning::RepeatClamped {
                block: block.id().clone(),
                requested,
                limit: count,
            });
        }
        self.emitted += body.len() * count;

        tracing::debug!(
            "[EMIT] Repeat {} unrolls {} steps x{}",
            block.id(),
            body.len(),
            count
        );

        let mut steps = Vec::with_capacity(body.len() * count);
        for _ in 0..count {
            steps.extend(body.iter().map(AnimationStep::with_fresh_id));
        }
        steps
    }

    fn warn(&mut self, warning: CompileWarning) {
        tracing::warn!("[EMIT] {}", warning);
        self.warnings.push(warning);
    }
}
