//! # Block Compiler
//!
//! Main entry points for compiling block graphs to animation programs.

use crate::config::CompileOptions;
use crate::emit::{Compilation, StepEmitter};
use crate::graph::BlockGraph;
use crate::program::Program;

/// Compile a block graph to an animation program
///
/// This is the main entry point for the compiler. It walks the chain hanging
/// off the graph's Start block, unrolls Repeat blocks, and returns the
/// resulting steps in execution order.
///
/// Compilation is total: malformed values fall back to defaults and
/// unexpected blocks are skipped, each logged as a warning. A graph without
/// a Start block compiles to an empty program.
///
/// # Examples
///
/// ```rust
/// use mbgc::{compile, BlockGraph, BlockKind};
///
/// let mut graph = BlockGraph::new();
/// let start = graph.create_block(BlockKind::Start);
/// let pause = graph.create_block(BlockKind::Pause);
/// graph.connect_next(&start, &pause)?;
///
/// let program = compile(&graph);
/// assert_eq!(program.len(), 1);
/// # Ok::<(), mbgc::GraphError>(())
/// ```
pub fn compile(graph: &BlockGraph) -> Program {
    compile_with_options(graph, &CompileOptions::default()).program
}

/// Compile a block graph with explicit options
///
/// # Arguments
///
/// * `graph` - The block graph to compile
/// * `options` - Step id policy and repeat limits
///
/// # Returns
///
/// The compiled [`Program`] together with every warning recorded on the way.
pub fn compile_with_options(graph: &BlockGraph, options: &CompileOptions) -> Compilation {
    tracing::info!("[MBGC] Starting block compilation");
    tracing::info!(
        "[MBGC] Graph: {} blocks, {} top-level",
        graph.len(),
        graph.top_blocks().len()
    );

    let compilation = StepEmitter::new(graph, options).generate_program();

    if compilation.program.is_empty() {
        tracing::info!("[MBGC] Compilation produced an empty program");
    } else {
        tracing::info!(
            "[MBGC] Compilation complete ({} steps, {:.2}s)",
            compilation.program.len(),
            compilation.program.total_duration()
        );
    }
    if !compilation.warnings.is_empty() {
        tracing::info!("[MBGC] {} warnings", compilation.warnings.len());
    }

    compilation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BlockKind;

    #[test]
    fn test_no_start_compiles_to_empty_program() {
        let mut graph = BlockGraph::new();
        let moved = graph.create_block(BlockKind::Move);
        let pause = graph.create_block(BlockKind::Pause);
        graph.connect_next(&moved, &pause).unwrap();

        assert!(compile(&graph).is_empty());
        assert!(compile(&BlockGraph::new()).is_empty());
    }

    #[test]
    fn test_start_without_chain_is_empty() {
        let mut graph = BlockGraph::new();
        graph.create_block(BlockKind::Start);
        let compilation = compile_with_options(&graph, &CompileOptions::default());
        assert!(compilation.program.is_empty());
        assert!(compilation.warnings.is_empty());
    }
}
