//! `workbench todos` — Capture TODO markers from files into research notes.

use workbench_core::error::Result;
use workbench_tools::capture_todos;
use workbench_workflow::WorkflowState;

use super::Context;

pub fn run(ctx: &Context, paths: &[String], limit: usize) -> Result<()> {
    let mut state = WorkflowState::new();

    for path in paths {
        let capture = capture_todos(&ctx.resolver, path, limit)?;
        println!("{}\n", capture.display());
        if let Some(note) = capture.research_note() {
            state = state.with_research_note(note);
        }
    }

    println!("=== Captured Workflow State ===");
    print!("{}", state.render());
    Ok(())
}
