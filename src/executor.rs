//! Runs an ordered list of statements through a session, committing after
//! each one and stopping at the first failure.

use crate::pipeline::{PipelineError, Stage, StageReport, StatementOutcome};
use crate::statements::Statement;
use crate::warehouse::WarehouseSession;
use std::time::Instant;
use tracing::{debug, error, info};

/// Executes and commits `statements` in order.
///
/// Statements before a failing one stay committed; nothing after it runs.
/// There are no retries.
pub fn execute_statements(
    session: &mut dyn WarehouseSession,
    stage: Stage,
    statements: &[Statement],
) -> Result<StageReport, PipelineError> {
    if statements.is_empty() {
        return Err(PipelineError::EmptyStage(stage));
    }

    let stage_start = Instant::now();
    let mut outcomes = Vec::with_capacity(statements.len());
    info!("{}: running {} statements", stage, statements.len());

    for (index, statement) in statements.iter().enumerate() {
        let position = index + 1;
        let start = Instant::now();
        debug!(
            "{}: {}/{} {} on {}",
            stage,
            position,
            statements.len(),
            statement.name,
            statement.table
        );

        if let Err(source) = session.execute(statement) {
            error!(
                "{}: statement {}/{} ({}) failed: {}",
                stage,
                position,
                statements.len(),
                statement.name,
                source
            );
            return Err(PipelineError::Statement {
                stage,
                position,
                name: statement.name.clone(),
                source,
            });
        }

        if let Err(source) = session.commit() {
            error!(
                "{}: commit after {} ({}) failed: {}",
                stage, position, statement.name, source
            );
            return Err(PipelineError::Commit {
                stage,
                position,
                name: statement.name.clone(),
                source,
            });
        }

        let elapsed = start.elapsed();
        info!(
            "{}: {}/{} {} committed in {}ms",
            stage,
            position,
            statements.len(),
            statement.name,
            elapsed.as_millis()
        );
        outcomes.push(StatementOutcome {
            position,
            name: statement.name.clone(),
            table: statement.table,
            elapsed,
        });
    }

    let elapsed = stage_start.elapsed();
    info!(
        "{}: {} statements committed in {:?}",
        stage,
        outcomes.len(),
        elapsed
    );
    Ok(StageReport {
        stage,
        statements: outcomes,
        elapsed,
    })
}
