// ============================================================
// RESULT EXPORTER
// ============================================================
// Per-row outcomes -> downloadable CSV

use csv::Writer;

use crate::domain::error::{AppError, Result};
use crate::domain::import::{CandidateInput, Disposition, RowOutcome, ValidationResult};

const RESULT_HEADERS: [&str; 4] = ["row", "phone", "disposition", "error"];

/// Stable column order, one header row, rows as given
pub fn to_csv(outcomes: &[RowOutcome]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(RESULT_HEADERS)?;

    for outcome in outcomes {
        let line = outcome.line.to_string();
        writer.write_record([
            line.as_str(),
            outcome.phone.as_str(),
            outcome.disposition.as_str(),
            outcome.message.as_deref().unwrap_or(""),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush result CSV: {}", e)))
}

/// Outcomes for rows the validator kept out of the commit
pub fn rejected_outcomes<I: CandidateInput>(validation: &ValidationResult<I>) -> Vec<RowOutcome> {
    let rejected = validation.errors.iter().map(|r| RowOutcome {
        index: r.candidate.index,
        line: r.candidate.line,
        phone: r.candidate.input.phone().unwrap_or_default().to_string(),
        disposition: Disposition::Rejected,
        message: Some(
            r.errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        ),
    });

    let unlinked = validation.link_failed.iter().map(|r| RowOutcome {
        index: r.candidate.index,
        line: r.candidate.line,
        phone: r.candidate.input.phone().unwrap_or_default().to_string(),
        disposition: Disposition::LinkFailed,
        message: Some(r.failure.reason.clone()),
    });

    rejected.chain(unlinked).collect()
}

/// Every input row: commit outcomes plus validation rejects, in file order
pub fn full_report<I: CandidateInput>(
    validation: &ValidationResult<I>,
    committed: &[RowOutcome],
) -> Result<Vec<u8>> {
    let mut outcomes = rejected_outcomes(validation);
    outcomes.extend(committed.iter().cloned());
    outcomes.sort_by_key(|o| o.index);
    to_csv(&outcomes)
}
