// ============================================================
// FIELD MAPPER
// ============================================================
// Apply the operator's column mapping to parsed rows

use crate::domain::import::{Candidate, CandidateInput, ColumnMapping, FieldValues, Row};

/// Pure and total: never validates, never fails. A required field that is
/// unmapped simply arrives empty and is caught by the validator.
pub fn map_rows<I: CandidateInput>(rows: &[Row], mapping: &ColumnMapping) -> Vec<Candidate<I>> {
    rows.iter().map(|row| map_row(row, mapping)).collect()
}

pub fn map_row<I: CandidateInput>(row: &Row, mapping: &ColumnMapping) -> Candidate<I> {
    let values: FieldValues = I::DOMAIN
        .fields()
        .iter()
        .filter_map(|field| {
            let header = mapping.source_for(field)?;
            let value = row.get(header)?.trim();
            if value.is_empty() {
                None
            } else {
                Some((*field, value.to_string()))
            }
        })
        .collect();

    Candidate {
        index: row.index,
        line: row.line,
        input: I::from_values(&values),
    }
}
