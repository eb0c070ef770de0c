use super::model::Table;

// ---------------------------------------------------------------------------
// Type-consistency check
// ---------------------------------------------------------------------------

/// Outcome of [`check_data_types`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheck {
    /// One warning per discrete column that is stored as a number.
    pub warnings: Vec<String>,
    /// Whether the run may go on. Mismatches are advisory, so this is
    /// always `true`.
    pub proceed: bool,
}

/// Flag columns the user called discrete whose storage is numeric.
///
/// The numeric list is accepted for symmetry with the selection but a numeric
/// label on a text column is caught later by the model, not here.
pub fn check_data_types(table: &Table, _numeric: &[String], discrete: &[String]) -> TypeCheck {
    let warnings: Vec<String> = discrete
        .iter()
        .filter_map(|var| table.column(var))
        .filter(|col| col.kind.is_numeric())
        .map(|col| {
            format!(
                "The variable '{}' was identified as discrete but is of numeric type ({}). \
                 Please double check your selection. The program may continue, but the \
                 results might not be accurate.",
                col.name, col.kind
            )
        })
        .collect();

    for w in &warnings {
        log::warn!("{w}");
    }

    TypeCheck {
        warnings,
        proceed: true,
    }
}
