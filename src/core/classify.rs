// VarSleuth - core/classify.rs
//
// Variability classification: splits every variable in a LogDocument into
// the changing set and the static mapping. Pure function, no I/O.

use crate::core::model::{Classification, LogDocument, Value};

/// Count distinct values under type-aware equality.
///
/// `Value` is not `Eq`/`Hash` (it holds `f64`), so distinctness is a linear
/// scan against the values kept so far. A `NaN` is never equal to anything
/// and therefore always counts as a new distinct value.
pub fn distinct_count(values: &[&Value]) -> usize {
    let mut distinct: Vec<&Value> = Vec::new();
    for &value in values {
        if !distinct.iter().any(|seen| *seen == value) {
            distinct.push(value);
        }
    }
    distinct.len()
}

/// Classify each variable in `document` as changing or static.
///
/// Snapshots that do not mention a variable are ignored for that variable;
/// absence is not a value. Every variable name ends up in exactly one of the
/// two outputs.
pub fn classify(document: &LogDocument) -> Classification {
    let mut classification = Classification::default();

    for name in document.variable_names() {
        let values: Vec<&Value> = document.values_of(name).collect();

        if distinct_count(&values) > 1 {
            classification.changing.insert(name.to_string());
        } else if let Some(&first) = values.first() {
            classification
                .static_values
                .insert(name.to_string(), first.clone());
        }
    }

    tracing::debug!(
        changing = classification.changing.len(),
        static_count = classification.static_values.len(),
        "Classification complete"
    );

    classification
}
