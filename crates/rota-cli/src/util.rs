use rota_core::error::CoreError;
use rota_core::models::Routine;

/// Finds a routine by exact id, falling back to a unique id prefix.
pub fn resolve_routine_index(routines: &[Routine], short_id: &str) -> Result<usize, CoreError> {
    if let Some(index) = routines.iter().position(|r| r.id == short_id) {
        return Ok(index);
    }
    if short_id.len() < 2 {
        return Err(CoreError::NotFound(format!(
            "{short_id} (ID prefixes need at least 2 characters)"
        )));
    }

    let matches: Vec<usize> = routines
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id.starts_with(short_id))
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(CoreError::NotFound(short_id.to_string())),
        _ => Err(CoreError::AmbiguousId(
            matches
                .iter()
                .map(|i| (routines[*i].id.clone(), routines[*i].title.clone()))
                .collect(),
        )),
    }
}
