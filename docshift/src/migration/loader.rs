use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::migration::{Migration, MigrationSource};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+").expect("identifier pattern is valid")
});

/// Extracts the numeric identifier from the leading digits of a name.
///
/// Leading whitespace is ignored, leading zeros are allowed: `"007-seed"`
/// yields `7`.
///
/// # Errors
///
/// [`ErrorKind::MissingIdentifier`] if the name does not start with a digit or
/// the number does not fit in a `u64`.
pub fn parse_identifier(name: &str) -> DocShiftResult<u64> {
    let digits = IDENTIFIER
        .find(name.trim_start())
        .map(|m| m.as_str())
        .ok_or_else(|| {
            DocShiftError::new(
                &format!("Migration '{}' does not start with a numeric identifier", name),
                ErrorKind::MissingIdentifier,
            )
        })?;

    digits.parse::<u64>().map_err(|_| {
        DocShiftError::new(
            &format!("Identifier of migration '{}' is out of range", name),
            ErrorKind::MissingIdentifier,
        )
    })
}

/// Loads, validates and orders every unit of `source`.
///
/// The result is sorted strictly ascending by identifier, whatever order the
/// source listed the units in.
///
/// # Errors
///
/// - [`ErrorKind::MissingIdentifier`] for a name without leading digits
/// - [`ErrorKind::MissingDirection`] for a unit lacking `up` or `down`
/// - [`ErrorKind::DuplicateIdentifier`] when two names share an identifier
pub fn load_migrations(source: &dyn MigrationSource) -> DocShiftResult<Vec<Migration>> {
    let units = source.list_units()?;
    let mut migrations = Vec::with_capacity(units.len());

    for unit in units {
        let id = parse_identifier(unit.name())?;
        let (name, up, down) = unit.into_parts();

        let (up, down) = match (up, down) {
            (Some(up), Some(down)) => (up, down),
            (up, _) => {
                let missing = if up.is_none() { "up" } else { "down" };
                return Err(DocShiftError::new(
                    &format!("Migration '{}' has no '{}' transform", name, missing),
                    ErrorKind::MissingDirection,
                ));
            }
        };

        migrations.push(Migration::new(id, name, up, down));
    }

    migrations.sort_by_key(|m| m.id());

    if let Some((first, second)) = migrations
        .iter()
        .tuple_windows()
        .find(|(a, b)| a.id() == b.id())
    {
        return Err(DocShiftError::new(
            &format!(
                "Migrations '{}' and '{}' share identifier {}",
                first.name(),
                second.name(),
                first.id()
            ),
            ErrorKind::DuplicateIdentifier,
        ));
    }

    log::debug!("Loaded {} migrations", migrations.len());
    Ok(migrations)
}
