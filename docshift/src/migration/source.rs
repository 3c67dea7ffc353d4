use crate::errors::DocShiftResult;
use crate::migration::{MigrationContext, MigrationUnit, Transform};

/// Lists the named migration units known to an application.
///
/// The order of the returned units carries no meaning; the loader sorts by
/// identifier.
pub trait MigrationSource: Send + Sync {
    fn list_units(&self) -> DocShiftResult<Vec<MigrationUnit>>;
}

/// Explicit manifest of migration units.
///
/// ```rust,ignore
/// let registry = MigrationRegistry::new()
///     .register("1-add-status", add_status_up, add_status_down)
///     .register_unit(MigrationUnit::new("2-rename-title").up_transform(rename).down_transform(unrename));
/// ```
#[derive(Clone, Default, Debug)]
pub struct MigrationRegistry {
    units: Vec<MigrationUnit>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        MigrationRegistry { units: Vec::new() }
    }

    /// Registers a unit with both directions.
    pub fn register<U, D>(self, name: &str, up: U, down: D) -> Self
    where
        U: Fn(&MigrationContext) -> DocShiftResult<()> + Send + Sync + 'static,
        D: Fn(&MigrationContext) -> DocShiftResult<()> + Send + Sync + 'static,
    {
        self.register_unit(
            MigrationUnit::new(name)
                .up_transform(Transform::new(up))
                .down_transform(Transform::new(down)),
        )
    }

    pub fn register_unit(mut self, unit: MigrationUnit) -> Self {
        self.add(unit);
        self
    }

    pub fn add(&mut self, unit: MigrationUnit) {
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl MigrationSource for MigrationRegistry {
    fn list_units(&self) -> DocShiftResult<Vec<MigrationUnit>> {
        Ok(self.units.clone())
    }
}
