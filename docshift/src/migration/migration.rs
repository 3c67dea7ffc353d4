use crate::config::Direction;
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::migration::MigrationContext;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type TransformFn = dyn Fn(&MigrationContext) -> DocShiftResult<()> + Send + Sync + 'static;

/// One direction of a migration.
///
/// A transform receives a fresh [`MigrationContext`] and may rewrite any number
/// of collections through it. Cloning shares the underlying closure.
///
/// ```rust,ignore
/// let up = Transform::new(|ctx| {
///     ctx.update_collection("users", |mut doc| {
///         doc.put("active", true)?;
///         Ok(doc)
///     })?;
///     Ok(())
/// });
/// ```
#[derive(Clone)]
pub struct Transform {
    inner: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&MigrationContext) -> DocShiftResult<()> + Send + Sync + 'static,
    {
        Transform { inner: Arc::new(f) }
    }

    /// A transform that does nothing.
    pub fn noop() -> Self {
        Transform::new(|_| Ok(()))
    }

    /// Runs `self`, then `next` if `self` succeeded.
    pub fn then(self, next: Transform) -> Transform {
        Transform::new(move |ctx| {
            self.call(ctx)?;
            next.call(ctx)
        })
    }

    pub fn call(&self, ctx: &MigrationContext) -> DocShiftResult<()> {
        (self.inner)(ctx)
    }
}

impl Debug for Transform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transform(<fn>)")
    }
}

/// A named unit as listed by a [`MigrationSource`](crate::migration::MigrationSource).
///
/// Either direction may be missing here; the loader rejects such units with
/// [`ErrorKind::MissingDirection`].
#[derive(Clone, Debug)]
pub struct MigrationUnit {
    name: String,
    up: Option<Transform>,
    down: Option<Transform>,
}

impl MigrationUnit {
    pub fn new(name: &str) -> Self {
        MigrationUnit {
            name: name.to_string(),
            up: None,
            down: None,
        }
    }

    pub fn up<F>(self, f: F) -> Self
    where
        F: Fn(&MigrationContext) -> DocShiftResult<()> + Send + Sync + 'static,
    {
        self.up_transform(Transform::new(f))
    }

    pub fn down<F>(self, f: F) -> Self
    where
        F: Fn(&MigrationContext) -> DocShiftResult<()> + Send + Sync + 'static,
    {
        self.down_transform(Transform::new(f))
    }

    pub fn up_transform(mut self, transform: Transform) -> Self {
        self.up = Some(transform);
        self
    }

    pub fn down_transform(mut self, transform: Transform) -> Self {
        self.down = Some(transform);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_up(&self) -> bool {
        self.up.is_some()
    }

    pub fn has_down(&self) -> bool {
        self.down.is_some()
    }

    pub(crate) fn into_parts(self) -> (String, Option<Transform>, Option<Transform>) {
        (self.name, self.up, self.down)
    }
}

/// A loaded, validated migration.
///
/// Built only by the loader; immutable afterwards.
#[derive(Clone)]
pub struct Migration {
    id: u64,
    name: String,
    up: Transform,
    down: Transform,
}

impl Migration {
    pub(crate) fn new(id: u64, name: String, up: Transform, down: Transform) -> Self {
        Migration { id, name, up, down }
    }

    /// Identifier parsed from the leading digits of the name.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the transform for `direction`.
    ///
    /// Any failure is reported as [`ErrorKind::TransformError`] naming this
    /// migration, with the original error kept as the cause.
    pub fn apply(&self, direction: Direction, ctx: &MigrationContext) -> DocShiftResult<()> {
        let transform = match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        };

        transform.call(ctx).map_err(|cause| {
            log::error!(
                "Migration {} failed while migrating {}: {}",
                self.name,
                direction,
                cause
            );
            DocShiftError::new_with_cause(
                &format!("Migration {} failed while migrating {}", self.name, direction),
                ErrorKind::TransformError,
                cause,
            )
        })
    }
}

impl Debug for Migration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
