//! Ready-made transforms for common field edits.
//!
//! Each function returns a [`Transform`] that rewrites one collection through
//! [`MigrationContext::update_collection`]. Transforms compose with
//! [`Transform::then`], so a migration can be assembled from several of them:
//!
//! ```rust,ignore
//! let up = rename_field("users", "name", "full_name")
//!     .then(add_field("users", "active", true));
//! let down = delete_field("users", "active")
//!     .then(rename_field("users", "full_name", "name"));
//! registry.register_unit(MigrationUnit::new("4-users").up_transform(up).down_transform(down));
//! ```
//!
//! The `_id` field is off limits to every instruction.

use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::migration::{MigrationContext, Transform};

fn check_field(field: &str) -> DocShiftResult<()> {
    if field.is_empty() {
        return Err(DocShiftError::new("Field name cannot be empty", ErrorKind::InvalidFieldName));
    }
    if field == DOC_ID {
        return Err(DocShiftError::new(
            &format!("Field '{}' cannot be modified by a migration instruction", DOC_ID),
            ErrorKind::InvalidFieldName,
        ));
    }
    Ok(())
}

/// Renames `old_name` to `new_name` in every document that has it.
pub fn rename_field(collection: &str, old_name: &str, new_name: &str) -> Transform {
    let (collection, old_name, new_name) =
        (collection.to_string(), old_name.to_string(), new_name.to_string());

    Transform::new(move |ctx: &MigrationContext| {
        check_field(&old_name)?;
        check_field(&new_name)?;
        let stats = ctx.update_collection(&collection, |mut doc| {
            doc.rename_field(&old_name, &new_name)?;
            Ok(doc)
        })?;
        log::debug!("Renamed '{}' to '{}' in {} documents of '{}'", old_name, new_name, stats.documents, collection);
        Ok(())
    })
}

/// Removes `field` from every document.
pub fn delete_field(collection: &str, field: &str) -> Transform {
    let (collection, field) = (collection.to_string(), field.to_string());

    Transform::new(move |ctx: &MigrationContext| {
        check_field(&field)?;
        ctx.update_collection(&collection, |mut doc| {
            doc.remove(&field);
            Ok(doc)
        })?;
        Ok(())
    })
}

/// Sets `field` to `value` in every document.
pub fn add_field<T: Into<Value>>(collection: &str, field: &str, value: T) -> Transform {
    let value = value.into();
    add_field_with(collection, field, move |_| Ok(value.clone()))
}

/// Sets `field` in every document to a value computed from that document.
pub fn add_field_with<F>(collection: &str, field: &str, generator: F) -> Transform
where
    F: Fn(&Document) -> DocShiftResult<Value> + Send + Sync + 'static,
{
    let (collection, field) = (collection.to_string(), field.to_string());

    Transform::new(move |ctx: &MigrationContext| {
        check_field(&field)?;
        ctx.update_collection(&collection, |mut doc| {
            let value = generator(&doc)?;
            doc.put(&field, value)?;
            Ok(doc)
        })?;
        Ok(())
    })
}

/// Replaces the value of `field` with `converter(value)` where present.
pub fn change_field<F>(collection: &str, field: &str, converter: F) -> Transform
where
    F: Fn(Value) -> DocShiftResult<Value> + Send + Sync + 'static,
{
    let (collection, field) = (collection.to_string(), field.to_string());

    Transform::new(move |ctx: &MigrationContext| {
        check_field(&field)?;
        ctx.update_collection(&collection, |mut doc| {
            if let Some(value) = doc.remove(&field) {
                doc.put(&field, converter(value)?)?;
            }
            Ok(doc)
        })?;
        Ok(())
    })
}
