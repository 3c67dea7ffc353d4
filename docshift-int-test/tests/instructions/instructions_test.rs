use docshift::common::Value;
use docshift::doc;
use docshift::migration::instructions::{add_field, add_field_with, change_field, delete_field, rename_field};
use docshift::migration::{MigrationRegistry, MigrationUnit};
use docshift::store::DocumentDatabaseProvider;
use docshift_int_test::test_util::{cleanup, create_test_context, run_test, TestContext};

fn seed_users(ctx: &TestContext) -> docshift::errors::DocShiftResult<()> {
    ctx.database().insert_many(
        "users",
        vec![
            doc! { "_id": "u1", "name": "Alice", "age": 30 },
            doc! { "_id": "u2", "name": "Bob", "age": 25 },
            doc! { "_id": "u3", "name": "Carol" },
        ],
    )?;
    Ok(())
}

fn users_registry() -> MigrationRegistry {
    MigrationRegistry::new()
        .register_unit(
            MigrationUnit::new("1-rename-name")
                .up_transform(rename_field("users", "name", "full_name"))
                .down_transform(rename_field("users", "full_name", "name")),
        )
        .register_unit(
            MigrationUnit::new("2-add-active")
                .up_transform(add_field("users", "active", true))
                .down_transform(delete_field("users", "active")),
        )
        .register_unit(
            MigrationUnit::new("3-age-bracket")
                .up_transform(add_field_with("users", "adult", |doc| {
                    Ok(Value::from(doc.get("age").and_then(|v| v.as_i64()).map(|age| age >= 18)))
                }))
                .down_transform(delete_field("users", "adult")),
        )
}

#[test]
fn test_declarative_migrations_up_and_down() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let database = ctx.database();

            ctx.runner(users_registry()).run(&ctx.up_config()?)?;
            let alice = database.find_one("users", &Value::from("u1"))?.expect("u1 exists");
            assert_eq!(alice.get("full_name"), Some(&Value::from("Alice")));
            assert_eq!(alice.get("active"), Some(&Value::from(true)));
            assert_eq!(alice.get("adult"), Some(&Value::from(true)));
            let carol = database.find_one("users", &Value::from("u3"))?.expect("u3 exists");
            assert_eq!(carol.get("adult"), Some(&Value::Null));

            ctx.runner(users_registry()).run(&ctx.down_config(0)?)?;
            let alice = database.find_one("users", &Value::from("u1"))?.expect("u1 exists");
            assert_eq!(alice, doc! { "_id": "u1", "name": "Alice", "age": 30 });
            assert_eq!(ctx.ledger_version()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_change_field_converts_types() {
    run_test(
        create_test_context,
        |ctx| {
            seed_users(&ctx)?;
            let registry = MigrationRegistry::new().register_unit(
                MigrationUnit::new("1-age-as-text")
                    .up_transform(change_field("users", "age", |v| Ok(Value::from(v.to_string()))))
                    .down_transform(change_field("users", "age", |v| {
                        Ok(v.as_string()
                            .and_then(|s| s.parse::<i64>().ok())
                            .map(Value::from)
                            .unwrap_or(v))
                    })),
            );

            ctx.runner(registry.clone()).run(&ctx.up_config()?)?;
            let bob = ctx.database().find_one("users", &Value::from("u2"))?.expect("u2 exists");
            assert_eq!(bob.get("age"), Some(&Value::from("25")));
            let carol = ctx.database().find_one("users", &Value::from("u3"))?.expect("u3 exists");
            assert!(!carol.contains_key("age"));

            ctx.runner(registry).run(&ctx.down_config(0)?)?;
            let bob = ctx.database().find_one("users", &Value::from("u2"))?.expect("u2 exists");
            assert_eq!(bob.get("age"), Some(&Value::from(25)));
            Ok(())
        },
        cleanup,
    )
}
