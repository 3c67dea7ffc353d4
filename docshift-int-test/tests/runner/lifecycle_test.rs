use docshift::common::{Value, MIGRATIONS_COLLECTION};
use docshift::config::Direction;
use docshift::doc;
use docshift::store::DocumentDatabaseProvider;
use docshift_int_test::test_util::{
    cleanup, create_test_context, journal, recording_registry, run_test,
};

// ==================== Up ====================

#[test]
fn test_first_run_applies_all_in_order() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let report = ctx
                .runner(recording_registry(&[2, 3, 1], &journal))
                .run(&ctx.up_config()?)?;

            assert_eq!(report.direction, Direction::Up);
            assert_eq!(report.starting_version, 0);
            assert_eq!(report.pending, vec!["1-step", "2-step", "3-step"]);
            assert_eq!(report.applied, vec![1, 2, 3]);
            assert_eq!(report.final_version, 3);
            assert_eq!(*journal.lock(), vec!["up 1", "up 2", "up 3"]);
            assert_eq!(ctx.ledger_version()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_ledger_advances_after_each_migration() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            ctx.runner(recording_registry(&[1, 2, 3], &journal))
                .run(&ctx.up_config()?)?;

            // one marker write per applied migration
            assert_eq!(ctx.connector().upserts(), 3);
            assert_eq!(ctx.database().count(MIGRATIONS_COLLECTION), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_second_up_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let runner = ctx.runner(recording_registry(&[1, 2, 3], &journal));
            runner.run(&ctx.up_config()?)?;
            let writes = ctx.connector().upserts();
            journal.lock().clear();
            ctx.reporter().clear();

            let report = runner.run(&ctx.up_config()?)?;
            assert!(report.pending.is_empty());
            assert!(report.applied.is_empty());
            assert_eq!(report.final_version, 3);
            assert!(journal.lock().is_empty());
            assert_eq!(ctx.connector().upserts(), writes);
            assert!(ctx.reporter().contains("Already up to date"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_new_migrations_resume_from_ledger() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            ctx.runner(recording_registry(&[1, 2], &journal))
                .run(&ctx.up_config()?)?;
            journal.lock().clear();

            let report = ctx
                .runner(recording_registry(&[1, 2, 5, 4], &journal))
                .run(&ctx.up_config()?)?;
            assert_eq!(report.starting_version, 2);
            assert_eq!(report.applied, vec![4, 5]);
            assert_eq!(*journal.lock(), vec!["up 4", "up 5"]);
            assert_eq!(ctx.ledger_version()?, 5);
            Ok(())
        },
        cleanup,
    )
}

// ==================== Down ====================

#[test]
fn test_down_to_target_reverts_descending() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let runner = ctx.runner(recording_registry(&[1, 2, 3], &journal));
            runner.run(&ctx.up_config()?)?;
            journal.lock().clear();

            let report = runner.run(&ctx.down_config(1)?)?;
            assert_eq!(report.direction, Direction::Down);
            assert_eq!(report.pending, vec!["3-step", "2-step"]);
            assert_eq!(report.applied, vec![3, 2]);
            assert_eq!(report.final_version, 1);
            assert_eq!(*journal.lock(), vec!["down 3", "down 2"]);
            assert_eq!(ctx.ledger_version()?, 1);
            assert!(ctx.reporter().contains("Reverting 3-step"));
            assert!(ctx.reporter().contains("Reverted 2-step"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_round_trip_to_zero() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let runner = ctx.runner(recording_registry(&[1, 2, 3, 4], &journal));
            runner.run(&ctx.up_config()?)?;
            journal.lock().clear();

            runner.run(&ctx.down_config(0)?)?;
            assert_eq!(*journal.lock(), vec!["down 4", "down 3", "down 2", "down 1"]);
            assert_eq!(ctx.ledger_version()?, 0);

            // the marker is kept at zero, not removed
            let marker = ctx
                .database()
                .find_one(MIGRATIONS_COLLECTION, &Value::from("default"))?;
            assert!(marker.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_down_from_seeded_ledger() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.set_ledger_version(3)?;
            let journal = journal();

            let report = ctx
                .runner(recording_registry(&[1, 2, 3, 4], &journal))
                .run(&ctx.down_config(1)?)?;
            // 4 was never applied, so it is not reverted
            assert_eq!(report.applied, vec![3, 2]);
            assert_eq!(ctx.ledger_version()?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_down_above_current_is_up_to_date() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.set_ledger_version(2)?;
            let journal = journal();
            let report = ctx
                .runner(recording_registry(&[1, 2, 3], &journal))
                .run(&ctx.down_config(2)?)?;

            assert!(report.applied.is_empty());
            assert!(journal.lock().is_empty());
            assert!(ctx.reporter().contains("Already up to date"));
            Ok(())
        },
        cleanup,
    )
}

// ==================== Dry run ====================

#[test]
fn test_dry_run_leaves_ledger_alone() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.set_ledger_version(1)?;
            let journal = journal();
            let config = ctx.config().dry_run(true).build()?;

            let report = ctx
                .runner(recording_registry(&[1, 2, 3], &journal))
                .run(&config)?;
            assert!(report.dry_run);
            assert_eq!(report.pending, vec!["2-step", "3-step"]);
            assert!(report.applied.is_empty());
            assert_eq!(report.final_version, 1);
            assert!(journal.lock().is_empty());
            assert_eq!(ctx.connector().upserts(), 0);
            assert_eq!(ctx.ledger_version()?, 1);
            assert!(ctx.reporter().contains("  2-step"));
            assert!(ctx.reporter().contains("  3-step"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_dry_run_down_lists_descending() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.set_ledger_version(3)?;
            let journal = journal();
            let config = ctx
                .config()
                .direction("down")
                .target_version(0)
                .dry_run(true)
                .build()?;

            let report = ctx
                .runner(recording_registry(&[1, 2, 3], &journal))
                .run(&config)?;
            assert_eq!(report.pending, vec!["3-step", "2-step", "1-step"]);
            assert_eq!(ctx.ledger_version()?, 3);
            Ok(())
        },
        cleanup,
    )
}

// ==================== Configuration ====================

#[test]
fn test_custom_migrations_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let config = ctx.config().migrations_collection("schema_history").build()?;
            ctx.runner(recording_registry(&[1, 2], &journal)).run(&config)?;

            let database = ctx.database();
            assert_eq!(database.count(MIGRATIONS_COLLECTION), 0);
            let marker = database
                .find_one("schema_history", &Value::from("default"))?
                .expect("marker should exist");
            assert_eq!(marker.get("migId").and_then(|v| v.as_u64()), Some(2));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_marker_extra_fields_survive() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.database().insert(
                MIGRATIONS_COLLECTION,
                doc! { "_id": "default", "migId": 1, "team": "billing" },
            )?;
            let journal = journal();
            ctx.runner(recording_registry(&[1, 2], &journal))
                .run(&ctx.up_config()?)?;

            let marker = ctx
                .database()
                .find_one(MIGRATIONS_COLLECTION, &Value::from("default"))?
                .expect("marker should exist");
            assert_eq!(marker.get("team"), Some(&Value::from("billing")));
            assert_eq!(*journal.lock(), vec!["up 2"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_resumes_from_marker_stored_as_double() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.database().insert(
                MIGRATIONS_COLLECTION,
                doc! { "_id": "default", "migId": 2.0 },
            )?;
            let journal = journal();
            let report = ctx
                .runner(recording_registry(&[1, 2, 3], &journal))
                .run(&ctx.up_config()?)?;

            assert_eq!(report.starting_version, 2);
            assert_eq!(report.applied, vec![3]);
            assert_eq!(*journal.lock(), vec!["up 3"]);
            assert_eq!(ctx.ledger_version()?, 3);
            Ok(())
        },
        cleanup,
    )
}
