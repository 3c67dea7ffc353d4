use docshift::config::ShiftConfig;
use docshift::errors::{DocShiftError, ErrorKind};
use docshift::migration::{MigrationRegistry, MigrationRunner, MigrationUnit};
use docshift::report::MemoryReporter;
use docshift::store::memory::InMemoryConnector;
use docshift_int_test::test_util::{
    cleanup, create_test_context, journal, recording_registry, run_test,
};

// ==================== Load errors ====================

#[test]
fn test_missing_identifier_applies_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let registry = recording_registry(&[1, 2], &journal)
                .register("add-indexes", |_| Ok(()), |_| Ok(()));

            let err = ctx.runner(registry).run(&ctx.up_config()?).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MissingIdentifier);
            assert!(err.kind().is_load_error());
            assert!(journal.lock().is_empty());
            assert_eq!(ctx.connector().memory().opened_connections(), 0);
            assert_eq!(ctx.ledger_version()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_duplicate_identifier_applies_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let registry = recording_registry(&[1, 2], &journal)
                .register("02-again", |_| Ok(()), |_| Ok(()));

            let err = ctx.runner(registry).run(&ctx.up_config()?).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateIdentifier);
            assert!(journal.lock().is_empty());
            assert_eq!(ctx.connector().memory().opened_connections(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_direction_applies_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let registry = recording_registry(&[1], &journal)
                .register_unit(MigrationUnit::new("2-forward-only").up(|_| Ok(())));

            let err = ctx.runner(registry).run(&ctx.up_config()?).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MissingDirection);
            assert!(journal.lock().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_direction_is_rejected() {
    let err = ShiftConfig::builder()
        .direction("sideways")
        .database_name("shop")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidDirection);
}

// ==================== Transform errors ====================

#[test]
fn test_transform_failure_keeps_prior_progress() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let registry = recording_registry(&[1, 2], &journal)
                .register(
                    "3-broken",
                    |_| Err(DocShiftError::new("duplicate key", ErrorKind::BackendError)),
                    |_| Ok(()),
                )
                .register("4-after", |_| panic!("must not run after a failure"), |_| Ok(()));

            let err = ctx.runner(registry).run(&ctx.up_config()?).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::TransformError);
            assert!(err.message().contains("3-broken"));
            assert_eq!(err.cause().map(|c| c.kind().clone()), Some(ErrorKind::BackendError));
            assert_eq!(*journal.lock(), vec!["up 1", "up 2"]);
            assert_eq!(ctx.ledger_version()?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_rerun_after_failure_resumes() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let broken = recording_registry(&[1], &journal).register(
                "2-flaky",
                |_| Err(DocShiftError::new("timeout", ErrorKind::ConnectionError)),
                |_| Ok(()),
            );
            assert!(ctx.runner(broken).run(&ctx.up_config()?).is_err());
            assert_eq!(ctx.ledger_version()?, 1);

            journal.lock().clear();
            let report = ctx
                .runner(recording_registry(&[1, 2], &journal))
                .run(&ctx.up_config()?)?;
            assert_eq!(report.starting_version, 1);
            assert_eq!(*journal.lock(), vec!["up 2"]);
            assert_eq!(ctx.ledger_version()?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_down_failure_keeps_reverted_position() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.set_ledger_version(3)?;
            let journal = journal();
            let registry = recording_registry(&[1, 3], &journal).register(
                "2-irreversible",
                |_| Ok(()),
                |_| Err(DocShiftError::new("cannot restore dropped data", ErrorKind::ValidationError)),
            );

            let err = ctx.runner(registry).run(&ctx.down_config(0)?).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::TransformError);
            assert_eq!(*journal.lock(), vec!["down 3"]);
            assert_eq!(ctx.ledger_version()?, 2);
            Ok(())
        },
        cleanup,
    )
}

// ==================== Connections ====================

#[test]
fn test_connection_closed_once_on_every_path() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let memory = ctx.connector().memory().clone();

            // normal completion
            ctx.runner(recording_registry(&[1], &journal)).run(&ctx.up_config()?)?;
            // empty pending
            ctx.runner(recording_registry(&[1], &journal)).run(&ctx.up_config()?)?;
            // dry run
            ctx.runner(recording_registry(&[1, 2], &journal))
                .run(&ctx.config().dry_run(true).build()?)?;
            // failure
            let failing = MigrationRegistry::new().register(
                "2-fail",
                |_| Err(DocShiftError::new("fail", ErrorKind::InternalError)),
                |_| Ok(()),
            );
            assert!(ctx.runner(failing).run(&ctx.up_config()?).is_err());
            // status
            ctx.runner(recording_registry(&[1], &journal)).status(&ctx.up_config()?)?;

            assert_eq!(memory.opened_connections(), 5);
            assert_eq!(memory.closed_connections(), 5);
            assert_eq!(memory.open_connections(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unreachable_database() {
    let connector = InMemoryConnector::new();
    connector.mark_unreachable("offline");
    let journal = journal();
    let runner = MigrationRunner::new(connector.clone(), recording_registry(&[1], &journal))
        .with_reporter(MemoryReporter::new());

    let config = ShiftConfig::builder()
        .database_name("offline")
        .port(27018)
        .build()
        .expect("valid config");
    let err = runner.run(&config).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConnectionError);
    assert!(err.message().contains("mongodb://localhost:27018/offline"));
    assert!(journal.lock().is_empty());
    assert_eq!(connector.opened_connections(), 0);
}
