use docshift_int_test::test_util::{
    cleanup, create_test_context, journal, recording_registry, run_test,
};

#[test]
fn test_status_on_fresh_database() {
    run_test(
        create_test_context,
        |ctx| {
            let journal = journal();
            let status = ctx
                .runner(recording_registry(&[1, 2], &journal))
                .status(&ctx.up_config()?)?;

            assert_eq!(status.current_version, 0);
            assert_eq!(status.known, vec!["1-step", "2-step"]);
            assert_eq!(status.pending, status.known);
            assert!(ctx.reporter().contains("Current version: 0"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_status_does_not_mutate() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.set_ledger_version(2)?;
            let journal = journal();
            let status = ctx
                .runner(recording_registry(&[3, 1, 2], &journal))
                .status(&ctx.down_config(0)?)?;

            // pending is always reported for up
            assert_eq!(status.current_version, 2);
            assert_eq!(status.pending, vec!["3-step"]);
            assert!(ctx.reporter().contains("[x] 2-step"));
            assert!(ctx.reporter().contains("[ ] 3-step"));
            assert!(journal.lock().is_empty());
            assert_eq!(ctx.connector().upserts(), 0);
            assert_eq!(ctx.ledger_version()?, 2);
            Ok(())
        },
        cleanup,
    )
}
