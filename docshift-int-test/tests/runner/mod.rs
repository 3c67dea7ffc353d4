mod failure_test;
mod lifecycle_test;
mod status_test;
