/// Automatically initialize logging for all integration test binaries.
#[ctor::ctor]
fn _auto_init_for_integration_tests() {
    db_test_support::logging::init();
}
