pub mod e2e;
pub mod env;

#[allow(unused_imports)]
pub use e2e::{can_connect, should_run_e2e_tests};
#[allow(unused_imports)]
pub use env::{get_test_config, get_test_dsn};
