use std::collections::HashMap;

use crate::context::TestContext;

/// Load the `<service_type>.tests.cfg.json` configuration for the running test.
///
/// Failures abort the test through `ctx`; see
/// [`ciforge_lib::testing::load_testing_conf`].
pub fn load_testing_conf(ctx: &TestContext, service_type: &str) -> HashMap<String, String> {
    ciforge_lib::testing::load_testing_conf(ctx, service_type)
}
