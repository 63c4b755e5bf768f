//! Given steps for request lifecycle scenarios.

use super::world::{LifecycleWorld, light_tow, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("a customer with a light tow request")]
fn customer_with_light_tow(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let draft = light_tow()?;
    let cast = world.ensure_cast()?;
    let created = run_async(cast.customer.create(&draft)).wrap_err("create tow request")?;
    world.created = Some(created);
    Ok(())
}
