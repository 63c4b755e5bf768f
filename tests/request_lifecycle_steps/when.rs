//! When steps for request lifecycle scenarios.

use super::world::{LifecycleWorld, light_tow, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"operator "{name}" claims the request"#)]
fn operator_claims(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let request_id = world.created()?.request_id;
    let outcome = run_async(world.cast()?.operator(&name)?.accept(request_id));
    world.claims.insert(name, outcome);
    Ok(())
}

#[when(r#"operator "{name}" departs for the pickup"#)]
fn operator_departs(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let request_id = world.created()?.request_id;
    run_async(world.cast()?.operator(&name)?.depart(request_id)).wrap_err("confirm departure")?;
    Ok(())
}

#[when(r#"operator "{name}" enters the customer's PIN"#)]
fn operator_enters_pin(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let created = world.created()?.clone();
    let stored = run_async(world.cast()?.customer.pin(created.request_id))?
        .ok_or_else(|| eyre::eyre!("customer device lost the PIN"))?;
    let result = run_async(
        world
            .cast()?
            .operator(&name)?
            .verify_pin(created.request_id, &stored),
    );
    world.last_verification = Some(result);
    Ok(())
}

#[when(r#"operator "{name}" enters a wrong PIN {times:usize} times"#)]
fn operator_enters_wrong_pin(
    world: &mut LifecycleWorld,
    name: String,
    times: usize,
) -> Result<(), eyre::Report> {
    let created = world.created()?.clone();
    let wrong = if created.pin == "0000" { "1111" } else { "0000" };
    let operator = world.cast()?.operator(&name)?;
    for attempt in 1..=times {
        let valid = run_async(operator.verify_pin(created.request_id, wrong))
            .wrap_err_with(|| format!("wrong PIN attempt {attempt}"))?;
        if valid {
            return Err(eyre::eyre!("wrong PIN {wrong} was accepted"));
        }
    }
    Ok(())
}

#[when(r#"operator "{name}" completes the request"#)]
fn operator_completes(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let request_id = world.created()?.request_id;
    run_async(world.cast()?.operator(&name)?.complete(request_id)).wrap_err("complete request")?;
    Ok(())
}

#[when(r#"the customer cancels with reason "{reason}""#)]
fn customer_cancels(world: &mut LifecycleWorld, reason: String) -> Result<(), eyre::Report> {
    let request_id = world.created()?.request_id;
    world.last_error = run_async(world.cast()?.customer.cancel(request_id, &reason)).err();
    Ok(())
}

#[when("the customer asks for another light tow")]
fn customer_asks_again(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let draft = light_tow()?;
    world.last_error = run_async(world.cast()?.customer.create(&draft)).err();
    Ok(())
}
