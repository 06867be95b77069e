use crate::{Cadence, ContractError, DesiredState, ObservedState};

/// Deterministic delta computation:
/// - `OneTime`       => max(0, desired - (billed + unbilled))
/// - `PerMonth`      => max(0, desired - unbilled)
/// - `PerDeployment` => desired, unconditionally
///
/// Pure content computation: inputs are assumed already validated.
/// Use [`reconcile_checked`] in production paths; call this directly only in
/// unit tests not concerned with contract validation.
pub fn reconcile(desired: &DesiredState, observed: &ObservedState) -> i64 {
    if desired.quantity == 0 {
        // A zero target is always satisfied; no cadence may turn it into a request.
        return 0;
    }

    match desired.cadence {
        Cadence::OneTime => (desired.quantity - observed.lifetime_total()).max(0),
        Cadence::PerMonth => (desired.quantity - observed.unbilled).max(0),
        Cadence::PerDeployment => desired.quantity,
    }
}

/// Contract-checked reconcile entry point.
///
/// This is the **required production path**. Before any delta is computed,
/// both inputs are validated:
///
/// - negative desired quantity  => `ContractError::NegativeDesiredQuantity`
/// - negative observed counters => `ContractError::NegativeObservedCounter`
///
/// A rejected input never reaches the formula: clamping a negative target
/// to zero would mask a caller bug as a clean no-op.
pub fn reconcile_checked(
    desired: &DesiredState,
    observed: &ObservedState,
) -> Result<i64, ContractError> {
    desired.validate()?;
    observed.validate()?;
    Ok(reconcile(desired, observed))
}
